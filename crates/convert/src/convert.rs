use std::io::{self, BufRead, Write};

use log::{error, info, warn};
use plyraw_mesh::{Triangle, Vector3, VertexStore};
use plyraw_ply::{Consumer, ElementBinding, ParseError, Parser, ScalarType};
use thiserror::Error;

use crate::fan::FanTriangulator;
use crate::raw::RawWriter;

/// Fatal conversion errors.
///
/// An unsupported declaration means the input carries a field this converter
/// has no way to interpret, so the pass aborts instead of producing silently
/// wrong geometry.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported scalar property '{property}' under element '{element}'")]
    UnsupportedProperty {
        element: &'static str,
        property: String,
    },
    #[error("unsupported list property '{property}' under element '{element}'")]
    UnsupportedList {
        element: &'static str,
        property: String,
    },
    #[error("face references vertex {index} but only {len} vertices have been read")]
    IndexOutOfRange { index: i32, len: usize },
    #[error("i/o error writing triangles")]
    Io(#[from] io::Error),
}

/// The two PLY elements the converter understands.
#[derive(Debug, Clone, Copy)]
pub enum Element {
    Vertex,
    Face,
}

impl Element {
    fn name(self) -> &'static str {
        match self {
            Element::Vertex => "vertex",
            Element::Face => "face",
        }
    }
}

/// Vertex position fields, bound at declaration time.
#[derive(Debug, Clone, Copy)]
pub enum Scalar {
    X,
    Y,
    Z,
}

/// The face index list, bound at declaration time.
#[derive(Debug, Clone, Copy)]
pub struct FaceIndices;

/// Routes parser events into the vertex store and the fan triangulator,
/// writing each completed triangle straight to the output sink. Nothing is
/// buffered per face or per mesh beyond the vertex table.
pub struct RawConverter<W> {
    writer: RawWriter<W>,
    vertices: VertexStore,
    position: [f32; 3],
    fan: FanTriangulator,
}

impl<W: Write> RawConverter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: RawWriter::new(out),
            vertices: VertexStore::new(),
            position: [0.0; 3],
            fan: FanTriangulator::new(),
        }
    }

    /// Flushes the output sink and hands it back.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer.into_inner())
    }

    /// Resolves a face index against the vertices read so far.
    ///
    /// Faces are expected to follow all vertices in stream order; a forward
    /// or negative reference is out of range at the time the face is
    /// processed and fails the pass.
    fn resolve(&self, index: i32) -> Result<Vector3, ConvertError> {
        u32::try_from(index)
            .ok()
            .and_then(|id| self.vertices.get(id))
            .copied()
            .ok_or(ConvertError::IndexOutOfRange {
                index,
                len: self.vertices.len(),
            })
    }
}

impl<W: Write> Consumer for RawConverter<W> {
    type Element = Element;
    type Scalar = Scalar;
    type List = FaceIndices;
    type Error = ConvertError;

    fn bind_element(&mut self, name: &str, count: usize) -> ElementBinding<Element> {
        match name {
            "vertex" => {
                self.vertices.reserve(count);
                ElementBinding::Handle(Element::Vertex)
            }
            "face" => ElementBinding::Handle(Element::Face),
            _ => ElementBinding::Skip,
        }
    }

    fn bind_scalar(
        &mut self,
        element: Element,
        property: &str,
        ty: ScalarType,
    ) -> Result<Scalar, ConvertError> {
        if let (Element::Vertex, ScalarType::Float32) = (element, ty) {
            match property {
                "x" => return Ok(Scalar::X),
                "y" => return Ok(Scalar::Y),
                "z" => return Ok(Scalar::Z),
                _ => {}
            }
        }
        Err(ConvertError::UnsupportedProperty {
            element: element.name(),
            property: property.to_string(),
        })
    }

    fn bind_list(
        &mut self,
        element: Element,
        property: &str,
        size: ScalarType,
        item: ScalarType,
    ) -> Result<FaceIndices, ConvertError> {
        if matches!(element, Element::Face)
            && matches!(property, "vertex_indices" | "vertex_index")
            && size.is_unsigned()
            && item.is_integer()
        {
            return Ok(FaceIndices);
        }
        Err(ConvertError::UnsupportedList {
            element: element.name(),
            property: property.to_string(),
        })
    }

    fn begin_element(&mut self, element: Element) -> Result<(), ConvertError> {
        if let Element::Vertex = element {
            self.position = [0.0; 3];
        }
        Ok(())
    }

    fn end_element(&mut self, element: Element) -> Result<(), ConvertError> {
        if let Element::Vertex = element {
            let [x, y, z] = self.position;
            self.vertices.append(x, y, z);
            self.position = [0.0; 3];
        }
        Ok(())
    }

    fn scalar(&mut self, binding: Scalar, value: f32) -> Result<(), ConvertError> {
        match binding {
            Scalar::X => self.position[0] = value,
            Scalar::Y => self.position[1] = value,
            Scalar::Z => self.position[2] = value,
        }
        Ok(())
    }

    fn begin_list(&mut self, _binding: FaceIndices, _len: usize) -> Result<(), ConvertError> {
        // The declared size is informational; the fan counts the items it
        // actually receives.
        self.fan.begin();
        Ok(())
    }

    fn list_item(&mut self, _binding: FaceIndices, index: i32) -> Result<(), ConvertError> {
        if let Some((first, previous, current)) = self.fan.advance(index) {
            let triangle = Triangle::new(
                self.resolve(first)?,
                self.resolve(previous)?,
                self.resolve(current)?,
            );
            self.writer.triangle(&triangle)?;
        }
        Ok(())
    }

    fn end_list(&mut self, _binding: FaceIndices) -> Result<(), ConvertError> {
        Ok(())
    }

    fn info(&mut self, source: &str, line: usize, message: &str) {
        info!("{source}:{line}: {message}");
    }

    fn warning(&mut self, source: &str, line: usize, message: &str) {
        warn!("{source}:{line}: {message}");
    }

    fn error(&mut self, source: &str, line: usize, message: &str) {
        error!("{source}:{line}: {message}");
    }
}

/// Converts one PLY document to RAW triangle lines in a single pass.
///
/// `source` names the input in diagnostics (a file path, or `-` for standard
/// input). On success the flushed output sink is handed back.
pub fn convert<R, W>(reader: &mut R, source: &str, out: W) -> Result<W, ParseError<ConvertError>>
where
    R: BufRead,
    W: Write,
{
    let mut converter = RawConverter::new(out);
    Parser::new(source).parse(reader, &mut converter)?;
    converter
        .finish()
        .map_err(|e| ParseError::Consumer(ConvertError::Io(e)))
}
