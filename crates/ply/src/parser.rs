use std::io::{self, BufRead, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::consumer::{Consumer, ElementBinding};
use crate::header::{Format, PropertyKind, ScalarType};

/// Failure of one parsing pass.
///
/// The original tool mapped a boolean parse result straight onto the process
/// exit status; here the same contract is a `Result`, with the consumer's
/// own error type carried through unchanged.
#[derive(Debug, Error)]
pub enum ParseError<E>
where
    E: std::error::Error + 'static,
{
    #[error("i/o error reading input")]
    Io(#[from] io::Error),
    #[error("{source_name}:{line}: {message}")]
    Syntax {
        source_name: String,
        line: usize,
        message: String,
    },
    #[error(transparent)]
    Consumer(E),
}

/// Per-element dispatch plan, resolved while the header is read.
enum Routing<C: Consumer> {
    /// Element the consumer declined; the declared property shapes are kept
    /// so the records can be skipped byte-accurately in binary payloads.
    Skip(Vec<PropertyKind>),
    Handle {
        element: C::Element,
        properties: Vec<Binding<C>>,
    },
}

enum Binding<C: Consumer> {
    Scalar(ScalarType, C::Scalar),
    List {
        size: ScalarType,
        item: ScalarType,
        binding: C::List,
    },
}

struct ElementPlan<C: Consumer> {
    count: usize,
    routing: Routing<C>,
}

/// Streams one PLY document into a [`Consumer`].
///
/// The parser owns only the source name used in diagnostics; all conversion
/// state lives in the consumer, which is borrowed exclusively for the pass.
pub struct Parser {
    source: String,
}

impl Parser {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Performs one full forward pass over `reader`.
    pub fn parse<R, C>(&self, reader: &mut R, consumer: &mut C) -> Result<(), ParseError<C::Error>>
    where
        R: BufRead,
        C: Consumer,
    {
        let mut line = 0usize;
        let mut buf = String::new();

        if !read_line_trimmed(reader, &mut line, &mut buf)? || buf.trim() != "ply" {
            return Err(self.fail(
                consumer,
                line.max(1),
                "not a PLY file (missing 'ply' magic)".to_string(),
            ));
        }

        let (format, plan) = self.parse_header(reader, consumer, &mut line, &mut buf)?;

        match format {
            Format::Ascii => self.scan_ascii(reader, consumer, &plan, &mut line, &mut buf),
            Format::BinaryLittleEndian => {
                self.scan_binary::<LittleEndian, _, _>(reader, consumer, &plan, line)
            }
            Format::BinaryBigEndian => {
                self.scan_binary::<BigEndian, _, _>(reader, consumer, &plan, line)
            }
        }
    }

    /// Reads declarations up to `end_header`, resolving each one through the
    /// consumer's `bind_*` callbacks as it is encountered.
    fn parse_header<R, C>(
        &self,
        reader: &mut R,
        consumer: &mut C,
        line: &mut usize,
        buf: &mut String,
    ) -> Result<(Format, Vec<ElementPlan<C>>), ParseError<C::Error>>
    where
        R: BufRead,
        C: Consumer,
    {
        let mut format: Option<Format> = None;
        let mut plan: Vec<ElementPlan<C>> = Vec::new();

        loop {
            if !read_line_trimmed(reader, line, buf)? {
                return Err(self.fail(
                    consumer,
                    *line,
                    "unexpected end of file in header".to_string(),
                ));
            }
            let mut tokens = buf.split_whitespace();
            let Some(keyword) = tokens.next() else {
                return Err(self.fail(consumer, *line, "empty header line".to_string()));
            };
            match keyword {
                "format" => {
                    if format.is_some() {
                        return Err(self.fail(
                            consumer,
                            *line,
                            "duplicate format declaration".to_string(),
                        ));
                    }
                    let (encoding, version) = match (tokens.next(), tokens.next()) {
                        (Some(e), Some(v)) => (e, v),
                        _ => {
                            return Err(self.fail(
                                consumer,
                                *line,
                                "malformed format declaration".to_string(),
                            ))
                        }
                    };
                    let parsed = match encoding {
                        "ascii" => Format::Ascii,
                        "binary_little_endian" => Format::BinaryLittleEndian,
                        "binary_big_endian" => Format::BinaryBigEndian,
                        _ => {
                            return Err(self.fail(
                                consumer,
                                *line,
                                format!("unknown format '{encoding}'"),
                            ))
                        }
                    };
                    if version != "1.0" {
                        return Err(self.fail(
                            consumer,
                            *line,
                            format!("unsupported PLY version '{version}'"),
                        ));
                    }
                    format = Some(parsed);
                }
                "comment" | "obj_info" => {
                    consumer.info(&self.source, *line, buf.trim());
                }
                "element" => {
                    let (name, count_token) = match (tokens.next(), tokens.next()) {
                        (Some(n), Some(c)) => (n, c),
                        _ => {
                            return Err(self.fail(
                                consumer,
                                *line,
                                "malformed element declaration".to_string(),
                            ))
                        }
                    };
                    let Ok(count) = count_token.parse::<usize>() else {
                        return Err(self.fail(
                            consumer,
                            *line,
                            format!("invalid element count '{count_token}'"),
                        ));
                    };
                    let routing = match consumer.bind_element(name, count) {
                        ElementBinding::Handle(element) => Routing::Handle {
                            element,
                            properties: Vec::new(),
                        },
                        ElementBinding::Skip => {
                            consumer.warning(
                                &self.source,
                                *line,
                                &format!("ignoring element '{name}'"),
                            );
                            Routing::Skip(Vec::new())
                        }
                    };
                    plan.push(ElementPlan { count, routing });
                }
                "property" => {
                    let Some(entry) = plan.last_mut() else {
                        return Err(self.fail(
                            consumer,
                            *line,
                            "property declared before any element".to_string(),
                        ));
                    };
                    let Some(first) = tokens.next() else {
                        return Err(self.fail(
                            consumer,
                            *line,
                            "property declaration is missing a type".to_string(),
                        ));
                    };
                    if first == "list" {
                        let (size_name, item_name, name) =
                            match (tokens.next(), tokens.next(), tokens.next()) {
                                (Some(s), Some(i), Some(n)) => (s, i, n),
                                _ => {
                                    return Err(self.fail(
                                        consumer,
                                        *line,
                                        "malformed list property declaration".to_string(),
                                    ))
                                }
                            };
                        let Some(size) = ScalarType::from_name(size_name) else {
                            return Err(self.fail(
                                consumer,
                                *line,
                                format!("unknown type '{size_name}'"),
                            ));
                        };
                        let Some(item) = ScalarType::from_name(item_name) else {
                            return Err(self.fail(
                                consumer,
                                *line,
                                format!("unknown type '{item_name}'"),
                            ));
                        };
                        if !size.is_integer() {
                            return Err(self.fail(
                                consumer,
                                *line,
                                "list size type must be an integer".to_string(),
                            ));
                        }
                        match &mut entry.routing {
                            Routing::Skip(layout) => {
                                layout.push(PropertyKind::List { size, item });
                            }
                            Routing::Handle {
                                element,
                                properties,
                            } => {
                                // List items reach the consumer as 32-bit
                                // integers; validate before handing out a
                                // binding.
                                if !item.is_integer() {
                                    return Err(self.fail(
                                        consumer,
                                        *line,
                                        "list item type must be an integer".to_string(),
                                    ));
                                }
                                let binding = consumer
                                    .bind_list(*element, name, size, item)
                                    .map_err(ParseError::Consumer)?;
                                properties.push(Binding::List {
                                    size,
                                    item,
                                    binding,
                                });
                            }
                        }
                    } else {
                        let Some(ty) = ScalarType::from_name(first) else {
                            return Err(
                                self.fail(consumer, *line, format!("unknown type '{first}'"))
                            );
                        };
                        let Some(name) = tokens.next() else {
                            return Err(self.fail(
                                consumer,
                                *line,
                                "property declaration is missing a name".to_string(),
                            ));
                        };
                        match &mut entry.routing {
                            Routing::Skip(layout) => layout.push(PropertyKind::Scalar(ty)),
                            Routing::Handle {
                                element,
                                properties,
                            } => {
                                let binding = consumer
                                    .bind_scalar(*element, name, ty)
                                    .map_err(ParseError::Consumer)?;
                                properties.push(Binding::Scalar(ty, binding));
                            }
                        }
                    }
                }
                "end_header" => break,
                _ => {
                    return Err(self.fail(
                        consumer,
                        *line,
                        format!("unknown header keyword '{keyword}'"),
                    ));
                }
            }
        }

        let Some(format) = format else {
            return Err(self.fail(consumer, *line, "missing format declaration".to_string()));
        };
        Ok((format, plan))
    }

    /// Data section of an ascii document: one record per line.
    fn scan_ascii<R, C>(
        &self,
        reader: &mut R,
        consumer: &mut C,
        plan: &[ElementPlan<C>],
        line: &mut usize,
        buf: &mut String,
    ) -> Result<(), ParseError<C::Error>>
    where
        R: BufRead,
        C: Consumer,
    {
        for entry in plan {
            for _ in 0..entry.count {
                if !read_line_trimmed(reader, line, buf)? {
                    return Err(self.fail(
                        consumer,
                        *line,
                        "unexpected end of file in data section".to_string(),
                    ));
                }
                let Routing::Handle {
                    element,
                    properties,
                } = &entry.routing
                else {
                    continue;
                };
                let mut tokens = buf.split_whitespace();
                consumer
                    .begin_element(*element)
                    .map_err(ParseError::Consumer)?;
                for property in properties {
                    match property {
                        Binding::Scalar(_, binding) => {
                            let Some(token) = tokens.next() else {
                                return Err(self.fail(
                                    consumer,
                                    *line,
                                    "record is missing fields".to_string(),
                                ));
                            };
                            let Ok(value) = token.parse::<f32>() else {
                                return Err(self.fail(
                                    consumer,
                                    *line,
                                    format!("invalid value '{token}'"),
                                ));
                            };
                            consumer
                                .scalar(*binding, value)
                                .map_err(ParseError::Consumer)?;
                        }
                        Binding::List { binding, .. } => {
                            let Some(token) = tokens.next() else {
                                return Err(self.fail(
                                    consumer,
                                    *line,
                                    "record is missing a list size".to_string(),
                                ));
                            };
                            let Ok(len) = token.parse::<usize>() else {
                                return Err(self.fail(
                                    consumer,
                                    *line,
                                    format!("invalid list size '{token}'"),
                                ));
                            };
                            consumer
                                .begin_list(*binding, len)
                                .map_err(ParseError::Consumer)?;
                            for _ in 0..len {
                                let Some(token) = tokens.next() else {
                                    return Err(self.fail(
                                        consumer,
                                        *line,
                                        "record is missing list values".to_string(),
                                    ));
                                };
                                let value = match token.parse::<i64>() {
                                    Ok(raw) => i32::try_from(raw).ok(),
                                    Err(_) => None,
                                };
                                let Some(value) = value else {
                                    return Err(self.fail(
                                        consumer,
                                        *line,
                                        format!("invalid list value '{token}'"),
                                    ));
                                };
                                consumer
                                    .list_item(*binding, value)
                                    .map_err(ParseError::Consumer)?;
                            }
                            consumer.end_list(*binding).map_err(ParseError::Consumer)?;
                        }
                    }
                }
                consumer
                    .end_element(*element)
                    .map_err(ParseError::Consumer)?;
                if tokens.next().is_some() {
                    consumer.warning(
                        &self.source,
                        *line,
                        "ignoring extra fields at end of record",
                    );
                }
            }
        }
        Ok(())
    }

    /// Data section of a binary document. `line` is frozen at the last
    /// header line; binary offsets have no useful line numbers.
    fn scan_binary<B, R, C>(
        &self,
        reader: &mut R,
        consumer: &mut C,
        plan: &[ElementPlan<C>],
        line: usize,
    ) -> Result<(), ParseError<C::Error>>
    where
        B: ByteOrder,
        R: BufRead,
        C: Consumer,
    {
        for entry in plan {
            for _ in 0..entry.count {
                match &entry.routing {
                    Routing::Skip(layout) => {
                        self.skip_binary_record::<B, _, _>(reader, consumer, layout, line)?;
                    }
                    Routing::Handle {
                        element,
                        properties,
                    } => {
                        consumer
                            .begin_element(*element)
                            .map_err(ParseError::Consumer)?;
                        for property in properties {
                            match property {
                                Binding::Scalar(ty, binding) => {
                                    let value = read_scalar::<B, _>(reader, *ty)?;
                                    consumer
                                        .scalar(*binding, value)
                                        .map_err(ParseError::Consumer)?;
                                }
                                Binding::List {
                                    size,
                                    item,
                                    binding,
                                } => {
                                    let raw = read_integer::<B, _>(reader, *size)?;
                                    let Ok(len) = usize::try_from(raw) else {
                                        return Err(self.fail(
                                            consumer,
                                            line,
                                            format!("negative list size {raw}"),
                                        ));
                                    };
                                    consumer
                                        .begin_list(*binding, len)
                                        .map_err(ParseError::Consumer)?;
                                    for _ in 0..len {
                                        let raw = read_integer::<B, _>(reader, *item)?;
                                        let Ok(value) = i32::try_from(raw) else {
                                            return Err(self.fail(
                                                consumer,
                                                line,
                                                format!(
                                                    "list value {raw} does not fit in 32 bits"
                                                ),
                                            ));
                                        };
                                        consumer
                                            .list_item(*binding, value)
                                            .map_err(ParseError::Consumer)?;
                                    }
                                    consumer.end_list(*binding).map_err(ParseError::Consumer)?;
                                }
                            }
                        }
                        consumer
                            .end_element(*element)
                            .map_err(ParseError::Consumer)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn skip_binary_record<B, R, C>(
        &self,
        reader: &mut R,
        consumer: &mut C,
        layout: &[PropertyKind],
        line: usize,
    ) -> Result<(), ParseError<C::Error>>
    where
        B: ByteOrder,
        R: BufRead,
        C: Consumer,
    {
        for kind in layout {
            match kind {
                PropertyKind::Scalar(ty) => skip_bytes(reader, ty.size())?,
                PropertyKind::List { size, item } => {
                    let raw = read_integer::<B, _>(reader, *size)?;
                    let Ok(len) = usize::try_from(raw) else {
                        return Err(self.fail(consumer, line, format!("negative list size {raw}")));
                    };
                    skip_bytes(reader, len * item.size())?;
                }
            }
        }
        Ok(())
    }

    /// Reports a fatal syntax error through the diagnostic channel, then
    /// builds the matching error value.
    fn fail<C: Consumer>(
        &self,
        consumer: &mut C,
        line: usize,
        message: String,
    ) -> ParseError<C::Error> {
        consumer.error(&self.source, line, &message);
        ParseError::Syntax {
            source_name: self.source.clone(),
            line,
            message,
        }
    }
}

/// Reads the next line into `buf` without its trailing newline. Returns
/// false at end of input.
fn read_line_trimmed<R: BufRead>(
    reader: &mut R,
    line: &mut usize,
    buf: &mut String,
) -> io::Result<bool> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(false);
    }
    *line += 1;
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(true)
}

fn read_scalar<B: ByteOrder, R: Read>(reader: &mut R, ty: ScalarType) -> io::Result<f32> {
    Ok(match ty {
        ScalarType::Int8 => f32::from(reader.read_i8()?),
        ScalarType::UInt8 => f32::from(reader.read_u8()?),
        ScalarType::Int16 => f32::from(reader.read_i16::<B>()?),
        ScalarType::UInt16 => f32::from(reader.read_u16::<B>()?),
        ScalarType::Int32 => reader.read_i32::<B>()? as f32,
        ScalarType::UInt32 => reader.read_u32::<B>()? as f32,
        ScalarType::Float32 => reader.read_f32::<B>()?,
        ScalarType::Float64 => reader.read_f64::<B>()? as f32,
    })
}

fn read_integer<B: ByteOrder, R: Read>(reader: &mut R, ty: ScalarType) -> io::Result<i64> {
    Ok(match ty {
        ScalarType::Int8 => i64::from(reader.read_i8()?),
        ScalarType::UInt8 => i64::from(reader.read_u8()?),
        ScalarType::Int16 => i64::from(reader.read_i16::<B>()?),
        ScalarType::UInt16 => i64::from(reader.read_u16::<B>()?),
        ScalarType::Int32 => i64::from(reader.read_i32::<B>()?),
        ScalarType::UInt32 => i64::from(reader.read_u32::<B>()?),
        ScalarType::Float32 | ScalarType::Float64 => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "list type is not an integer",
            ));
        }
    })
}

fn skip_bytes<R: Read>(reader: &mut R, n: usize) -> io::Result<()> {
    let copied = io::copy(&mut reader.by_ref().take(n as u64), &mut io::sink())?;
    if copied < n as u64 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}
