use crate::geometry::Vector3;

/// Sequential identity of a vertex, assigned in arrival order.
pub type VertexId = u32;

/// Append-only table of vertex positions, indexed by arrival order.
///
/// Faces reference vertices by their position in this table. The table only
/// grows during a conversion run and is discarded with it; there is no
/// mutation or deletion API.
#[derive(Debug, Default)]
pub struct VertexStore {
    points: Vec<Vector3>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Reserves room for `n` additional vertices.
    ///
    /// PLY declares the vertex count up front, so a consumer can size the
    /// table once instead of growing it record by record.
    pub fn reserve(&mut self, n: usize) {
        self.points.reserve(n);
    }

    /// Appends a vertex and returns its assigned id.
    pub fn append(&mut self, x: f32, y: f32, z: f32) -> VertexId {
        let id = self.points.len() as VertexId;
        self.points.push(Vector3 { x, y, z });
        id
    }

    /// Looks up a previously appended vertex.
    ///
    /// Returns `None` for ids that have not been appended yet, so callers
    /// can surface a descriptive error instead of panicking.
    pub fn get(&self, id: VertexId) -> Option<&Vector3> {
        self.points.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
