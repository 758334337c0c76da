pub type Vector3 = cgmath::Vector3<f32>;

// We rely on Vector3 being repr(c).
static_assertions::assert_eq_size!(Vector3, [f32; 3]);
static_assertions::assert_eq_align!(Vector3, f32);

/// A triangle as emitted to the RAW output stream: three positions in
/// (first, previous, current) fan order.
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    pub fn new(p0: Vector3, p1: Vector3, p2: Vector3) -> Self {
        Self { p0, p1, p2 }
    }
}
