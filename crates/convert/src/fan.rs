/// Decomposes one streamed polygon into a triangle fan.
///
/// An N-vertex polygon yields N-2 triangles, all anchored at the polygon's
/// first vertex. The scratch is constant regardless of polygon size: the
/// position within the current index list, the anchor index, and the
/// previously seen index. Triangulation of non-convex or self-intersecting
/// polygons is not detected and produces whatever the fan produces.
#[derive(Debug, Default)]
pub struct FanTriangulator {
    position: usize,
    first: i32,
    previous: i32,
}

impl FanTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new polygon, discarding any state from the previous one.
    pub fn begin(&mut self) {
        self.position = 0;
        self.first = 0;
        self.previous = 0;
    }

    /// Feeds the next vertex index of the current polygon.
    ///
    /// Returns the `(first, previous, current)` triple of a completed
    /// triangle once the third and every later index arrives. Polygons with
    /// fewer than three indices never produce a triple.
    pub fn advance(&mut self, index: i32) -> Option<(i32, i32, i32)> {
        let triangle = match self.position {
            0 => {
                self.first = index;
                None
            }
            1 => {
                self.previous = index;
                None
            }
            _ => {
                let triangle = (self.first, self.previous, index);
                self.previous = index;
                Some(triangle)
            }
        };
        self.position += 1;
        triangle
    }
}
