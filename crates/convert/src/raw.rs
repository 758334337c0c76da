use std::io::{self, Write};

use plyraw_mesh::Triangle;

/// Writes POV-Ray RAW triangle lines: nine space-separated coordinates per
/// triangle, no header, no counts. Only ever appends, so output order is
/// emission order.
pub struct RawWriter<W> {
    out: W,
}

impl<W: Write> RawWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn triangle(&mut self, t: &Triangle) -> io::Result<()> {
        writeln!(
            self.out,
            "{} {} {} {} {} {} {} {} {}",
            t.p0.x, t.p0.y, t.p0.z, t.p1.x, t.p1.y, t.p1.z, t.p2.x, t.p2.y, t.p2.z
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
