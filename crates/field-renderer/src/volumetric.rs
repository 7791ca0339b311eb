//! Lines and arrows as camera-facing quads
//!
//! Every primitive is written as [`LineVertex`] quads whose width is applied in
//! pixels by the shader, so thickness is independent of zoom and distance.

use crate::buffer::IndexedVertexBuffer;
use crate::vertex::LineVertex;
use glam::DVec3;

pub const SEGMENT_VERTICES: usize = 4;
pub const SEGMENT_INDICES: usize = 6;
pub const WORLD_ARROW_VERTICES: usize = 4 * SEGMENT_VERTICES;
pub const WORLD_ARROW_INDICES: usize = 4 * SEGMENT_INDICES;
pub const SCREEN_ARROW_VERTICES: usize = SEGMENT_VERTICES + 3;
pub const SCREEN_ARROW_INDICES: usize = SEGMENT_INDICES + 3;

/// Some unit vector orthogonal to `v`, or zero when `v` is zero.
///
/// Two components are fixed to one and the third solved from `n·v = 0`,
/// dividing by whichever component of `v` is non-zero.
pub fn orthogonal(v: DVec3) -> DVec3 {
    let n = if v.z != 0.0 {
        DVec3::new(1.0, 1.0, -(v.x + v.y) / v.z)
    } else if v.y != 0.0 {
        DVec3::new(1.0, -(v.x + v.z) / v.y, 1.0)
    } else if v.x != 0.0 {
        DVec3::new(-(v.y + v.z) / v.x, 1.0, 1.0)
    } else {
        return DVec3::ZERO;
    };
    n.normalize()
}

/// Screen-space head of a [`VolumetricLines::screen_arrow`], in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub length: f32,
    pub half_width: f32,
}

impl Default for ArrowHead {
    fn default() -> Self {
        Self {
            length: 8.0,
            half_width: 4.0,
        }
    }
}

/// Writes volumetric line primitives into a borrowed buffer.
///
/// Every method writes a whole primitive or nothing, returning `false` when the
/// buffer has no room left.
pub struct VolumetricLines<'a> {
    buffer: &'a mut IndexedVertexBuffer<LineVertex>,
}

impl<'a> VolumetricLines<'a> {
    pub fn new(buffer: &'a mut IndexedVertexBuffer<LineVertex>) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &IndexedVertexBuffer<LineVertex> {
        self.buffer
    }

    pub fn segment(&mut self, a: DVec3, b: DVec3) -> bool {
        if !self.buffer.has_room(SEGMENT_VERTICES, SEGMENT_INDICES) {
            return false;
        }
        self.write_segment(a, b);
        true
    }

    /// Consecutive segments through `points`. Returns how many were written.
    pub fn polyline(&mut self, points: &[DVec3]) -> usize {
        points
            .windows(2)
            .take_while(|pair| self.segment(pair[0], pair[1]))
            .count()
    }

    /// Four barbs from `tip` back along `direction`, fanned out across `normal`
    /// and across `direction × normal`.
    pub fn world_arrow(&mut self, tip: DVec3, direction: DVec3, normal: DVec3, size: f64) -> bool {
        if !self.buffer.has_room(WORLD_ARROW_VERTICES, WORLD_ARROW_INDICES) {
            return false;
        }
        let back = tip - direction * size;
        let side = normal * (0.5 * size);
        let up = direction.cross(normal) * (0.5 * size);
        for barb in [back + side, back - side, back + up, back - up] {
            self.write_segment(tip, barb);
        }
        true
    }

    /// Shaft from `base` to `tip` plus a triangular head of fixed pixel size.
    ///
    /// Head vertices all sit at `tip` and point back at `base`, so their
    /// parallel offset pulls them down the shaft in screen space.
    pub fn screen_arrow(&mut self, base: DVec3, tip: DVec3, head: ArrowHead) -> bool {
        if !self
            .buffer
            .has_room(SCREEN_ARROW_VERTICES, SCREEN_ARROW_INDICES)
        {
            return false;
        }
        self.write_segment(base, tip);
        let corners = [
            LineVertex::new(tip, base, 0.0, 0.0),
            LineVertex::new(tip, base, head.half_width, head.length),
            LineVertex::new(tip, base, -head.half_width, head.length),
        ];
        self.write(&corners, &[0, 1, 2]);
        true
    }

    fn write_segment(&mut self, a: DVec3, b: DVec3) {
        let quad = [
            LineVertex::new(a, b, 1.0, 0.0),
            LineVertex::new(a, b, -1.0, 0.0),
            LineVertex::new(b, a, -1.0, 0.0),
            LineVertex::new(b, a, 1.0, 0.0),
        ];
        self.write(&quad, &[0, 1, 2, 2, 1, 3]);
    }

    /// Caller has checked capacity.
    fn write(&mut self, vertices: &[LineVertex], local_indices: &[u32]) {
        let first = self.buffer.vertex_count() as u32;
        for v in vertices {
            self.buffer.push_vertex(*v);
        }
        let mut indices = [0u32; SEGMENT_INDICES];
        for (slot, local) in indices.iter_mut().zip(local_indices) {
            *slot = first + local;
        }
        self.buffer.push_indices(&indices[..local_indices.len()]);
    }
}
