//! Discrete field-vector glyphs
//!
//! Walks the same fixed-step path as a field line but, instead of keeping the
//! polyline, drops screen-space arrows along it. The arc length to the next
//! arrow is `max(|E| · spacing_factor · arrow_size, 1)`, so strong-field regions
//! space their arrows further apart and draw them longer.

use crate::params::VectorFieldParams;
use field_physics::{SeedPoint, VectorField};
use field_renderer::{
    Allocation, IndexedVertexBuffer, LineVertex, VolumetricLines, SCREEN_ARROW_INDICES,
    SCREEN_ARROW_VERTICES,
};

/// Where a glyph was placed along its seed's path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphAnchor {
    /// Arc length from the seed
    pub arc_length: f64,
    /// `|E|` at the anchor
    pub magnitude: f64,
    /// Arc length reserved before the next glyph
    pub gap: f64,
}

fn glyph_gap(params: &VectorFieldParams, magnitude: f64) -> f64 {
    (magnitude * params.spacing_factor * params.arrow_size).max(1.0)
}

/// Places vector glyphs and owns the buffer they are written to.
#[derive(Debug, Clone, Default)]
pub struct VectorFieldTracer {
    pub params: VectorFieldParams,
    buffer: IndexedVertexBuffer<LineVertex>,
    anchors: Vec<Vec<GlyphAnchor>>,
}

impl VectorFieldTracer {
    pub fn new(params: VectorFieldParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Gap after a glyph placed where the field has magnitude `magnitude`.
    pub fn gap(&self, magnitude: f64) -> f64 {
        glyph_gap(&self.params, magnitude)
    }

    /// Retrace every seed and rewrite the glyph buffer.
    pub fn generate_field<F: VectorField + ?Sized>(
        &mut self,
        field: &F,
        seeds: &[SeedPoint],
    ) -> &IndexedVertexBuffer<LineVertex> {
        let glyphs = seeds.len() * self.params.max_vectors;
        let allocation = self
            .buffer
            .reserve_exact(glyphs * SCREEN_ARROW_VERTICES, glyphs * SCREEN_ARROW_INDICES);
        if allocation == Allocation::Reallocated {
            log::debug!("Vector glyph buffer sized for {glyphs} glyphs");
        }

        if self.anchors.len() < seeds.len() {
            self.anchors.resize_with(seeds.len(), Vec::new);
        }
        self.anchors.truncate(seeds.len());

        for (seed, anchors) in seeds.iter().zip(self.anchors.iter_mut()) {
            anchors.clear();
            Self::trace_seed(&self.params, field, *seed, &mut self.buffer, anchors);
        }

        log::debug!(
            "Placed {} vector glyphs for {} seeds",
            self.anchors.iter().map(Vec::len).sum::<usize>(),
            seeds.len()
        );
        &self.buffer
    }

    fn trace_seed<F: VectorField + ?Sized>(
        params: &VectorFieldParams,
        field: &F,
        seed: SeedPoint,
        buffer: &mut IndexedVertexBuffer<LineVertex>,
        anchors: &mut Vec<GlyphAnchor>,
    ) {
        let mut lines = VolumetricLines::new(buffer);
        let mut position = seed.position;
        let mut arc_length = 0.0;
        let mut next_glyph = 0.0;

        for _ in 0..params.max_steps {
            if anchors.len() >= params.max_vectors {
                break;
            }

            let e = field.field(position);
            let magnitude = e.length();
            if !magnitude.is_finite() || magnitude == 0.0 {
                break;
            }
            let direction = e / magnitude;

            if arc_length >= next_glyph {
                let gap = glyph_gap(params, magnitude);
                let tip = position + direction * (gap * params.fill);
                if !lines.screen_arrow(position, tip, params.head) {
                    break;
                }
                anchors.push(GlyphAnchor {
                    arc_length,
                    magnitude,
                    gap,
                });
                next_glyph = arc_length + gap;
            }

            position += direction * (seed.sign * params.step_size);
            arc_length += params.step_size;
            if field.should_stop(seed.sign, position, params.stop_radius) {
                break;
            }
        }
    }

    /// The last glyph buffer.
    pub fn buffer(&self) -> &IndexedVertexBuffer<LineVertex> {
        &self.buffer
    }

    /// Glyph anchors of the last trace, one list per seed.
    pub fn anchors(&self) -> &[Vec<GlyphAnchor>] {
        &self.anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use field_physics::{ChargeAggregate, PointCharge, VectorFunction};
    use glam::DVec3;

    fn params() -> VectorFieldParams {
        VectorFieldParams {
            step_size: 0.05,
            max_steps: 2000,
            max_vectors: 6,
            spacing_factor: 1.0,
            arrow_size: 1.0,
            fill: 0.5,
            stop_radius: 0.05,
            ..Default::default()
        }
    }

    fn strong_charge() -> ChargeAggregate {
        let mut charges = ChargeAggregate::new();
        charges.add_charge(PointCharge::new(40.0, DVec3::ZERO));
        charges
    }

    #[test]
    fn test_glyph_budget_per_seed() {
        let field = VectorFunction::parse("0", "0", "1").unwrap();
        let seeds = [SeedPoint::new(0.0, 0.0, 0.0, 1.0), SeedPoint::new(5.0, 0.0, 0.0, -1.0)];
        let mut tracer = VectorFieldTracer::new(params());
        let buffer = tracer.generate_field(&field, &seeds);
        assert_eq!(buffer.vertex_count(), 2 * 6 * SCREEN_ARROW_VERTICES);
        assert!(tracer.anchors().iter().all(|a| a.len() == 6));
    }

    #[test]
    fn test_gap_formula_and_floor() {
        let charges = strong_charge();
        let mut tracer = VectorFieldTracer::new(params());
        tracer.generate_field(&charges, &[SeedPoint::new(1.0, 0.0, 0.0, 1.0)]);

        let anchors = &tracer.anchors()[0];
        assert!(anchors.len() > 2);
        for anchor in anchors {
            assert_relative_eq!(anchor.gap, tracer.gap(anchor.magnitude));
            assert!(anchor.gap >= 1.0);
        }
        for pair in anchors.windows(2) {
            let spacing = pair[1].arc_length - pair[0].arc_length;
            assert!(spacing >= pair[0].gap - 1e-9);
            assert!(spacing < pair[0].gap + tracer.params.step_size + 1e-9);
        }
    }

    #[test]
    fn test_spacing_shrinks_to_floor_as_field_weakens() {
        let charges = strong_charge();
        let mut tracer = VectorFieldTracer::new(params());
        tracer.generate_field(&charges, &[SeedPoint::new(1.0, 0.0, 0.0, 1.0)]);

        // gap = max(|E| · spacing_factor · arrow_size, 1)
        let anchors = &tracer.anchors()[0];
        for pair in anchors.windows(2) {
            assert!(pair[1].magnitude < pair[0].magnitude);
            assert!(pair[1].gap <= pair[0].gap);
        }
        assert_eq!(anchors.last().map(|a| a.gap), Some(1.0));
    }

    #[test]
    fn test_glyph_length_tracks_gap() {
        let field = VectorFunction::parse("3", "0", "0").unwrap();
        let mut tracer = VectorFieldTracer::new(params());
        let buffer = tracer.generate_field(&field, &[SeedPoint::new(0.0, 0.0, 0.0, 1.0)]);
        // Shaft quad: start vertex, other end is the tip
        let shaft = buffer.vertices()[0];
        assert_relative_eq!(shaft.other()[0] - shaft.position()[0], 1.5);
    }

    #[test]
    fn test_stops_at_sink() {
        let mut charges = ChargeAggregate::new();
        charges.add_charge(PointCharge::new(-1.0, DVec3::ZERO));
        let mut tracer = VectorFieldTracer::new(VectorFieldParams {
            max_vectors: 100,
            ..params()
        });
        tracer.generate_field(&charges, &[SeedPoint::new(2.0, 0.0, 0.0, 1.0)]);
        let anchors = &tracer.anchors()[0];
        // Two units of path with gaps of at least one
        assert!(anchors.len() <= 2);
        assert!(anchors.iter().all(|a| a.arc_length < 2.0));
    }

    #[test]
    fn test_retrace_reuses_buffer() {
        let charges = strong_charge();
        let seeds = charges.get_start_points(0.0, 0.5);
        let mut tracer = VectorFieldTracer::new(params());
        let first = tracer.generate_field(&charges, &seeds).vertex_capacity();
        let second = tracer.generate_field(&charges, &seeds).vertex_capacity();
        assert_eq!(first, second);
        assert_eq!(tracer.anchors().len(), seeds.len());
    }
}
