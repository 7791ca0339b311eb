//! Field lines
//!
//! A line starts at a seed and repeatedly steps `step_size` along the unit
//! field direction (against it for `sign < 0`). Every `arrow_spacing` of arc
//! length it records a direction arrow. A line ends when the field vanishes,
//! the point budget runs out, the field reports a sink, or the numbers stop
//! being finite. All four are normal endings.

use crate::params::TracerParams;
use field_physics::{SeedPoint, VectorField};
use field_renderer::{
    orthogonal, Allocation, IndexedVertexBuffer, LineVertex, VolumetricLines, SEGMENT_INDICES,
    SEGMENT_VERTICES, WORLD_ARROW_INDICES, WORLD_ARROW_VERTICES,
};
use glam::DVec3;

/// Why a line stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceEnd {
    /// Exactly zero field at the current point
    NoField,
    /// `max_points` reached
    #[default]
    PointBudget,
    /// The field's stop predicate fired (a sink was reached)
    Stopped,
    /// NaN or infinite field or position, e.g. from degenerate geometry
    NonFinite,
}

/// Direction marker along a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineArrow {
    pub position: DVec3,
    /// Unit field direction, independent of the trace sign
    pub direction: DVec3,
    /// Unit vector orthogonal to `direction`
    pub normal: DVec3,
}

/// A traced line with fixed-capacity point and arrow storage.
#[derive(Debug, Clone)]
pub struct FieldLine {
    points: Vec<DVec3>,
    arrows: Vec<LineArrow>,
    max_points: usize,
    max_arrows: usize,
    sign: f64,
    length: f64,
    end: TraceEnd,
}

impl FieldLine {
    pub fn with_capacity(max_points: usize, max_arrows: usize) -> Self {
        Self {
            points: Vec::with_capacity(max_points),
            arrows: Vec::with_capacity(max_arrows),
            max_points,
            max_arrows,
            sign: 1.0,
            length: 0.0,
            end: TraceEnd::default(),
        }
    }

    /// Keep the storage when the capacities match, replace it otherwise.
    pub fn ensure_capacity(&mut self, max_points: usize, max_arrows: usize) -> Allocation {
        if max_points == self.max_points && max_arrows == self.max_arrows {
            self.reset();
            Allocation::Reused
        } else {
            *self = Self::with_capacity(max_points, max_arrows);
            Allocation::Reallocated
        }
    }

    /// Rewind the write cursors.
    pub fn reset(&mut self) {
        self.points.clear();
        self.arrows.clear();
        self.length = 0.0;
        self.end = TraceEnd::default();
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn arrows(&self) -> &[LineArrow] {
        &self.arrows
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn sign(&self) -> f64 {
        self.sign
    }

    /// Arc length traced.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn end(&self) -> TraceEnd {
        self.end
    }

    fn push_point(&mut self, point: DVec3) -> bool {
        if self.points.len() >= self.max_points {
            return false;
        }
        self.points.push(point);
        true
    }

    fn push_arrow(&mut self, arrow: LineArrow) {
        if self.arrows.len() < self.max_arrows {
            self.arrows.push(arrow);
        }
    }
}

/// Traces field lines with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct FieldLineTracer {
    pub params: TracerParams,
}

impl FieldLineTracer {
    pub fn new(params: TracerParams) -> Self {
        Self { params }
    }

    /// Trace a new line from `(x, y, z)`.
    pub fn generate<F: VectorField + ?Sized>(
        &self,
        field: &F,
        x: f64,
        y: f64,
        z: f64,
        sign: f64,
    ) -> FieldLine {
        let mut line = FieldLine::with_capacity(self.params.max_points, self.params.max_arrows());
        self.trace_into(field, SeedPoint::new(x, y, z, sign), &mut line);
        line
    }

    /// Trace from `seed` into existing storage, overwriting it.
    pub fn trace_into<F: VectorField + ?Sized>(&self, field: &F, seed: SeedPoint, line: &mut FieldLine) {
        let TracerParams {
            step_size,
            arrow_spacing,
            stop_radius,
            ..
        } = self.params;

        line.reset();
        line.sign = seed.sign;

        let mut position = seed.position;
        let mut since_arrow = 0.0;
        if !line.push_point(position) {
            line.end = TraceEnd::PointBudget;
            return;
        }

        line.end = loop {
            if line.points.len() >= line.max_points {
                break TraceEnd::PointBudget;
            }

            let e = field.field(position);
            if !e.is_finite() {
                break TraceEnd::NonFinite;
            }
            let magnitude = e.length();
            if magnitude == 0.0 {
                break TraceEnd::NoField;
            }

            let direction = e / magnitude;
            position += direction * (seed.sign * step_size);
            if !position.is_finite() {
                break TraceEnd::NonFinite;
            }
            line.push_point(position);
            line.length += step_size;
            since_arrow += step_size;

            if arrow_spacing > 0.0 && since_arrow > arrow_spacing {
                line.push_arrow(LineArrow {
                    position,
                    direction,
                    normal: orthogonal(direction),
                });
                since_arrow = 0.0;
            }

            if field.should_stop(seed.sign, position, stop_radius) {
                break TraceEnd::Stopped;
            }
        };

        log::trace!(
            "Field line from {:?}: {} points, {} arrows, {:?}",
            seed.position,
            line.points.len(),
            line.arrows.len(),
            line.end
        );
    }

    /// Trace every seed into `set`, reusing its lines.
    pub fn generate_all<F: VectorField + ?Sized>(
        &self,
        field: &F,
        seeds: &[SeedPoint],
        set: &mut FieldLineSet,
    ) -> Allocation {
        let allocation = set.prepare(seeds.len(), self.params.max_points, self.params.max_arrows());
        for (seed, line) in seeds.iter().zip(set.lines.iter_mut()) {
            self.trace_into(field, *seed, line);
        }

        log::debug!(
            "Traced {} field lines ({} points, {:?})",
            set.len(),
            set.iter().map(FieldLine::len).sum::<usize>(),
            allocation
        );
        allocation
    }
}

/// Reusable collection of lines for one configuration.
///
/// Tracing fewer lines than before only lowers the active count; the storage
/// of the inactive lines is kept so that growing back reuses it.
/// [`FieldLineSet::shrink_to_active`] releases it.
#[derive(Debug, Clone, Default)]
pub struct FieldLineSet {
    lines: Vec<FieldLine>,
    active: usize,
}

impl FieldLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn prepare(&mut self, count: usize, max_points: usize, max_arrows: usize) -> Allocation {
        let mut allocation = Allocation::Reused;
        if count > self.lines.len() {
            self.lines
                .resize_with(count, || FieldLine::with_capacity(max_points, max_arrows));
            allocation = Allocation::Reallocated;
        }
        for line in &mut self.lines[..count] {
            if line.ensure_capacity(max_points, max_arrows) == Allocation::Reallocated {
                allocation = Allocation::Reallocated;
            }
        }
        self.active = count;
        allocation
    }

    pub fn len(&self) -> usize {
        self.active
    }

    /// Drop the storage of lines beyond the active count.
    pub fn shrink_to_active(&mut self) {
        self.lines.truncate(self.active);
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldLine> {
        self.lines[..self.active].iter()
    }

    pub fn get(&self, index: usize) -> Option<&FieldLine> {
        self.lines[..self.active].get(index)
    }

    /// Vertex and index counts that hold every line at full budget.
    pub fn geometry_capacity(&self) -> (usize, usize) {
        self.iter().fold((0, 0), |(v, i), line| {
            let segments = line.max_points.saturating_sub(1);
            let arrows = line.max_arrows;
            (
                v + segments * SEGMENT_VERTICES + arrows * WORLD_ARROW_VERTICES,
                i + segments * SEGMENT_INDICES + arrows * WORLD_ARROW_INDICES,
            )
        })
    }

    /// Pack every line and its arrows into `buffer` as volumetric lines.
    ///
    /// Capacity follows the point budget rather than the traced lengths, so
    /// retracing the same configuration reuses the buffer.
    pub fn write_geometry(
        &self,
        buffer: &mut IndexedVertexBuffer<LineVertex>,
        arrow_size: f64,
    ) -> Allocation {
        let (vertices, indices) = self.geometry_capacity();
        let allocation = buffer.reserve_exact(vertices, indices);
        let mut lines = VolumetricLines::new(buffer);
        for line in self.iter() {
            lines.polyline(line.points());
            for arrow in line.arrows() {
                lines.world_arrow(arrow.position, arrow.direction, arrow.normal, arrow_size);
            }
        }
        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use field_physics::{ChargeAggregate, ChargedPlane, PointCharge, VectorFunction};

    fn single_charge(q: f64) -> ChargeAggregate {
        let mut charges = ChargeAggregate::new();
        charges.add_charge(PointCharge::new(q, DVec3::ZERO));
        charges
    }

    fn tracer(max_points: usize) -> FieldLineTracer {
        FieldLineTracer::new(TracerParams {
            step_size: 0.1,
            max_points,
            arrow_spacing: 1.0,
            arrow_size: 0.1,
            stop_radius: 0.1,
        })
    }

    #[test]
    fn test_point_charge_traces_outward_to_budget() {
        let charges = single_charge(1.0);
        let line = tracer(50).generate(&charges, 1.0, 0.0, 0.0, 1.0);

        assert_eq!(line.len(), 50);
        assert_eq!(line.end(), TraceEnd::PointBudget);
        for pair in line.points().windows(2) {
            assert!(pair[1].length() > pair[0].length());
            assert_abs_diff_eq!(pair[1].y, 0.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(line.points()[49].x, 1.0 + 49.0 * 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(line.length(), 4.9, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_sign_runs_into_sink() {
        // Along the field of a negative charge means straight into it
        let charges = single_charge(-1.0);
        let line = tracer(500).generate(&charges, 1.0, 0.0, 0.0, 1.0);
        assert_eq!(line.end(), TraceEnd::Stopped);
        let last = *line.points().last().unwrap();
        assert!(last.length() < 0.1 + 1e-9);
        assert!(line.len() < 12);
    }

    #[test]
    fn test_zero_field_stops_immediately() {
        let mut charges = ChargeAggregate::new();
        charges.add_charge(PointCharge::new(1.0, DVec3::X));
        charges.add_charge(PointCharge::new(1.0, -DVec3::X));
        let line = tracer(100).generate(&charges, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(line.end(), TraceEnd::NoField);
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn test_degenerate_plane_ends_non_finite() {
        let p = DVec3::ZERO;
        let mut charges = ChargeAggregate::new();
        charges.add_distribution(ChargedPlane::new([p, p, p, p], 1.0));
        let line = tracer(100).generate(&charges, 0.0, 0.0, 1.0, 1.0);
        assert_eq!(line.end(), TraceEnd::NonFinite);
    }

    #[test]
    fn test_arrows_follow_spacing() {
        let field = VectorFunction::parse("1", "0", "0").unwrap();
        let line = tracer(101).generate(&field, 0.0, 0.0, 0.0, -1.0);
        // 10 units of line, one arrow per unit (give or take rounding at the end)
        assert!((9..=10).contains(&line.arrows().len()));
        for arrow in line.arrows() {
            assert_eq!(arrow.direction, DVec3::X);
            assert_abs_diff_eq!(arrow.normal.dot(arrow.direction), 0.0, epsilon = 1e-12);
        }
        assert!(line.points()[100].x < -9.9);
    }

    #[test]
    fn test_arrow_only_once_spacing_is_exceeded() {
        let field = VectorFunction::parse("1", "0", "0").unwrap();
        let tracer = FieldLineTracer::new(TracerParams {
            step_size: 0.5,
            max_points: 13,
            arrow_spacing: 1.0,
            arrow_size: 0.1,
            stop_radius: 0.1,
        });
        let line = tracer.generate(&field, 0.0, 0.0, 0.0, 1.0);

        // Exactly one unit of arc is not enough, so arrows land every 1.5
        let xs: Vec<f64> = line.arrows().iter().map(|a| a.position.x).collect();
        assert_eq!(xs, vec![1.5, 3.0, 4.5, 6.0]);
    }

    #[test]
    fn test_set_reuses_lines() {
        let charges = single_charge(2.0);
        let seeds = charges.get_start_points(0.0, 0.1);
        let tracer = tracer(40);
        let mut set = FieldLineSet::new();

        assert_eq!(tracer.generate_all(&charges, &seeds, &mut set), Allocation::Reallocated);
        assert_eq!(set.len(), seeds.len());
        assert_eq!(tracer.generate_all(&charges, &seeds, &mut set), Allocation::Reused);
        assert_eq!(tracer.generate_all(&charges, &seeds[..1], &mut set), Allocation::Reused);
        assert_eq!(set.len(), 1);
        assert!(set.iter().all(|l| l.end() == TraceEnd::PointBudget));

        // Inactive lines keep their storage until released
        assert_eq!(tracer.generate_all(&charges, &seeds, &mut set), Allocation::Reused);
        tracer.generate_all(&charges, &seeds[..1], &mut set);
        set.shrink_to_active();
        assert_eq!(set.len(), 1);
        assert_eq!(tracer.generate_all(&charges, &seeds, &mut set), Allocation::Reallocated);
        assert_eq!(set.len(), seeds.len());
    }

    #[test]
    fn test_geometry_fits_budget() {
        let charges = single_charge(3.0);
        let seeds = charges.get_start_points(0.0, 0.1);
        let tracer = tracer(30);
        let mut set = FieldLineSet::new();
        tracer.generate_all(&charges, &seeds, &mut set);

        let mut buffer = IndexedVertexBuffer::default();
        assert_eq!(set.write_geometry(&mut buffer, 0.1), Allocation::Reallocated);
        let arrows: usize = set.iter().map(|l| l.arrows().len()).sum();
        assert_eq!(
            buffer.vertex_count(),
            3 * 29 * SEGMENT_VERTICES + arrows * WORLD_ARROW_VERTICES
        );

        tracer.generate_all(&charges, &seeds, &mut set);
        assert_eq!(set.write_geometry(&mut buffer, 0.1), Allocation::Reused);
    }
}
