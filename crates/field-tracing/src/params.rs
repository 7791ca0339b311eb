//! Tracer parameters for runtime tuning

use field_physics::DEFAULT_SEED_RADIUS;
use field_renderer::ArrowHead;

/// Field-line integration settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TracerParams {
    /// World-space length of one integration step
    pub step_size: f64,
    /// Points per line, seed included
    pub max_points: usize,
    /// Arc length between direction arrows
    pub arrow_spacing: f64,
    /// Barb length of direction arrows
    pub arrow_size: f64,
    /// Distance at which a sink ends the line. Keep at least `step_size`
    /// so a line cannot step over the sink.
    pub stop_radius: f64,
}

impl Default for TracerParams {
    fn default() -> Self {
        Self {
            step_size: 0.02,
            max_points: 2000,
            arrow_spacing: 1.5,
            arrow_size: 0.08,
            stop_radius: DEFAULT_SEED_RADIUS,
        }
    }
}

impl TracerParams {
    /// Most arrows a single line can carry.
    pub fn max_arrows(&self) -> usize {
        if self.arrow_spacing <= 0.0 || self.max_points < 2 {
            return 0;
        }
        let length = self.step_size * (self.max_points - 1) as f64;
        (length / self.arrow_spacing).floor() as usize + 1
    }
}

/// Vector-glyph placement settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorFieldParams {
    pub step_size: f64,
    /// Integration steps per seed
    pub max_steps: usize,
    /// Glyphs per seed
    pub max_vectors: usize,
    /// Multiplies `|E|·arrow_size` to get the arc length to the next glyph
    pub spacing_factor: f64,
    pub arrow_size: f64,
    /// Fraction of the gap a glyph's shaft covers
    pub fill: f64,
    pub stop_radius: f64,
    pub head: ArrowHead,
}

impl Default for VectorFieldParams {
    fn default() -> Self {
        Self {
            step_size: 0.02,
            max_steps: 4000,
            max_vectors: 16,
            spacing_factor: 1.0,
            arrow_size: 0.5,
            fill: 0.8,
            stop_radius: DEFAULT_SEED_RADIUS,
            head: ArrowHead::default(),
        }
    }
}
