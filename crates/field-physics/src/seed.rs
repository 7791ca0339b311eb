//! Field line seed points and line counts

use crate::constants::{
    DEFAULT_FIELD_LINE_DENSITY, GOLDEN_ANGLE, MAX_FIELD_LINES, MIN_FIELD_LINES,
};
use glam::DVec3;

/// Starting point of a traced line.
///
/// `sign = +1` traces along the field, `-1` traces against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub position: DVec3,
    pub sign: f64,
}

impl SeedPoint {
    pub fn new(x: f64, y: f64, z: f64, sign: f64) -> Self {
        Self::at(DVec3::new(x, y, z), sign)
    }

    pub fn at(position: DVec3, sign: f64) -> Self {
        Self {
            position,
            sign: if sign < 0.0 { -1.0 } else { 1.0 },
        }
    }
}

/// How many field lines a source emits.
///
/// The count is `round(density · |charge|) + explicit`, raised to
/// [`MIN_FIELD_LINES`] unless it is zero and capped at [`MAX_FIELD_LINES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLineCount {
    /// Lines per unit charge
    pub density: f64,
    /// Lines added on top of the density-derived count
    pub explicit: usize,
}

impl Default for FieldLineCount {
    fn default() -> Self {
        Self {
            density: DEFAULT_FIELD_LINE_DENSITY,
            explicit: 0,
        }
    }
}

impl FieldLineCount {
    /// Build from the optional `field line density` / `nfieldlines` pair.
    ///
    /// With only an explicit count the density is zero, so the source emits
    /// exactly that many lines. With neither, the default density applies.
    pub fn new(density: Option<f64>, explicit: Option<usize>) -> Self {
        match (density, explicit) {
            (None, None) => Self::default(),
            (density, explicit) => Self {
                density: density.unwrap_or(0.0),
                explicit: explicit.unwrap_or(0),
            },
        }
    }

    pub fn count(&self, charge: f64) -> usize {
        let scaled = (self.density * charge.abs()).round();
        let from_density = if scaled.is_finite() && scaled > 0.0 {
            scaled.min(MAX_FIELD_LINES as f64) as usize
        } else {
            0
        };
        match from_density.saturating_add(self.explicit) {
            0 => 0,
            n => n.clamp(MIN_FIELD_LINES, MAX_FIELD_LINES),
        }
    }
}

/// `n` roughly evenly spaced unit vectors, rotated by `phi0` about z.
pub fn fibonacci_sphere(n: usize, phi0: f64) -> Vec<DVec3> {
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
        let r = (1.0 - z * z).sqrt();
        let theta = phi0 + GOLDEN_ANGLE * i as f64;
        out.push(DVec3::new(r * theta.cos(), r * theta.sin(), z));
    }
    out
}

/// Trace direction that leads away from a source of the given charge.
pub(crate) fn outward_sign(charge: f64) -> f64 {
    if charge < 0.0 {
        -1.0
    } else {
        1.0
    }
}
