//! Point charges

use crate::constants::K_ELECTRIC;
use crate::seed::{fibonacci_sphere, outward_sign, FieldLineCount, SeedPoint};
use crate::source::FieldSource;
use glam::DVec3;

/// A signed point charge.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCharge {
    pub name: Option<String>,
    pub lines: FieldLineCount,
    charge: f64,
    position: DVec3,
}

impl PointCharge {
    pub fn new(charge: f64, position: DVec3) -> Self {
        Self {
            name: None,
            lines: FieldLineCount::default(),
            charge,
            position,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lines(mut self, lines: FieldLineCount) -> Self {
        self.lines = lines;
        self
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub(crate) fn set_charge(&mut self, charge: f64) {
        self.charge = charge;
    }

    pub(crate) fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }
}

impl FieldSource for PointCharge {
    /// Coulomb's law. The charge's own position returns zero.
    fn field(&self, point: DVec3) -> DVec3 {
        let r = point - self.position;
        let r2 = r.length_squared();
        if r2 == 0.0 {
            return DVec3::ZERO;
        }
        r * (K_ELECTRIC * self.charge / (r2 * r2.sqrt()))
    }

    fn total_charge(&self) -> f64 {
        self.charge
    }

    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let sign = outward_sign(self.charge);
        fibonacci_sphere(self.lines.count(self.charge), phi0)
            .into_iter()
            .map(|dir| SeedPoint::at(self.position + dir * radius, sign))
            .collect()
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        self.charge * sign < 0.0 && point.distance_squared(self.position) < radius * radius
    }
}
