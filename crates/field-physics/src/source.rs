//! Traits shared by field sources and by everything a tracer can follow

use crate::seed::SeedPoint;
use glam::DVec3;

/// A single charge or charge distribution with a closed-form field.
pub trait FieldSource {
    /// Field at `point`. Pure: never mutates the source. Singular or
    /// interior-null points yield the zero vector.
    fn field(&self, point: DVec3) -> DVec3;

    /// Total charge carried by the source.
    fn total_charge(&self) -> f64;

    /// Seeds placed `radius` away from the source surface, rotated by `phi0`.
    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint>;

    /// True when `point` is within `radius` of this source and the source is a
    /// sink for a trace heading in direction `sign`.
    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool;
}

/// Anything a tracer can integrate through.
pub trait VectorField {
    fn field(&self, point: DVec3) -> DVec3;

    /// Early-termination predicate consulted after every step.
    fn should_stop(&self, _sign: f64, _point: DVec3, _radius: f64) -> bool {
        false
    }
}

impl<F: VectorField + ?Sized> VectorField for &F {
    fn field(&self, point: DVec3) -> DVec3 {
        (**self).field(point)
    }

    fn should_stop(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        (**self).should_stop(sign, point, radius)
    }
}
