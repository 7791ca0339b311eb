//! Charge aggregate: the full configuration of one visualisation
//!
//! The aggregate sums the fields of every point charge and distribution and is
//! the single place where the configuration changes. Every change goes through
//! [`ChargeAggregate::apply`], which reports what it touched as a [`ChangeSet`]
//! and accumulates it until the renderer consumes it.

use crate::charge::PointCharge;
use crate::distribution::Distribution;
use crate::seed::SeedPoint;
use crate::source::{FieldSource, VectorField};
use glam::DVec3;
use thiserror::Error;

/// Which parts of the configuration changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub charges: bool,
    pub distributions: bool,
}

impl ChangeSet {
    pub const NONE: Self = Self {
        charges: false,
        distributions: false,
    };
    pub const CHARGES: Self = Self {
        charges: true,
        distributions: false,
    };
    pub const DISTRIBUTIONS: Self = Self {
        charges: false,
        distributions: true,
    };
    pub const ALL: Self = Self {
        charges: true,
        distributions: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.charges && !self.distributions
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            charges: self.charges || other.charges,
            distributions: self.distributions || other.distributions,
        }
    }
}

/// A single change to the configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddCharge(PointCharge),
    AddDistribution(Distribution),
    SetCharge { index: usize, charge: f64 },
    /// Total charge of a spherical distribution
    SetTotalCharge { index: usize, charge: f64 },
    MoveCharge { index: usize, position: DVec3 },
    /// Linear, areal or volume density depending on the distribution
    SetDensity { index: usize, density: f64 },
    /// New endpoints for a line or cylinder
    SetEndpoints { index: usize, start: DVec3, end: DVec3 },
    /// New corners for a plane
    SetCorners { index: usize, corners: [DVec3; 4] },
    /// New shell radii for a cylinder or sphere
    SetRadii { index: usize, inner: f64, outer: f64 },
    /// Shift a distribution as a whole
    Translate { index: usize, offset: DVec3 },
}

impl Mutation {
    fn label(&self) -> &'static str {
        match self {
            Mutation::AddCharge(_) => "add charge",
            Mutation::AddDistribution(_) => "add distribution",
            Mutation::SetCharge { .. } => "set charge",
            Mutation::SetTotalCharge { .. } => "set total charge",
            Mutation::MoveCharge { .. } => "move charge",
            Mutation::SetDensity { .. } => "set density",
            Mutation::SetEndpoints { .. } => "set endpoints",
            Mutation::SetCorners { .. } => "set corners",
            Mutation::SetRadii { .. } => "set radii",
            Mutation::Translate { .. } => "translate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("no {kind} at index {index} (have {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("cannot apply {mutation} to a {kind} (index {index})")]
    Unsupported {
        mutation: &'static str,
        kind: &'static str,
        index: usize,
    },
}

/// Ordered point charges and distributions plus accumulated change flags.
#[derive(Debug, Clone, Default)]
pub struct ChargeAggregate {
    charges: Vec<PointCharge>,
    distributions: Vec<Distribution>,
    pending: ChangeSet,
}

impl ChargeAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_charge(&mut self, charge: PointCharge) -> ChangeSet {
        self.charges.push(charge);
        self.record(ChangeSet::CHARGES)
    }

    pub fn add_distribution(&mut self, distribution: impl Into<Distribution>) -> ChangeSet {
        self.distributions.push(distribution.into());
        self.record(ChangeSet::DISTRIBUTIONS)
    }

    pub fn charges(&self) -> &[PointCharge] {
        &self.charges
    }

    pub fn distributions(&self) -> &[Distribution] {
        &self.distributions
    }

    pub fn is_empty(&self) -> bool {
        self.charges.is_empty() && self.distributions.is_empty()
    }

    pub fn find_charge(&self, name: &str) -> Option<usize> {
        self.charges
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
    }

    pub fn find_distribution(&self, name: &str) -> Option<usize> {
        self.distributions.iter().position(|d| d.name() == Some(name))
    }

    /// Summed field at `(x, y, z)`.
    pub fn get_field(&self, x: f64, y: f64, z: f64) -> DVec3 {
        self.field_at(DVec3::new(x, y, z))
    }

    pub fn field_at(&self, point: DVec3) -> DVec3 {
        let from_charges: DVec3 = self.charges.iter().map(|c| c.field(point)).sum();
        let from_distributions: DVec3 = self.distributions.iter().map(|d| d.field(point)).sum();
        from_charges + from_distributions
    }

    pub fn total_charge(&self) -> f64 {
        self.charges.iter().map(|c| c.total_charge()).sum::<f64>()
            + self.distributions.iter().map(|d| d.total_charge()).sum::<f64>()
    }

    /// Seeds for every source, charges first, in insertion order.
    pub fn get_start_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let mut seeds: Vec<SeedPoint> = self
            .charges
            .iter()
            .flat_map(|c| c.seed_points(phi0, radius))
            .collect();
        seeds.extend(
            self.distributions
                .iter()
                .flat_map(|d| d.seed_points(phi0, radius)),
        );
        seeds
    }

    /// Apply one change, returning what it touched.
    pub fn apply(&mut self, mutation: Mutation) -> Result<ChangeSet, MutationError> {
        let label = mutation.label();
        let changes = match mutation {
            Mutation::AddCharge(charge) => return Ok(self.add_charge(charge)),
            Mutation::AddDistribution(d) => return Ok(self.add_distribution(d)),
            Mutation::SetCharge { index, charge } => {
                self.charge_mut(index)?.set_charge(charge);
                ChangeSet::CHARGES
            }
            Mutation::SetTotalCharge { index, charge } => {
                match self.distribution_mut(index)? {
                    Distribution::Sphere(s) => s.set_charge(charge),
                    other => return Err(unsupported(label, other, index)),
                }
                ChangeSet::DISTRIBUTIONS
            }
            Mutation::MoveCharge { index, position } => {
                self.charge_mut(index)?.set_position(position);
                ChangeSet::CHARGES
            }
            Mutation::SetDensity { index, density } => {
                match self.distribution_mut(index)? {
                    Distribution::Line(d) => d.set_density(density),
                    Distribution::Plane(d) => d.set_density(density),
                    Distribution::Cylinder(d) => d.set_density(density),
                    Distribution::Sphere(d) => d.set_density(density),
                }
                ChangeSet::DISTRIBUTIONS
            }
            Mutation::SetEndpoints { index, start, end } => {
                match self.distribution_mut(index)? {
                    Distribution::Line(d) => d.set_endpoints(start, end),
                    Distribution::Cylinder(d) => d.set_endpoints(start, end),
                    other => return Err(unsupported(label, other, index)),
                }
                ChangeSet::DISTRIBUTIONS
            }
            Mutation::SetCorners { index, corners } => {
                match self.distribution_mut(index)? {
                    Distribution::Plane(d) => d.set_corners(corners),
                    other => return Err(unsupported(label, other, index)),
                }
                ChangeSet::DISTRIBUTIONS
            }
            Mutation::SetRadii {
                index,
                inner,
                outer,
            } => {
                match self.distribution_mut(index)? {
                    Distribution::Cylinder(d) => d.set_radii(inner, outer),
                    Distribution::Sphere(d) => d.set_radii(inner, outer),
                    other => return Err(unsupported(label, other, index)),
                }
                ChangeSet::DISTRIBUTIONS
            }
            Mutation::Translate { index, offset } => {
                match self.distribution_mut(index)? {
                    Distribution::Line(d) => {
                        let (start, end) = (d.start(), d.end());
                        d.set_endpoints(start + offset, end + offset);
                    }
                    Distribution::Cylinder(d) => {
                        let (start, end) = (d.start(), d.end());
                        d.set_endpoints(start + offset, end + offset);
                    }
                    Distribution::Plane(d) => {
                        let corners = d.corners().map(|c| c + offset);
                        d.set_corners(corners);
                    }
                    Distribution::Sphere(d) => {
                        let center = d.center();
                        d.set_center(center + offset);
                    }
                }
                ChangeSet::DISTRIBUTIONS
            }
        };
        Ok(self.record(changes))
    }

    /// Apply several changes; stops at the first failure.
    pub fn apply_all(
        &mut self,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Result<ChangeSet, MutationError> {
        let mut changes = ChangeSet::NONE;
        for mutation in mutations {
            changes = changes.merge(self.apply(mutation)?);
        }
        Ok(changes)
    }

    pub fn charges_modified(&self) -> bool {
        self.pending.charges
    }

    pub fn distributions_modified(&self) -> bool {
        self.pending.distributions
    }

    /// Mark everything as modified or clear both flags.
    pub fn set_modified(&mut self, modified: bool) {
        self.pending = if modified {
            ChangeSet::ALL
        } else {
            ChangeSet::NONE
        };
    }

    /// Hand the accumulated changes to the caller and clear them.
    pub fn take_changes(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }

    fn record(&mut self, changes: ChangeSet) -> ChangeSet {
        self.pending = self.pending.merge(changes);
        changes
    }

    fn charge_mut(&mut self, index: usize) -> Result<&mut PointCharge, MutationError> {
        let len = self.charges.len();
        self.charges
            .get_mut(index)
            .ok_or(MutationError::IndexOutOfRange {
                kind: "charge",
                index,
                len,
            })
    }

    fn distribution_mut(&mut self, index: usize) -> Result<&mut Distribution, MutationError> {
        let len = self.distributions.len();
        self.distributions
            .get_mut(index)
            .ok_or(MutationError::IndexOutOfRange {
                kind: "distribution",
                index,
                len,
            })
    }
}

fn unsupported(mutation: &'static str, target: &Distribution, index: usize) -> MutationError {
    MutationError::Unsupported {
        mutation,
        kind: target.kind(),
        index,
    }
}

impl VectorField for ChargeAggregate {
    fn field(&self, point: DVec3) -> DVec3 {
        self.field_at(point)
    }

    /// Stop once the trace reaches a sink for its direction.
    fn should_stop(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        self.charges
            .iter()
            .any(|c| c.is_sink_near(sign, point, radius))
            || self
                .distributions
                .iter()
                .any(|d| d.is_sink_near(sign, point, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{ChargedCylinder, ChargedLine, ChargedPlane, ChargedSphere};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng) -> DVec3 {
        DVec3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
        )
    }

    fn square(z: f64) -> [DVec3; 4] {
        [
            DVec3::new(-1.0, -1.0, z),
            DVec3::new(1.0, -1.0, z),
            DVec3::new(1.0, 1.0, z),
            DVec3::new(-1.0, 1.0, z),
        ]
    }

    fn assert_superposition(aggregate: &ChargeAggregate, rng: &mut StdRng) {
        for _ in 0..50 {
            let p = random_point(rng);
            let expected: DVec3 = aggregate
                .charges()
                .iter()
                .map(|c| c.field(p))
                .chain(aggregate.distributions().iter().map(|d| d.field(p)))
                .sum();
            assert_relative_eq!(aggregate.field_at(p), expected, epsilon = 1e-12, max_relative = 1e-12);
            assert_eq!(aggregate.get_field(p.x, p.y, p.z), aggregate.field_at(p));
        }
    }

    #[test]
    fn test_field_is_superposition() {
        let mut rng = StdRng::seed_from_u64(7);

        let mut dipole_and_plane = ChargeAggregate::new();
        dipole_and_plane.add_charge(PointCharge::new(1.0, DVec3::new(-1.0, 0.0, 0.0)));
        dipole_and_plane.add_charge(PointCharge::new(-1.0, DVec3::new(1.0, 0.0, 0.0)));
        dipole_and_plane.add_distribution(ChargedPlane::new(square(-2.0), 0.25));
        assert_superposition(&dipole_and_plane, &mut rng);

        let mut line_and_sphere = ChargeAggregate::new();
        line_and_sphere.add_charge(PointCharge::new(2.5, DVec3::new(0.0, 3.0, 1.0)));
        line_and_sphere.add_distribution(ChargedLine::new(DVec3::ZERO, DVec3::Z, -0.7));
        line_and_sphere.add_distribution(ChargedSphere::new(DVec3::new(2.0, 2.0, 2.0), 0.5, 1.0, 3.0));
        assert_superposition(&line_and_sphere, &mut rng);

        let mut everything = ChargeAggregate::new();
        everything.add_charge(PointCharge::new(-3.0, DVec3::new(1.0, 1.0, 1.0)));
        everything.add_charge(PointCharge::new(0.5, DVec3::new(-2.0, 0.0, 4.0)));
        everything.add_distribution(ChargedCylinder::new(DVec3::ZERO, DVec3::X, 0.5, 1.5, 0.2));
        everything.add_distribution(ChargedPlane::new(square(3.0), -0.1));
        everything.add_distribution(ChargedSphere::new(DVec3::new(-3.0, -3.0, 0.0), 0.0, 1.0, 1.0));
        assert_superposition(&everything, &mut rng);
    }

    #[test]
    fn test_add_marks_flags_independently() {
        let mut aggregate = ChargeAggregate::new();
        assert!(!aggregate.charges_modified() && !aggregate.distributions_modified());

        assert_eq!(aggregate.add_charge(PointCharge::new(1.0, DVec3::ZERO)), ChangeSet::CHARGES);
        assert!(aggregate.charges_modified());
        assert!(!aggregate.distributions_modified());

        aggregate.set_modified(false);
        aggregate.add_distribution(ChargedLine::new(DVec3::ZERO, DVec3::X, 1.0));
        assert!(!aggregate.charges_modified());
        assert!(aggregate.distributions_modified());

        assert_eq!(aggregate.take_changes(), ChangeSet::DISTRIBUTIONS);
        assert!(!aggregate.distributions_modified());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_charge(PointCharge::new(1.0, DVec3::ZERO).named("q1"));
        aggregate.add_distribution(Distribution::from(ChargedLine::new(DVec3::ZERO, DVec3::X, 1.0)).named("wire"));
        aggregate.set_modified(false);

        let index = aggregate.find_charge("q1").unwrap();
        let changes = aggregate
            .apply(Mutation::MoveCharge {
                index,
                position: DVec3::Y,
            })
            .unwrap();
        assert_eq!(changes, ChangeSet::CHARGES);
        assert_eq!(aggregate.charges()[0].position(), DVec3::Y);

        let wire = aggregate.find_distribution("wire").unwrap();
        let changes = aggregate
            .apply_all([
                Mutation::SetDensity {
                    index: wire,
                    density: 4.0,
                },
                Mutation::SetCharge {
                    index: 0,
                    charge: -2.0,
                },
            ])
            .unwrap();
        assert_eq!(changes, ChangeSet::ALL);
        assert_eq!(aggregate.charges()[0].charge(), -2.0);
        assert_eq!(aggregate.take_changes(), ChangeSet::ALL);
    }

    #[test]
    fn test_set_endpoints_rederives_transform() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_distribution(ChargedLine::new(DVec3::ZERO, DVec3::X, 1.0));
        let before = *aggregate.distributions()[0].transform();

        aggregate
            .apply(Mutation::SetEndpoints {
                index: 0,
                start: DVec3::new(1.0, 2.0, 3.0),
                end: DVec3::new(4.0, 6.0, 9.0),
            })
            .unwrap();
        let after = *aggregate.distributions()[0].transform();
        assert_ne!(before, after);
        assert_abs_diff_eq!(after.to_world(DVec3::new(0.0, 0.0, 0.5)), DVec3::new(4.0, 6.0, 9.0), epsilon = 1e-9);
    }

    #[test]
    fn test_translate_moves_every_kind() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_distribution(ChargedSphere::new(DVec3::ZERO, 0.0, 1.0, 1.0));
        aggregate.add_distribution(ChargedPlane::new(square(0.0), 1.0));
        let offset = DVec3::new(0.0, 0.0, 2.0);
        for index in 0..2 {
            aggregate.apply(Mutation::Translate { index, offset }).unwrap();
        }
        match &aggregate.distributions()[0] {
            Distribution::Sphere(s) => assert_eq!(s.center(), offset),
            other => panic!("unexpected {other:?}"),
        }
        // Field now flips at z = 2
        let plane = &aggregate.distributions()[1];
        assert!(plane.field(DVec3::new(0.0, 0.0, 1.9)).z < 0.0);
        assert!(plane.field(DVec3::new(0.0, 0.0, 2.1)).z > 0.0);
    }

    #[test]
    fn test_invalid_mutations_are_errors() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_distribution(ChargedSphere::new(DVec3::ZERO, 0.0, 1.0, 1.0));

        let err = aggregate
            .apply(Mutation::MoveCharge {
                index: 3,
                position: DVec3::ZERO,
            })
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::IndexOutOfRange {
                kind: "charge",
                index: 3,
                len: 0
            }
        );

        let err = aggregate
            .apply(Mutation::SetEndpoints {
                index: 0,
                start: DVec3::ZERO,
                end: DVec3::X,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot apply set endpoints to a charged sphere (index 0)");
    }

    #[test]
    fn test_start_points_cover_all_sources() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_charge(PointCharge::new(3.0, DVec3::ZERO));
        aggregate.add_charge(PointCharge::new(-2.0, DVec3::X * 4.0));
        aggregate.add_distribution(ChargedSphere::new(DVec3::Y * 5.0, 0.0, 1.0, 4.0));
        let seeds = aggregate.get_start_points(0.0, 0.1);
        assert_eq!(seeds.len(), 3 + 2 + 4);
        assert_eq!(seeds.iter().filter(|s| s.sign < 0.0).count(), 2);
    }

    #[test]
    fn test_should_stop_near_sink() {
        let mut aggregate = ChargeAggregate::new();
        aggregate.add_charge(PointCharge::new(1.0, DVec3::ZERO));
        aggregate.add_charge(PointCharge::new(-1.0, DVec3::X));
        assert!(aggregate.should_stop(1.0, DVec3::new(0.99, 0.0, 0.0), 0.05));
        assert!(!aggregate.should_stop(1.0, DVec3::new(0.01, 0.0, 0.0), 0.05));
        assert!(aggregate.should_stop(-1.0, DVec3::new(0.01, 0.0, 0.0), 0.05));
    }
}
