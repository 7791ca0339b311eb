//! Continuous charge distributions
//!
//! All fields use Gauss's law shortcuts for idealised, infinite geometry:
//!
//! - lines and cylinders are infinite along their axis (the projection onto the
//!   axis is not clamped to the drawn segment)
//! - planes are infinite sheets with a constant `2πσ` field
//! - shells are empty inside the inner radius; in the annulus the field scales
//!   with the enclosed charge; outside it only depends on the total charge

use crate::constants::{GOLDEN_ANGLE, K_ELECTRIC};
use crate::seed::{fibonacci_sphere, outward_sign, FieldLineCount, SeedPoint};
use crate::source::FieldSource;
use crate::transform::{CanonicalTransform, XSide};
use glam::DVec3;
use std::f64::consts::PI;

/// Offset from the infinite line through `start` and `end` to `point`.
///
/// Zero-length lines produce NaN.
fn axial_offset(start: DVec3, end: DVec3, point: DVec3) -> DVec3 {
    let d = end - start;
    let u = (point - start).dot(d) / d.length_squared();
    point - (start + d * u)
}

/// Helix of `n` canonical points at radial distance `radius` around the unit axis.
fn helix(n: usize, phi0: f64, radius: f64) -> impl Iterator<Item = DVec3> {
    (0..n).map(move |i| {
        let z = -0.5 + (i as f64 + 0.5) / n as f64;
        let angle = phi0 + GOLDEN_ANGLE * i as f64;
        DVec3::new(radius * angle.cos(), radius * angle.sin(), z)
    })
}

/// Infinite line of charge with linear density `λ`, drawn between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedLine {
    pub name: Option<String>,
    pub lines: FieldLineCount,
    start: DVec3,
    end: DVec3,
    density: f64,
    transform: CanonicalTransform,
}

impl ChargedLine {
    pub fn new(start: DVec3, end: DVec3, density: f64) -> Self {
        Self {
            name: None,
            lines: FieldLineCount::default(),
            start,
            end,
            density,
            transform: CanonicalTransform::for_segment(start, end, 0.0),
        }
    }

    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn end(&self) -> DVec3 {
        self.end
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn transform(&self) -> &CanonicalTransform {
        &self.transform
    }

    pub(crate) fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    pub(crate) fn set_endpoints(&mut self, start: DVec3, end: DVec3) {
        self.start = start;
        self.end = end;
        self.transform = CanonicalTransform::for_segment(start, end, 0.0);
    }
}

impl FieldSource for ChargedLine {
    fn field(&self, point: DVec3) -> DVec3 {
        let offset = axial_offset(self.start, self.end, point);
        let n = offset.length();
        if n == 0.0 {
            return DVec3::ZERO;
        }
        offset * (2.0 * K_ELECTRIC * self.density / (n * n))
    }

    fn total_charge(&self) -> f64 {
        self.density * self.start.distance(self.end)
    }

    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let sign = outward_sign(self.density);
        let n = self.lines.count(self.total_charge());
        helix(n, phi0, radius / self.transform.scale.x)
            .map(|p| SeedPoint::at(self.transform.to_world(p), sign))
            .collect()
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        self.density * sign < 0.0
            && axial_offset(self.start, self.end, point).length_squared() < radius * radius
    }
}

/// Infinite sheet of charge with areal density `σ`, drawn as a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedPlane {
    pub name: Option<String>,
    pub lines: FieldLineCount,
    corners: [DVec3; 4],
    density: f64,
    normal: DVec3,
    xside: XSide,
    transform: CanonicalTransform,
}

impl ChargedPlane {
    /// `corners` run around the rectangle's perimeter.
    pub fn new(corners: [DVec3; 4], density: f64) -> Self {
        Self::with_xside(corners, density, XSide::default())
    }

    pub fn with_xside(corners: [DVec3; 4], density: f64, xside: XSide) -> Self {
        Self {
            name: None,
            lines: FieldLineCount::default(),
            corners,
            density,
            normal: Self::unit_normal(&corners),
            xside,
            transform: CanonicalTransform::for_rectangle(corners, xside),
        }
    }

    fn unit_normal(corners: &[DVec3; 4]) -> DVec3 {
        let n = (corners[1] - corners[0]).cross(corners[3] - corners[0]);
        n / n.length()
    }

    pub fn corners(&self) -> [DVec3; 4] {
        self.corners
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Unit normal `(c1 − c0) × (c3 − c0)`. NaN for a zero-area rectangle.
    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn area(&self) -> f64 {
        (self.corners[1] - self.corners[0])
            .cross(self.corners[3] - self.corners[0])
            .length()
    }

    pub fn transform(&self) -> &CanonicalTransform {
        &self.transform
    }

    /// Signed distance from the plane along the normal.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        (point - self.corners[0]).dot(self.normal)
    }

    pub(crate) fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    pub(crate) fn set_corners(&mut self, corners: [DVec3; 4]) {
        self.corners = corners;
        self.normal = Self::unit_normal(&corners);
        self.transform = CanonicalTransform::for_rectangle(corners, self.xside);
    }
}

impl FieldSource for ChargedPlane {
    /// `±2πσ` along the normal depending on the side. Exactly on the plane the
    /// field is zero.
    fn field(&self, point: DVec3) -> DVec3 {
        let side = self.signed_distance(point);
        if side == 0.0 {
            return DVec3::ZERO;
        }
        self.normal * (2.0 * PI * K_ELECTRIC * self.density * side.signum())
    }

    fn total_charge(&self) -> f64 {
        self.density * self.area()
    }

    /// Grid over the rectangle, alternating sides so the flux splits evenly.
    /// `phi0` is not used: the grid is fixed to the rectangle's edges.
    fn seed_points(&self, _phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let sign = outward_sign(self.density);
        let n = self.lines.count(self.total_charge());
        let k = (n as f64).sqrt().ceil().max(1.0) as usize;
        (0..n)
            .map(|i| {
                let unit = DVec3::new(
                    -0.5 + ((i % k) as f64 + 0.5) / k as f64,
                    -0.5 + ((i / k) as f64 + 0.5) / k as f64,
                    0.0,
                );
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                let on_plane = self.transform.to_world(unit);
                SeedPoint::at(on_plane + self.normal * (side * radius), sign)
            })
            .collect()
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        self.density * sign < 0.0 && self.signed_distance(point).abs() < radius
    }
}

/// Cylindrical shell with volume density `ρ` between `inner` and `outer` radii.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedCylinder {
    pub name: Option<String>,
    pub lines: FieldLineCount,
    start: DVec3,
    end: DVec3,
    inner: f64,
    outer: f64,
    density: f64,
    transform: CanonicalTransform,
}

impl ChargedCylinder {
    /// Radii given in the wrong order are swapped so `inner <= outer`.
    pub fn new(start: DVec3, end: DVec3, inner: f64, outer: f64, density: f64) -> Self {
        let (inner, outer) = ordered_radii(inner, outer);
        Self {
            name: None,
            lines: FieldLineCount::default(),
            start,
            end,
            inner,
            outer,
            density,
            transform: CanonicalTransform::for_segment(start, end, outer),
        }
    }

    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn end(&self) -> DVec3 {
        self.end
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.inner, self.outer)
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn transform(&self) -> &CanonicalTransform {
        &self.transform
    }

    /// Charge per unit length across the whole shell.
    pub fn linear_density(&self) -> f64 {
        self.density * PI * (self.outer * self.outer - self.inner * self.inner)
    }

    pub(crate) fn set_density(&mut self, density: f64) {
        self.density = density;
    }

    pub(crate) fn set_endpoints(&mut self, start: DVec3, end: DVec3) {
        self.start = start;
        self.end = end;
        self.transform = CanonicalTransform::for_segment(start, end, self.outer);
    }

    pub(crate) fn set_radii(&mut self, inner: f64, outer: f64) {
        (self.inner, self.outer) = ordered_radii(inner, outer);
        self.transform = CanonicalTransform::for_segment(self.start, self.end, self.outer);
    }
}

impl FieldSource for ChargedCylinder {
    fn field(&self, point: DVec3) -> DVec3 {
        let offset = axial_offset(self.start, self.end, point);
        let n = offset.length();
        if n < self.inner || n == 0.0 {
            return DVec3::ZERO;
        }
        let r0 = self.inner * self.inner;
        let area = if n < self.outer {
            PI * (n * n - r0)
        } else {
            PI * (self.outer * self.outer - r0)
        };
        offset * (2.0 * K_ELECTRIC * self.density * area / (n * n))
    }

    fn total_charge(&self) -> f64 {
        self.linear_density() * self.start.distance(self.end)
    }

    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let sign = outward_sign(self.density);
        let n = self.lines.count(self.total_charge());
        helix(n, phi0, (self.outer + radius) / self.transform.scale.x)
            .map(|p| SeedPoint::at(self.transform.to_world(p), sign))
            .collect()
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        let reach = self.outer + radius;
        self.density * sign < 0.0
            && axial_offset(self.start, self.end, point).length_squared() < reach * reach
    }
}

/// Spherical shell holding total charge `Q` uniformly between `inner` and `outer`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargedSphere {
    pub name: Option<String>,
    pub lines: FieldLineCount,
    center: DVec3,
    inner: f64,
    outer: f64,
    charge: f64,
    transform: CanonicalTransform,
}

impl ChargedSphere {
    /// Shell holding `charge` in total.
    pub fn new(center: DVec3, inner: f64, outer: f64, charge: f64) -> Self {
        let (inner, outer) = ordered_radii(inner, outer);
        Self {
            name: None,
            lines: FieldLineCount::default(),
            center,
            inner,
            outer,
            charge,
            transform: CanonicalTransform::for_sphere(center, outer),
        }
    }

    /// Shell with uniform volume density `ρ`.
    pub fn with_density(center: DVec3, inner: f64, outer: f64, density: f64) -> Self {
        let mut sphere = Self::new(center, inner, outer, 0.0);
        sphere.charge = density * sphere.volume();
        sphere
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.inner, self.outer)
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * (self.outer.powi(3) - self.inner.powi(3))
    }

    /// Volume density. Infinite for a thin charged shell.
    pub fn density(&self) -> f64 {
        self.charge / self.volume()
    }

    pub fn transform(&self) -> &CanonicalTransform {
        &self.transform
    }

    pub(crate) fn set_density(&mut self, density: f64) {
        self.charge = density * self.volume();
    }

    pub(crate) fn set_charge(&mut self, charge: f64) {
        self.charge = charge;
    }

    pub(crate) fn set_center(&mut self, center: DVec3) {
        self.center = center;
        self.transform = CanonicalTransform::for_sphere(center, self.outer);
    }

    pub(crate) fn set_radii(&mut self, inner: f64, outer: f64) {
        (self.inner, self.outer) = ordered_radii(inner, outer);
        self.transform = CanonicalTransform::for_sphere(self.center, self.outer);
    }
}

impl FieldSource for ChargedSphere {
    fn field(&self, point: DVec3) -> DVec3 {
        let r = point - self.center;
        let n = r.length();
        if n < self.inner || n == 0.0 {
            return DVec3::ZERO;
        }
        let enclosed = if n < self.outer {
            let a3 = self.inner.powi(3);
            self.charge * (n.powi(3) - a3) / (self.outer.powi(3) - a3)
        } else {
            self.charge
        };
        r * (K_ELECTRIC * enclosed / (n * n * n))
    }

    fn total_charge(&self) -> f64 {
        self.charge
    }

    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        let sign = outward_sign(self.charge);
        let reach = self.outer + radius;
        fibonacci_sphere(self.lines.count(self.charge), phi0)
            .into_iter()
            .map(|dir| SeedPoint::at(self.center + dir * reach, sign))
            .collect()
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        let reach = self.outer + radius;
        self.charge * sign < 0.0 && point.distance_squared(self.center) < reach * reach
    }
}

fn ordered_radii(inner: f64, outer: f64) -> (f64, f64) {
    if inner > outer {
        log::debug!("shell radii given as ({inner}, {outer}), swapping");
        (outer, inner)
    } else {
        (inner, outer)
    }
}

/// Any continuous distribution held by a [`crate::ChargeAggregate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    Line(ChargedLine),
    Plane(ChargedPlane),
    Cylinder(ChargedCylinder),
    Sphere(ChargedSphere),
}

impl Distribution {
    pub fn kind(&self) -> &'static str {
        match self {
            Distribution::Line(_) => "charged line",
            Distribution::Plane(_) => "charged plane",
            Distribution::Cylinder(_) => "charged cylinder",
            Distribution::Sphere(_) => "charged sphere",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Distribution::Line(d) => d.name.as_deref(),
            Distribution::Plane(d) => d.name.as_deref(),
            Distribution::Cylinder(d) => d.name.as_deref(),
            Distribution::Sphere(d) => d.name.as_deref(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match &mut self {
            Distribution::Line(d) => d.name = name,
            Distribution::Plane(d) => d.name = name,
            Distribution::Cylinder(d) => d.name = name,
            Distribution::Sphere(d) => d.name = name,
        }
        self
    }

    pub fn with_lines(mut self, lines: FieldLineCount) -> Self {
        match &mut self {
            Distribution::Line(d) => d.lines = lines,
            Distribution::Plane(d) => d.lines = lines,
            Distribution::Cylinder(d) => d.lines = lines,
            Distribution::Sphere(d) => d.lines = lines,
        }
        self
    }

    pub fn transform(&self) -> &CanonicalTransform {
        match self {
            Distribution::Line(d) => d.transform(),
            Distribution::Plane(d) => d.transform(),
            Distribution::Cylinder(d) => d.transform(),
            Distribution::Sphere(d) => d.transform(),
        }
    }

    fn source(&self) -> &dyn FieldSource {
        match self {
            Distribution::Line(d) => d,
            Distribution::Plane(d) => d,
            Distribution::Cylinder(d) => d,
            Distribution::Sphere(d) => d,
        }
    }
}

impl FieldSource for Distribution {
    fn field(&self, point: DVec3) -> DVec3 {
        self.source().field(point)
    }

    fn total_charge(&self) -> f64 {
        self.source().total_charge()
    }

    fn seed_points(&self, phi0: f64, radius: f64) -> Vec<SeedPoint> {
        self.source().seed_points(phi0, radius)
    }

    fn is_sink_near(&self, sign: f64, point: DVec3, radius: f64) -> bool {
        self.source().is_sink_near(sign, point, radius)
    }
}

impl From<ChargedLine> for Distribution {
    fn from(d: ChargedLine) -> Self {
        Distribution::Line(d)
    }
}

impl From<ChargedPlane> for Distribution {
    fn from(d: ChargedPlane) -> Self {
        Distribution::Plane(d)
    }
}

impl From<ChargedCylinder> for Distribution {
    fn from(d: ChargedCylinder) -> Self {
        Distribution::Cylinder(d)
    }
}

impl From<ChargedSphere> for Distribution {
    fn from(d: ChargedSphere) -> Self {
        Distribution::Sphere(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn xy_square(half: f64) -> [DVec3; 4] {
        [
            DVec3::new(-half, -half, 0.0),
            DVec3::new(half, -half, 0.0),
            DVec3::new(half, half, 0.0),
            DVec3::new(-half, half, 0.0),
        ]
    }

    #[test]
    fn test_line_field_falls_as_one_over_r() {
        let line = ChargedLine::new(DVec3::new(0.0, 0.0, -1.0), DVec3::new(0.0, 0.0, 1.0), 3.0);
        let e1 = line.field(DVec3::new(1.0, 0.0, 0.0));
        let e2 = line.field(DVec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(e1.x, 6.0, epsilon = 1e-12);
        assert_relative_eq!(e2.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(e2.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_line_is_infinite_beyond_segment() {
        let line = ChargedLine::new(DVec3::new(0.0, 0.0, -1.0), DVec3::new(0.0, 0.0, 1.0), 1.0);
        // Far past the drawn end, the field is still purely radial
        let e = line.field(DVec3::new(1.0, 0.0, 50.0));
        assert_relative_eq!(e.x, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.z, 0.0, epsilon = 1e-9);
        assert_eq!(line.field(DVec3::new(0.0, 0.0, 10.0)), DVec3::ZERO);
    }

    #[test]
    fn test_zero_length_line_is_nan() {
        let line = ChargedLine::new(DVec3::ONE, DVec3::ONE, 1.0);
        assert!(line.field(DVec3::ZERO).is_nan());
    }

    #[test]
    fn test_plane_field_is_constant_and_flips() {
        let plane = ChargedPlane::new(xy_square(1.0), 0.5);
        let expected = 2.0 * PI * 0.5;
        for z in [0.01, 1.0, 25.0, 1e4] {
            let above = plane.field(DVec3::new(0.3, -0.2, z));
            let below = plane.field(DVec3::new(5.0, 7.0, -z));
            assert_relative_eq!(above.length(), expected, epsilon = 1e-12);
            assert_relative_eq!(above.z, expected, epsilon = 1e-12);
            assert_relative_eq!(below.z, -expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_plane_field_is_zero_on_plane() {
        let plane = ChargedPlane::new(xy_square(1.0), 2.0);
        assert_eq!(plane.field(DVec3::new(0.5, 0.5, 0.0)), DVec3::ZERO);
        assert_eq!(plane.field(DVec3::new(40.0, -3.0, 0.0)), DVec3::ZERO);
    }

    #[test]
    fn test_negative_plane_points_inward() {
        let plane = ChargedPlane::new(xy_square(1.0), -1.0);
        assert!(plane.field(DVec3::new(0.0, 0.0, 1.0)).z < 0.0);
        assert!(plane.field(DVec3::new(0.0, 0.0, -1.0)).z > 0.0);
    }

    #[test]
    fn test_degenerate_plane_is_nan() {
        let flat = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0, DVec3::X * 3.0];
        let plane = ChargedPlane::new(flat, 1.0);
        assert!(plane.normal().is_nan());
        assert!(plane.field(DVec3::new(0.0, 1.0, 1.0)).is_nan());
    }

    #[test]
    fn test_plane_seeds_sit_on_both_sides() {
        let plane = ChargedPlane::new(xy_square(2.0), 1.0);
        let seeds = plane.seed_points(0.0, 0.1);
        assert_eq!(seeds.len(), 16);
        let above = seeds.iter().filter(|s| s.position.z > 0.0).count();
        assert_eq!(above, 8);
        for s in &seeds {
            assert_relative_eq!(s.position.z.abs(), 0.1, epsilon = 1e-12);
            assert!(s.position.x.abs() < 2.0 && s.position.y.abs() < 2.0);
        }
    }

    #[test]
    fn test_cylinder_regimes() {
        let cyl = ChargedCylinder::new(DVec3::ZERO, DVec3::Z, 1.0, 2.0, 1.0);
        assert_eq!(cyl.field(DVec3::new(0.5, 0.0, 0.3)), DVec3::ZERO);

        let annulus = cyl.field(DVec3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(annulus.x, 2.0 * PI * (2.25 - 1.0) / 1.5, epsilon = 1e-12);

        let outside = cyl.field(DVec3::new(0.0, 4.0, 0.0));
        assert_relative_eq!(outside.y, 2.0 * PI * 3.0 / 4.0, epsilon = 1e-12);

        // Outside, a cylinder acts as a line with the same linear density
        let line = ChargedLine::new(DVec3::ZERO, DVec3::Z, cyl.linear_density());
        assert_abs_diff_eq!(line.field(DVec3::new(3.0, 1.0, 0.0)), cyl.field(DVec3::new(3.0, 1.0, 0.0)), epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_is_continuous_at_radii() {
        let cyl = ChargedCylinder::new(DVec3::new(1.0, 1.0, 0.0), DVec3::new(2.0, 3.0, 1.0), 0.5, 1.5, -2.0);
        let axis = (cyl.end() - cyl.start()).normalize();
        let radial = axis.any_orthonormal_vector();
        let at = |r: f64| cyl.field(cyl.start() + radial * r).length();
        assert_relative_eq!(at(1.5 - 1e-9), at(1.5 + 1e-9), max_relative = 1e-6);
        assert_abs_diff_eq!(at(0.5 + 1e-9), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cylinder_swaps_radii() {
        let cyl = ChargedCylinder::new(DVec3::ZERO, DVec3::Z, 3.0, 1.0, 1.0);
        assert_eq!(cyl.radii(), (1.0, 3.0));
    }

    fn shell_magnitude(q: f64, a: f64, b: f64, r: f64) -> f64 {
        if r < a {
            0.0
        } else if r < b {
            q * (r.powi(3) - a.powi(3)) / (b.powi(3) - a.powi(3)) / (r * r)
        } else {
            q / (r * r)
        }
    }

    #[test]
    fn test_sphere_shell_regimes() {
        let (q, a, b) = (5.0, 1.0, 2.0);
        let sphere = ChargedSphere::new(DVec3::ZERO, a, b, q);
        for r in [0.2, 0.99, 1.0, 1.3, 1.99, 2.0, 3.5, 10.0] {
            let dir = DVec3::new(1.0, -2.0, 0.5).normalize();
            let e = sphere.field(dir * r);
            assert_relative_eq!(e.length(), shell_magnitude(q, a, b, r), epsilon = 1e-12);
            if r > a {
                assert_relative_eq!(e.normalize().dot(dir), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_sphere_is_continuous_at_radii() {
        let sphere = ChargedSphere::new(DVec3::new(1.0, 2.0, 3.0), 1.0, 2.0, 4.0);
        let at = |r: f64| sphere.field(sphere.center() + DVec3::Y * r).length();
        assert_abs_diff_eq!(at(1.0 - 1e-10), at(1.0 + 1e-10), epsilon = 1e-8);
        assert_abs_diff_eq!(at(2.0 - 1e-10), at(2.0 + 1e-10), epsilon = 1e-8);
        assert_relative_eq!(at(2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_outside_matches_point_charge() {
        use crate::charge::PointCharge;
        let sphere = ChargedSphere::with_density(DVec3::ZERO, 0.5, 1.0, 2.0);
        let point = PointCharge::new(sphere.charge(), DVec3::ZERO);
        let p = DVec3::new(2.0, -1.0, 3.0);
        assert_abs_diff_eq!(sphere.field(p), point.field(p), epsilon = 1e-12);
        assert_relative_eq!(sphere.density(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_thin_sphere_shell() {
        let sphere = ChargedSphere::new(DVec3::ZERO, 1.0, 1.0, 2.0);
        assert_eq!(sphere.field(DVec3::X * 0.999), DVec3::ZERO);
        assert_relative_eq!(sphere.field(DVec3::X).x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_distribution_seed_counts_follow_total_charge() {
        let line: Distribution = ChargedLine::new(DVec3::ZERO, DVec3::new(0.0, 0.0, 4.0), 1.5)
            .into();
        let seeds = line.seed_points(0.0, 0.2);
        assert_eq!(seeds.len(), 6);
        for s in &seeds {
            assert_relative_eq!(s.position.truncate().length(), 0.2, epsilon = 1e-9);
            assert!(s.position.z > 0.0 && s.position.z < 4.0);
        }

        let cyl = Distribution::from(ChargedCylinder::new(DVec3::ZERO, DVec3::X, 0.0, 1.0, -1.0))
            .with_lines(FieldLineCount::new(None, Some(4)));
        let seeds = cyl.seed_points(0.0, 0.5);
        assert_eq!(seeds.len(), 4);
        for s in &seeds {
            assert_eq!(s.sign, -1.0);
            assert_relative_eq!(s.position.y.hypot(s.position.z), 1.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_sinks() {
        let sphere = ChargedSphere::new(DVec3::ZERO, 0.0, 1.0, -1.0);
        assert!(sphere.is_sink_near(1.0, DVec3::X * 1.05, 0.1));
        assert!(!sphere.is_sink_near(-1.0, DVec3::X * 1.05, 0.1));
        let plane = ChargedPlane::new(xy_square(1.0), -1.0);
        assert!(plane.is_sink_near(1.0, DVec3::new(9.0, 9.0, 0.01), 0.05));
        assert!(!plane.is_sink_near(1.0, DVec3::new(0.0, 0.0, 0.5), 0.05));
    }
}
