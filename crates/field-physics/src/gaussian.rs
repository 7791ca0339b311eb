//! Gaussian surfaces
//!
//! Closed surfaces drawn alongside the charges. They contribute no field; they
//! exist to be rendered and to measure the flux crossing them.

use crate::source::VectorField;
use crate::transform::CanonicalTransform;
use glam::DVec3;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianSphere {
    pub name: Option<String>,
    center: DVec3,
    radius: f64,
    transform: CanonicalTransform,
}

impl GaussianSphere {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self {
            name: None,
            center,
            radius,
            transform: CanonicalTransform::for_sphere(center, radius),
        }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn area(&self) -> f64 {
        4.0 * PI * self.radius * self.radius
    }

    /// Midpoint-rule flux with `resolution` polar and `2·resolution` azimuthal cells.
    pub fn flux<F: VectorField + ?Sized>(&self, field: &F, resolution: usize) -> f64 {
        let n_theta = resolution.max(1);
        let n_phi = 2 * n_theta;
        let d_theta = PI / n_theta as f64;
        let d_phi = TAU / n_phi as f64;
        let r2 = self.radius * self.radius;

        let mut flux = 0.0;
        for i in 0..n_theta {
            let theta = (i as f64 + 0.5) * d_theta;
            let (sin_t, cos_t) = theta.sin_cos();
            let d_area = r2 * sin_t * d_theta * d_phi;
            for j in 0..n_phi {
                let phi = (j as f64 + 0.5) * d_phi;
                let normal = DVec3::new(sin_t * phi.cos(), sin_t * phi.sin(), cos_t);
                let e = field.field(self.center + normal * self.radius);
                flux += e.dot(normal) * d_area;
            }
        }
        flux
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianCylinder {
    pub name: Option<String>,
    start: DVec3,
    end: DVec3,
    radius: f64,
    transform: CanonicalTransform,
}

impl GaussianCylinder {
    pub fn new(start: DVec3, end: DVec3, radius: f64) -> Self {
        Self {
            name: None,
            start,
            end,
            radius,
            transform: CanonicalTransform::for_segment(start, end, radius),
        }
    }

    pub fn start(&self) -> DVec3 {
        self.start
    }

    pub fn end(&self) -> DVec3 {
        self.end
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn area(&self) -> f64 {
        let length = self.start.distance(self.end);
        TAU * self.radius * (length + self.radius)
    }

    /// Midpoint-rule flux through the side wall and both caps.
    pub fn flux<F: VectorField + ?Sized>(&self, field: &F, resolution: usize) -> f64 {
        let n = resolution.max(1);
        let n_phi = 2 * n;
        let d_phi = TAU / n_phi as f64;
        let length = self.start.distance(self.end);
        let axis = self.transform.direction_to_world(DVec3::Z);
        let e1 = self.transform.direction_to_world(DVec3::X);
        let e2 = self.transform.direction_to_world(DVec3::Y);
        let ds = length / n as f64;
        let dr = self.radius / n as f64;

        let mut flux = 0.0;
        for j in 0..n_phi {
            let phi = (j as f64 + 0.5) * d_phi;
            let radial = e1 * phi.cos() + e2 * phi.sin();

            for i in 0..n {
                let s = (i as f64 + 0.5) * ds;
                let p = self.start + axis * s + radial * self.radius;
                flux += field.field(p).dot(radial) * self.radius * d_phi * ds;
            }

            for i in 0..n {
                let rho = (i as f64 + 0.5) * dr;
                let d_area = rho * dr * d_phi;
                let bottom = self.start + radial * rho;
                let top = self.end + radial * rho;
                flux += field.field(top).dot(axis) * d_area;
                flux -= field.field(bottom).dot(axis) * d_area;
            }
        }
        flux
    }
}

/// Surface kinds that can appear in a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum GaussianSurface {
    Sphere(GaussianSphere),
    Cylinder(GaussianCylinder),
}

impl GaussianSurface {
    pub fn name(&self) -> Option<&str> {
        match self {
            GaussianSurface::Sphere(s) => s.name.as_deref(),
            GaussianSurface::Cylinder(s) => s.name.as_deref(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = Some(name.into());
        match &mut self {
            GaussianSurface::Sphere(s) => s.name = name,
            GaussianSurface::Cylinder(s) => s.name = name,
        }
        self
    }

    pub fn transform(&self) -> &CanonicalTransform {
        match self {
            GaussianSurface::Sphere(s) => &s.transform,
            GaussianSurface::Cylinder(s) => &s.transform,
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            GaussianSurface::Sphere(s) => s.area(),
            GaussianSurface::Cylinder(s) => s.area(),
        }
    }

    pub fn flux<F: VectorField + ?Sized>(&self, field: &F, resolution: usize) -> f64 {
        match self {
            GaussianSurface::Sphere(s) => s.flux(field, resolution),
            GaussianSurface::Cylinder(s) => s.flux(field, resolution),
        }
    }
}
