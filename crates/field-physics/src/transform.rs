//! Canonical transforms
//!
//! Every distribution is drawn and seeded from a canonical unit shape:
//!
//! - line / cylinder: height 1 along z (`z ∈ [-0.5, 0.5]`), radius 1
//! - plane: the unit square `[-0.5, 0.5]²` in the xy-plane, normal +z
//! - sphere: the unit sphere
//!
//! A [`CanonicalTransform`] maps that shape onto the distribution's actual
//! placement as `translate · Rz · Rx · Ry · scale`. The same transform positions
//! the render mesh and maps canonical seed points into world space.

use glam::{DMat4, DQuat, DVec3};
use std::f64::consts::{FRAC_PI_2, PI};

/// `+1` for `x >= 0`, otherwise `-1`.
///
/// Picks one of the two equivalent rotation solutions so that smoothly varying
/// endpoints never flip the derived orientation.
pub fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Which rectangle edge becomes the canonical x side.
///
/// The other edge drives the z and x rotations; this one drives the y rotation.
/// Both choices describe the same rectangle but orient it differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XSide {
    /// `corners[0] → corners[1]` is the x side
    #[default]
    First,
    /// `corners[0] → corners[3]` is the x side
    Second,
}

/// Translation, rotation angles and scale mapping a canonical unit shape into world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalTransform {
    pub translation: DVec3,
    /// Rotation about z, applied last
    pub rot_z: f64,
    /// Rotation about x
    pub rot_x: f64,
    /// Rotation about y, applied first
    pub rot_y: f64,
    pub scale: DVec3,
}

impl Default for CanonicalTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CanonicalTransform {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rot_z: 0.0,
        rot_x: 0.0,
        rot_y: 0.0,
        scale: DVec3::ONE,
    };

    /// Transform for a segment from `start` to `end` with the given drawn radius.
    ///
    /// Translate to the midpoint, take `φ` about z from the xy-projection, then
    /// `θ` about y from the remaining tilt. A radius of zero keeps a unit
    /// cross-section so the transform stays invertible for bare lines.
    pub fn for_segment(start: DVec3, end: DVec3, radius: f64) -> Self {
        let d = end - start;
        let length = d.length();

        let rot_z = if d.x == 0.0 {
            if d.y == 0.0 {
                0.0
            } else {
                sign(d.y) * FRAC_PI_2
            }
        } else {
            (d.y / d.x).atan()
        };

        // Signed in-plane extent once the z rotation is undone
        let rho = d.x * rot_z.cos() + d.y * rot_z.sin();
        let rot_y = if length == 0.0 {
            0.0
        } else {
            sign(rho) * (d.z / length).clamp(-1.0, 1.0).acos()
        };

        let cross = if radius > 0.0 { radius } else { 1.0 };
        Self {
            translation: (start + end) * 0.5,
            rot_z,
            rot_x: 0.0,
            rot_y,
            scale: DVec3::new(cross, cross, length),
        }
    }

    /// Transform for a rectangle given as four corners in perimeter order.
    ///
    /// The edge not selected by `xside` fixes the z rotation (its slope in the
    /// xy-plane) and then the x rotation (its remaining tilt); the selected edge
    /// fixes the y rotation. Axis-aligned edges take the explicit zero-delta
    /// branches.
    pub fn for_rectangle(corners: [DVec3; 4], xside: XSide) -> Self {
        let center = (corners[0] + corners[1] + corners[2] + corners[3]) * 0.25;
        let first = corners[1] - corners[0];
        let second = corners[3] - corners[0];
        let (x_edge, y_edge) = match xside {
            XSide::First => (first, second),
            XSide::Second => (second, first),
        };

        let rot_z = if y_edge.x == 0.0 {
            if y_edge.y >= 0.0 {
                0.0
            } else {
                PI
            }
        } else {
            (-y_edge.x).atan2(y_edge.y)
        };

        let planar = y_edge.x.hypot(y_edge.y);
        let rot_x = if planar == 0.0 {
            if y_edge.z == 0.0 {
                0.0
            } else {
                sign(y_edge.z) * FRAC_PI_2
            }
        } else {
            y_edge.z.atan2(planar)
        };

        // x edge as seen after undoing the z and x rotations
        let undo = DQuat::from_rotation_x(-rot_x) * DQuat::from_rotation_z(-rot_z);
        let x_local = undo * x_edge;
        let rot_y = if x_local.z == 0.0 {
            if x_local.x >= 0.0 {
                0.0
            } else {
                PI
            }
        } else {
            (-x_local.z).atan2(x_local.x)
        };

        Self {
            translation: center,
            rot_z,
            rot_x,
            rot_y,
            scale: DVec3::new(x_local.x.hypot(x_local.z), y_edge.length(), 1.0),
        }
    }

    /// Transform for a sphere of the given outer radius.
    pub fn for_sphere(center: DVec3, radius: f64) -> Self {
        let r = if radius > 0.0 { radius } else { 1.0 };
        Self {
            translation: center,
            scale: DVec3::splat(r),
            ..Self::IDENTITY
        }
    }

    pub fn rotation(&self) -> DQuat {
        DQuat::from_rotation_z(self.rot_z)
            * DQuat::from_rotation_x(self.rot_x)
            * DQuat::from_rotation_y(self.rot_y)
    }

    /// Model matrix for the canonical mesh.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation(), self.translation)
    }

    /// Canonical point to world space.
    pub fn to_world(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation() * (point * self.scale)
    }

    /// World point back to canonical space.
    pub fn to_model(&self, point: DVec3) -> DVec3 {
        (self.rotation().inverse() * (point - self.translation)) / self.scale
    }

    /// Rotate a canonical direction into world space, ignoring scale.
    pub fn direction_to_world(&self, direction: DVec3) -> DVec3 {
        self.rotation() * direction
    }
}
