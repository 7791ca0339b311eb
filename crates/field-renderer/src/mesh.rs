//! Canonical display meshes and the shapes that use them
//!
//! Every distribution and Gaussian surface is drawn as one of a few unit
//! shapes placed by its canonical transform. The meshes are built once per
//! [`MeshRegistry`], which the host owns and passes to whatever draws them.

use crate::vertex::MeshVertex;
use field_physics::{CanonicalTransform, Distribution, GaussianSurface};
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

/// Unit shapes in model space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// `(0, 0, -0.5) → (0, 0, 0.5)`, drawn as a line
    Segment,
    /// `[-0.5, 0.5]²` in the xy-plane
    Square,
    /// Radius 1, `z ∈ [-0.5, 0.5]`, open ends
    Cylinder,
    /// Radius 1 about the origin
    Sphere,
}

/// How the indices of a mesh are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Lines,
    Triangles,
}

#[derive(Debug, Clone)]
pub struct CanonicalMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

impl CanonicalMesh {
    pub fn build(kind: ShapeKind, segments: u32) -> Self {
        let segments = segments.max(3);
        match kind {
            ShapeKind::Segment => Self {
                vertices: vec![
                    MeshVertex::new(Vec3::new(0.0, 0.0, -0.5), Vec3::X),
                    MeshVertex::new(Vec3::new(0.0, 0.0, 0.5), Vec3::X),
                ],
                indices: vec![0, 1],
                topology: Topology::Lines,
            },
            ShapeKind::Square => Self {
                vertices: [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]
                    .into_iter()
                    .map(|(x, y)| MeshVertex::new(Vec3::new(x, y, 0.0), Vec3::Z))
                    .collect(),
                indices: vec![0, 1, 2, 0, 2, 3],
                topology: Topology::Triangles,
            },
            ShapeKind::Cylinder => Self::cylinder(segments),
            ShapeKind::Sphere => Self::sphere(segments),
        }
    }

    fn cylinder(segments: u32) -> Self {
        let mut vertices = Vec::with_capacity(2 * segments as usize);
        for i in 0..segments {
            let phi = TAU * i as f32 / segments as f32;
            let normal = Vec3::new(phi.cos(), phi.sin(), 0.0);
            vertices.push(MeshVertex::new(normal - Vec3::Z * 0.5, normal));
            vertices.push(MeshVertex::new(normal + Vec3::Z * 0.5, normal));
        }
        let mut indices = Vec::with_capacity(6 * segments as usize);
        for i in 0..segments {
            let a = 2 * i;
            let b = 2 * ((i + 1) % segments);
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
        Self {
            vertices,
            indices,
            topology: Topology::Triangles,
        }
    }

    /// Latitude/longitude sphere with `segments` bands and `2·segments` sectors.
    fn sphere(segments: u32) -> Self {
        let bands = segments;
        let sectors = 2 * segments;
        let mut vertices = Vec::with_capacity(((bands + 1) * (sectors + 1)) as usize);
        for i in 0..=bands {
            let theta = PI * i as f32 / bands as f32;
            for j in 0..=sectors {
                let phi = TAU * j as f32 / sectors as f32;
                let n = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
                vertices.push(MeshVertex::new(n, n));
            }
        }
        let row = sectors + 1;
        let mut indices = Vec::with_capacity((6 * bands * sectors) as usize);
        for i in 0..bands {
            for j in 0..sectors {
                let a = i * row + j;
                let b = a + row;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self {
            vertices,
            indices,
            topology: Topology::Triangles,
        }
    }
}

/// Cache of canonical meshes keyed by shape.
#[derive(Debug)]
pub struct MeshRegistry {
    segments: u32,
    meshes: HashMap<ShapeKind, CanonicalMesh>,
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::new(32)
    }
}

impl MeshRegistry {
    pub fn new(segments: u32) -> Self {
        Self {
            segments,
            meshes: HashMap::new(),
        }
    }

    /// The mesh for `kind`, built on first request.
    pub fn get(&mut self, kind: ShapeKind) -> &CanonicalMesh {
        let segments = self.segments;
        self.meshes.entry(kind).or_insert_with(|| {
            log::debug!("Building canonical {kind:?} mesh ({segments} segments)");
            CanonicalMesh::build(kind, segments)
        })
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

/// Something drawn as a canonical shape under a model matrix.
pub trait RenderableShellGeometry {
    fn shape_kind(&self) -> ShapeKind;

    fn canonical_transform(&self) -> &CanonicalTransform;

    fn model_matrix(&self) -> Mat4 {
        self.canonical_transform().matrix().as_mat4()
    }
}

impl RenderableShellGeometry for Distribution {
    fn shape_kind(&self) -> ShapeKind {
        match self {
            Distribution::Line(_) => ShapeKind::Segment,
            Distribution::Plane(_) => ShapeKind::Square,
            Distribution::Cylinder(_) => ShapeKind::Cylinder,
            Distribution::Sphere(_) => ShapeKind::Sphere,
        }
    }

    fn canonical_transform(&self) -> &CanonicalTransform {
        self.transform()
    }
}

impl RenderableShellGeometry for GaussianSurface {
    fn shape_kind(&self) -> ShapeKind {
        match self {
            GaussianSurface::Sphere(_) => ShapeKind::Sphere,
            GaussianSurface::Cylinder(_) => ShapeKind::Cylinder,
        }
    }

    fn canonical_transform(&self) -> &CanonicalTransform {
        self.transform()
    }
}
