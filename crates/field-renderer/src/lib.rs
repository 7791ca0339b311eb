//! # Field Renderer
//!
//! GPU-facing side of the field visualisation: vertex formats, reusable
//! indexed buffers, the screen-space "volumetric line" packing used for field
//! lines and arrows, canonical display meshes and the orbit camera.
//!
//! No device is created here. Buffers expose their contents as bytes and each
//! vertex format describes its own `wgpu` layout; the host owns the pipeline.

pub mod buffer;
pub mod camera;
pub mod mesh;
pub mod vertex;
pub mod volumetric;

pub use buffer::*;
pub use camera::*;
pub use mesh::*;
pub use vertex::*;
pub use volumetric::*;
