//! # Field Tracing
//!
//! Fixed-step integration along a [`field_physics::VectorField`]: continuous
//! field lines with periodic direction arrows, and discrete vector glyphs
//! spaced by field strength. Both write into reusable buffers so retracing a
//! configuration of the same size allocates nothing.

pub mod field_line;
pub mod params;
pub mod vector_field;

pub use field_line::*;
pub use params::*;
pub use vector_field::*;
