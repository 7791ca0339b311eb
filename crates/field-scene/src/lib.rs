//! # Field Scene
//!
//! Declarative scene files: case-insensitive JSON describing charges,
//! distributions, Gaussian surfaces and start points, validated into a typed
//! [`Scene`], plus a per-session [`SceneRegistry`].

pub mod config;
pub mod element;
pub mod error;
pub mod registry;
pub mod scene;

pub use config::*;
pub use element::*;
pub use error::*;
pub use registry::*;
pub use scene::*;
