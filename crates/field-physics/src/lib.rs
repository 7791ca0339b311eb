//! # Field Physics
//!
//! Closed-form electrostatic fields for idealised charge distributions (point
//! charges, charged lines, planes, cylindrical and spherical shells), the
//! canonical transforms that place each distribution in space, and the
//! aggregate that sums them.
//!
//! Units are Gaussian: a point charge produces `Q/r²`.

pub mod aggregate;
pub mod charge;
pub mod constants;
pub mod distribution;
pub mod expression;
pub mod gaussian;
pub mod seed;
pub mod source;
pub mod transform;
pub mod vector_function;

pub use aggregate::*;
pub use charge::*;
pub use constants::*;
pub use distribution::*;
pub use expression::*;
pub use gaussian::*;
pub use seed::*;
pub use source::*;
pub use transform::*;
pub use vector_function::*;
