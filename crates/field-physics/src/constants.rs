//! Constants shared by field sources and seed placement
//!
//! Everything is expressed in Gaussian units so the closed-form solutions keep
//! their textbook shape (`Q/r²`, `2λ/r`, `2πσ`).

/// Coulomb constant. Gaussian units, so a point charge field is `Q/r²`
pub const K_ELECTRIC: f64 = 1.0;

/// Smallest non-zero number of field lines a charged source emits
pub const MIN_FIELD_LINES: usize = 2;

/// Upper bound on the field lines one source emits
pub const MAX_FIELD_LINES: usize = 10_000;

/// Field lines per unit charge when a source specifies neither density nor count
pub const DEFAULT_FIELD_LINE_DENSITY: f64 = 1.0;

/// Golden angle `π(3 − √5)`, used to spread seeds on spheres and helices
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Default distance between a source surface and its field line seeds
pub const DEFAULT_SEED_RADIUS: f64 = 0.05;
