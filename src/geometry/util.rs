//! Geometric utility functions for d-dimensional geometry calculations.
//!
//! Norms and elementwise helpers, the generalized cross product (orthogonal
//! complement), Gram-determinant volumes, circumcenters, and deterministic
//! test-point generation.

mod circumsphere;
mod complement;
mod measures;
mod norms;
mod point_generation;

pub use circumsphere::*;
pub use complement::*;
pub use measures::*;
pub use norms::*;
pub use point_generation::*;
