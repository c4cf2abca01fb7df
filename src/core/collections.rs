//! Collection types tuned for the hull and reconstruction hot loops.
//!
//! Hash containers use the non-cryptographic Fx hasher and per-simplex
//! vertex/coordinate lists live on the stack through [`SmallBuffer`].

mod aliases;
mod helpers;

pub use aliases::*;
pub use helpers::*;
