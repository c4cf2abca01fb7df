//! Matrix operations.
//!
//! Small, stack-allocated linear algebra used by the orthogonal complement,
//! circumcenter and volume computations. Matrix sizes that are only known at
//! runtime (facets of a lifted hull, Gram matrices of k vectors) are bridged to
//! `la_stack`'s const-generic matrices through [`with_la_stack_matrix!`].

#![forbid(unsafe_code)]

use la_stack::{DEFAULT_PIVOT_TOL, DEFAULT_SINGULAR_TOL, LaError, Matrix as LaMatrix, Vector as LaVector};
use thiserror::Error;

/// Stack-matrix dispatch limit.
///
/// Hull facets in a lifted space of dimension `D + 1` need `D × D` minors, and
/// Gram matrices never exceed the ambient dimension, so this covers every
/// dimension up to [`MAX_PRACTICAL_DIMENSION_SIZE`](crate::core::collections::MAX_PRACTICAL_DIMENSION_SIZE).
pub const MAX_STACK_MATRIX_DIM: usize = 8;

/// Internal linear algebra matrix type used by this crate for fixed-size operations.
pub type Matrix<const D: usize> = LaMatrix<D>;

/// Error type for stack-matrix dispatch.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StackMatrixDispatchError {
    /// The requested matrix size is not supported by the stack-matrix dispatcher.
    #[error("unsupported stack matrix size: {k} (max {max})")]
    UnsupportedDim {
        /// Requested matrix dimension.
        k: usize,
        /// Maximum supported matrix dimension.
        max: usize,
    },
    /// A linear algebra error originating from `la-stack`.
    #[error(transparent)]
    La(#[from] LaError),
}

/// Dispatch a runtime `k` (matrix dimension) to a stack-allocated `la_stack::Matrix<k>`.
///
/// # Panics
///
/// Panics if `k` exceeds [`MAX_STACK_MATRIX_DIM`]. Use [`try_with_la_stack_matrix!`]
/// when `k` comes from caller input.
macro_rules! with_la_stack_matrix {
    ($k:expr, |$m:ident| $body:block) => {{
        match $k {
            0 => {
                let mut $m = $crate::geometry::matrix::Matrix::<0>::zero();
                $body
            }
            1 => {
                let mut $m = $crate::geometry::matrix::Matrix::<1>::zero();
                $body
            }
            2 => {
                let mut $m = $crate::geometry::matrix::Matrix::<2>::zero();
                $body
            }
            3 => {
                let mut $m = $crate::geometry::matrix::Matrix::<3>::zero();
                $body
            }
            4 => {
                let mut $m = $crate::geometry::matrix::Matrix::<4>::zero();
                $body
            }
            5 => {
                let mut $m = $crate::geometry::matrix::Matrix::<5>::zero();
                $body
            }
            6 => {
                let mut $m = $crate::geometry::matrix::Matrix::<6>::zero();
                $body
            }
            7 => {
                let mut $m = $crate::geometry::matrix::Matrix::<7>::zero();
                $body
            }
            8 => {
                let mut $m = $crate::geometry::matrix::Matrix::<8>::zero();
                $body
            }
            _ => panic!(
                "unsupported stack matrix size: {k} (max {max})",
                k = $k,
                max = $crate::geometry::matrix::MAX_STACK_MATRIX_DIM
            ),
        }
    }};
}

/// Fallible variant of [`with_la_stack_matrix!`] that returns an error instead of panicking.
///
/// The provided block must evaluate to `Result<_, E>`, where `E` can be constructed from
/// [`StackMatrixDispatchError`].
macro_rules! try_with_la_stack_matrix {
    ($k:expr, |$m:ident| $body:block) => {{
        let k = $k;
        if k > $crate::geometry::matrix::MAX_STACK_MATRIX_DIM {
            Err(
                $crate::geometry::matrix::StackMatrixDispatchError::UnsupportedDim {
                    k,
                    max: $crate::geometry::matrix::MAX_STACK_MATRIX_DIM,
                }
                .into(),
            )
        } else {
            $crate::geometry::matrix::with_la_stack_matrix!(k, |$m| $body)
        }
    }};
}

pub(crate) use try_with_la_stack_matrix;
pub(crate) use with_la_stack_matrix;

#[inline]
pub(crate) fn matrix_set<const D: usize>(m: &mut Matrix<D>, r: usize, c: usize, value: f64) {
    let ok = m.set(r, c, value);
    assert!(ok, "matrix index out of bounds: ({r}, {c}) for {D}x{D}");
}

/// Compute an LU-based determinant, returning 0.0 for singular matrices.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::matrix::{determinant, Matrix};
///
/// let mut m = Matrix::<2>::zero();
/// assert_eq!(determinant(&m), 0.0);
/// m.set(0, 0, 2.0);
/// m.set(1, 1, 3.0);
/// assert!((determinant(&m) - 6.0).abs() < 1e-12);
/// ```
#[inline]
#[must_use]
pub fn determinant<const D: usize>(m: &Matrix<D>) -> f64 {
    match m.det(0.0) {
        Ok(det) => det,
        Err(LaError::Singular { .. }) => 0.0,
        Err(LaError::NonFinite { .. }) => f64::NAN,
    }
}

/// Determinant of a symmetric positive semi-definite (Gram) matrix via LDLT.
///
/// Singular matrices yield `0.0` and non-finite input yields `NaN`.
#[inline]
#[must_use]
pub fn gram_determinant<const D: usize>(gram: &Matrix<D>) -> f64 {
    match gram.ldlt(DEFAULT_SINGULAR_TOL) {
        Ok(ldlt) => ldlt.det(),
        Err(LaError::Singular { .. }) => 0.0,
        Err(LaError::NonFinite { .. }) => f64::NAN,
    }
}

/// Solve `m · x = b` with partial-pivot LU.
///
/// The default pivot tolerance is tried first; badly scaled but invertible
/// systems fall back to exact singularity detection.
///
/// # Errors
///
/// Returns the underlying [`LaError`] when the system is singular or non-finite.
pub fn solve<const D: usize>(m: &Matrix<D>, b: [f64; D]) -> Result<[f64; D], LaError> {
    let lu = match m.lu(DEFAULT_PIVOT_TOL) {
        Ok(lu) => lu,
        Err(LaError::Singular { .. }) => m.lu(0.0)?,
        Err(e) => return Err(e),
    };
    Ok(lu.solve_vec(LaVector::<D>::new(b))?.into_array())
}
