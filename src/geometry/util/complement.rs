//! Orthogonal complement of `n - 1` vectors in `n`-dimensional space.
//!
//! This is the generalized cross product: component `i` of the result is
//! `(-1)^i` times the determinant of the `(n-1) × (n-1)` minor obtained by
//! deleting column `i`. The result is orthogonal to every input vector, its
//! length is the `(n-1)`-volume of the parallelotope they span, and swapping
//! two input vectors flips its sign.

use thiserror::Error;

use super::norms::{hypot, is_finite_vector, subtract};
use crate::core::collections::CoordinateBuffer;
use crate::geometry::matrix::{
    StackMatrixDispatchError, determinant, matrix_set, try_with_la_stack_matrix,
};

/// Errors from orthogonal complement computations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ComplementError {
    /// The number or length of the input vectors does not describe `n - 1` vectors in `n` dimensions.
    #[error("Expected {expected} vectors of dimension {dimension}, got {actual} vectors")]
    WrongShape {
        /// Ambient dimension inferred from the vectors.
        dimension: usize,
        /// Required number of vectors.
        expected: usize,
        /// Number of vectors supplied.
        actual: usize,
    },
    /// The vectors are linearly dependent, so the complement vanishes.
    #[error("Orthogonal complement is zero (linearly dependent vectors)")]
    Degenerate,
    /// Some component of the complement is NaN or infinite.
    #[error("Orthogonal complement is not finite")]
    NonFinite,
    /// The minor size exceeds the stack-matrix dispatcher.
    #[error(transparent)]
    Dispatch(#[from] StackMatrixDispatchError),
}

/// Orthogonal complement of `n - 1` vectors of length `n`.
///
/// # Errors
///
/// Returns [`ComplementError::WrongShape`] if the vector count is not one less
/// than their common length, or a dispatch error for unsupported sizes.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::orthogonal_complement;
///
/// let n = orthogonal_complement(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
/// assert_eq!(n.as_slice(), &[0.0, 0.0, 1.0]);
///
/// let perp = orthogonal_complement(&[[2.0, 1.0]]).unwrap();
/// assert_eq!(perp.as_slice(), &[1.0, -2.0]);
/// ```
pub fn orthogonal_complement<V: AsRef<[f64]>>(
    vectors: &[V],
) -> Result<CoordinateBuffer, ComplementError> {
    let n = vectors.len() + 1;
    if vectors.iter().any(|v| v.as_ref().len() != n) {
        return Err(ComplementError::WrongShape {
            dimension: vectors.first().map_or(0, |v| v.as_ref().len()),
            expected: vectors.first().map_or(0, |v| v.as_ref().len().saturating_sub(1)),
            actual: vectors.len(),
        });
    }

    match n {
        2 => {
            let a = vectors[0].as_ref();
            Ok(CoordinateBuffer::from_slice(&[a[1], -a[0]]))
        }
        3 => {
            let a = vectors[0].as_ref();
            let b = vectors[1].as_ref();
            Ok(CoordinateBuffer::from_slice(&[
                a[1].mul_add(b[2], -(a[2] * b[1])),
                a[2].mul_add(b[0], -(a[0] * b[2])),
                a[0].mul_add(b[1], -(a[1] * b[0])),
            ]))
        }
        _ => {
            let mut result = CoordinateBuffer::with_capacity(n);
            for skip in 0..n {
                let minor: Result<f64, ComplementError> =
                    try_with_la_stack_matrix!(n - 1, |m| {
                        for (row, v) in vectors.iter().enumerate() {
                            let v = v.as_ref();
                            for (col, &value) in
                                v.iter().enumerate().filter(|&(c, _)| c != skip).map(|(_, x)| x).enumerate()
                            {
                                matrix_set(&mut m, row, col, value);
                            }
                        }
                        Ok(determinant(&m))
                    });
                let minor = minor?;
                result.push(if skip % 2 == 0 { minor } else { -minor });
            }
            Ok(result)
        }
    }
}

/// Unit-length orthogonal complement.
///
/// # Errors
///
/// Returns [`ComplementError::Degenerate`] for linearly dependent vectors and
/// [`ComplementError::NonFinite`] if the result cannot be represented.
pub fn unit_orthogonal_complement<V: AsRef<[f64]>>(
    vectors: &[V],
) -> Result<CoordinateBuffer, ComplementError> {
    let mut normal = orthogonal_complement(vectors)?;
    if !is_finite_vector(&normal) {
        return Err(ComplementError::NonFinite);
    }
    let len = hypot(&normal);
    if len == 0.0 {
        return Err(ComplementError::Degenerate);
    }
    for x in &mut normal {
        *x /= len;
    }
    if !is_finite_vector(&normal) {
        return Err(ComplementError::NonFinite);
    }
    Ok(normal)
}

/// Unit normal of the facet spanned by `D` points in `D` dimensions.
///
/// The orientation follows the vertex order: swapping two vertices flips it.
///
/// # Errors
///
/// Returns [`ComplementError::Degenerate`] when the points are affinely
/// dependent and [`ComplementError::NonFinite`] for non-finite input.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::facet_normal;
///
/// let n = facet_normal(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap();
/// assert_eq!(n, [0.0, 0.0, 1.0]);
/// ```
pub fn facet_normal<const D: usize>(points: &[[f64; D]; D]) -> Result<[f64; D], ComplementError> {
    let vectors: Vec<[f64; D]> = points[1..]
        .iter()
        .map(|p| subtract(p, &points[0]))
        .collect();
    let normal = unit_orthogonal_complement(&vectors)?;
    Ok(std::array::from_fn(|i| normal[i]))
}
