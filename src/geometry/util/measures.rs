//! Simplex and parallelotope volumes in arbitrary dimension.
//!
//! All measures go through the Gram determinant of the edge vectors, so a
//! `k`-simplex embedded in `n ≥ k` dimensions (for example a reconstructed
//! facet in 3D) is handled the same way as a full-dimensional one.

use thiserror::Error;

use crate::core::collections::{CoordinateBuffer, MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer};
use crate::geometry::matrix::{
    StackMatrixDispatchError, gram_determinant, matrix_set, try_with_la_stack_matrix,
};

use super::norms::dot;

/// Errors from volume computations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MeasureError {
    /// Vectors of different lengths, or more vectors than the ambient dimension.
    #[error("Invalid shape: {count} vectors of dimension {dimension}")]
    InvalidShape {
        /// Number of edge vectors.
        count: usize,
        /// Ambient dimension.
        dimension: usize,
    },
    /// The Gram determinant is NaN.
    #[error("Gram determinant is not finite")]
    NonFinite,
    /// The Gram matrix size exceeds the stack-matrix dispatcher.
    #[error(transparent)]
    Dispatch(#[from] StackMatrixDispatchError),
}

/// `k`-volume of the parallelotope spanned by `k` vectors, `sqrt(det(VᵀV))`.
///
/// # Errors
///
/// Returns [`MeasureError::InvalidShape`] for mismatched lengths or `k` larger
/// than the ambient dimension, and [`MeasureError::NonFinite`] for NaN input.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::parallelotope_volume;
///
/// let area = parallelotope_volume(&[[2.0, 0.0, 0.0], [0.0, 3.0, 0.0]]).unwrap();
/// assert!((area - 6.0).abs() < 1e-12);
/// ```
pub fn parallelotope_volume<V: AsRef<[f64]>>(vectors: &[V]) -> Result<f64, MeasureError> {
    let k = vectors.len();
    let dimension = vectors.first().map_or(0, |v| v.as_ref().len());
    if k > dimension || vectors.iter().any(|v| v.as_ref().len() != dimension) {
        return Err(MeasureError::InvalidShape {
            count: k,
            dimension,
        });
    }
    if k == 0 {
        return Ok(1.0);
    }

    let det: Result<f64, MeasureError> = try_with_la_stack_matrix!(k, |gram| {
        for i in 0..k {
            for j in i..k {
                let value = dot(vectors[i].as_ref(), vectors[j].as_ref());
                matrix_set(&mut gram, i, j, value);
                matrix_set(&mut gram, j, i, value);
            }
        }
        Ok(gram_determinant(&gram))
    });
    let det = det?;

    if det.is_nan() {
        return Err(MeasureError::NonFinite);
    }
    // Round-off can push the determinant of a degenerate Gram matrix slightly below zero.
    Ok(det.max(0.0).sqrt())
}

/// `k`-volume of the simplex with `k + 1` vertices, `parallelotope / k!`.
///
/// # Errors
///
/// Same as [`parallelotope_volume`], plus [`MeasureError::InvalidShape`] for an empty point list.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::simplex_volume;
///
/// // Unit right triangle embedded in 3D
/// let area = simplex_volume(&[[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [0.0, 1.0, 5.0]]).unwrap();
/// assert!((area - 0.5).abs() < 1e-12);
///
/// // Unit tetrahedron corner
/// let volume = simplex_volume(&[
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 1.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ])
/// .unwrap();
/// assert!((volume - 1.0 / 6.0).abs() < 1e-12);
/// ```
pub fn simplex_volume<V: AsRef<[f64]>>(points: &[V]) -> Result<f64, MeasureError> {
    let Some((first, rest)) = points.split_first() else {
        return Err(MeasureError::InvalidShape {
            count: 0,
            dimension: 0,
        });
    };
    let origin = first.as_ref();
    let edges: SmallBuffer<CoordinateBuffer, MAX_PRACTICAL_DIMENSION_SIZE> = rest
        .iter()
        .map(|p| {
            p.as_ref()
                .iter()
                .zip(origin)
                .map(|(a, b)| a - b)
                .collect::<CoordinateBuffer>()
        })
        .collect();
    let volume = parallelotope_volume(&edges)?;
    let factorial: f64 = (2..=edges.len()).map(|i| i as f64).product();
    Ok(volume / factorial)
}

/// `(D-1)`-measure of a facet given by `D` points in `D` dimensions.
///
/// # Errors
///
/// See [`simplex_volume`].
pub fn facet_measure<const D: usize>(points: &[[f64; D]; D]) -> Result<f64, MeasureError> {
    simplex_volume(points)
}
