//! Circumcenter of a D-simplex; the Voronoi vertex dual to a Delaunay simplex.

use thiserror::Error;

use super::norms::{is_finite_vector, squared_norm, subtract};
use crate::geometry::matrix::{Matrix, matrix_set, solve};

/// Errors from circumcenter computations.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CircumcenterError {
    /// The point set does not contain exactly `D + 1` points.
    #[error("Invalid simplex: expected {expected} points, got {actual}")]
    InvalidSimplex {
        /// Number of points supplied.
        actual: usize,
        /// Required number of points.
        expected: usize,
    },
    /// The simplex is degenerate, so its circumsphere is undefined.
    #[error("Degenerate simplex: {details}")]
    Degenerate {
        /// Failure reported by the linear solver.
        details: String,
    },
    /// The solution overflowed.
    #[error("Circumcenter is not finite")]
    NonFinite,
}

/// Circumcenter of the simplex given by `D + 1` points.
///
/// Solves `2 (p_i - p_0) · c' = |p_i - p_0|²` for the offset `c'` of the
/// center from `p_0`.
///
/// # Errors
///
/// Returns [`CircumcenterError::InvalidSimplex`] for the wrong point count,
/// [`CircumcenterError::Degenerate`] for a singular system, and
/// [`CircumcenterError::NonFinite`] if the center is not representable.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::circumcenter;
///
/// let c = circumcenter(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]).unwrap();
/// assert!((c[0] - 1.0).abs() < 1e-12 && (c[1] - 1.0).abs() < 1e-12);
/// ```
pub fn circumcenter<const D: usize>(points: &[[f64; D]]) -> Result<[f64; D], CircumcenterError> {
    if points.len() != D + 1 {
        return Err(CircumcenterError::InvalidSimplex {
            actual: points.len(),
            expected: D + 1,
        });
    }

    let origin = &points[0];
    let mut a = Matrix::<D>::zero();
    let mut b = [0.0f64; D];
    for (row, point) in points[1..].iter().enumerate() {
        let edge = subtract(point, origin);
        for (col, &value) in edge.iter().enumerate() {
            matrix_set(&mut a, row, col, 2.0 * value);
        }
        b[row] = squared_norm(&edge);
    }

    let offset = solve(&a, b).map_err(|e| CircumcenterError::Degenerate {
        details: e.to_string(),
    })?;
    let center: [f64; D] = std::array::from_fn(|i| origin[i] + offset[i]);

    if !is_finite_vector(&center) {
        return Err(CircumcenterError::NonFinite);
    }
    Ok(center)
}

/// Circumradius of the simplex given by `D + 1` points.
///
/// # Errors
///
/// See [`circumcenter`].
pub fn circumradius<const D: usize>(points: &[[f64; D]]) -> Result<f64, CircumcenterError> {
    let center = circumcenter(points)?;
    Ok(squared_norm(&subtract(&center, &points[0])).sqrt())
}
