//! BoundCocone thresholds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from [`BoundCoconeParameters::validate`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// `rho` is not in `(0, 1)`.
    #[error("BoundCocone rho {rho} is not in (0, 1)")]
    RhoOutOfRange {
        /// Rejected value.
        rho: f64,
    },
    /// `alpha` is not in `(0, 1)`.
    #[error("BoundCocone alpha {alpha} is not in (0, 1)")]
    AlphaOutOfRange {
        /// Rejected value.
        alpha: f64,
    },
}

/// Thresholds of the BoundCocone interior test.
///
/// A sample is interior when the width of its Voronoi cell inside the cocone
/// is at most `rho` times the cell's height, and its pole line is within the
/// angle `alpha` (radians) of its neighbours' pole lines.
///
/// # Examples
///
/// ```rust
/// use cocone::reconstruction::parameters::BoundCoconeParameters;
///
/// let parameters: BoundCoconeParameters = serde_json::from_str(r#"{"rho":0.25,"alpha":0.1}"#).unwrap();
/// assert!(parameters.validate().is_ok());
/// assert_eq!(BoundCoconeParameters::default().rho, 0.3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundCoconeParameters {
    /// Ratio of Voronoi cell width to height.
    pub rho: f64,
    /// Largest angle between neighbouring pole lines, in radians.
    pub alpha: f64,
}

impl Default for BoundCoconeParameters {
    fn default() -> Self {
        Self {
            rho: 0.3,
            alpha: 0.14,
        }
    }
}

impl BoundCoconeParameters {
    /// Creates parameters without validating them.
    #[must_use]
    pub const fn new(rho: f64, alpha: f64) -> Self {
        Self { rho, alpha }
    }

    /// Checks that both thresholds are strictly between 0 and 1.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range parameter.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.rho > 0.0 && self.rho < 1.0) {
            return Err(ParameterError::RhoOutOfRange { rho: self.rho });
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ParameterError::AlphaOutOfRange { alpha: self.alpha });
        }
        Ok(())
    }

    /// Cosine of `alpha`, the bound on `|cos|` between neighbouring poles.
    #[must_use]
    pub fn cos_alpha(&self) -> f64 {
        self.alpha.cos()
    }
}
