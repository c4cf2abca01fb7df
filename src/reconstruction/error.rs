//! Errors reported by manifold reconstruction.

use thiserror::Error;

use crate::core::algorithms::mst::MstError;
use crate::core::delaunay::DelaunayError;
use crate::geometry::algorithms::convex_hull::ConvexHullError;
use crate::reconstruction::parameters::ParameterError;
use crate::topology::characteristics::validation::MeshCheckError;

/// Failure of a reconstruction operation.
///
/// Every failure aborts the whole operation; no partial result is returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReconstructionError {
    /// The point set cannot be triangulated.
    #[error("Degenerate input: {message}")]
    DegenerateInput {
        /// Description of the input violation.
        message: String,
    },
    /// The candidate facets do not contain a manifold.
    #[error("{message}")]
    NonManifoldInput {
        /// Stage at which no facets were left.
        message: String,
    },
    /// A pole, radius or facet normal could not be computed.
    #[error("Numerical failure: {message}")]
    NumericalFailure {
        /// Description of the failed computation.
        message: String,
    },
    /// The Delaunay graph has more than one component.
    #[error(transparent)]
    DisconnectedGraph(#[from] MstError),
    /// A requested mesh check failed.
    #[error(transparent)]
    TopologyMismatch(#[from] MeshCheckError),
    /// BoundCocone thresholds are out of range.
    #[error(transparent)]
    InvalidParameters(#[from] ParameterError),
    /// BoundCocone was requested from a constructor built for Cocone only.
    #[error("Manifold constructor created for Cocone and not for BoundCocone")]
    ConstructorMode,
}

impl From<ConvexHullError> for ReconstructionError {
    fn from(source: ConvexHullError) -> Self {
        Self::DegenerateInput {
            message: source.to_string(),
        }
    }
}

impl From<DelaunayError> for ReconstructionError {
    fn from(source: DelaunayError) -> Self {
        Self::NumericalFailure {
            message: source.to_string(),
        }
    }
}

impl ReconstructionError {
    pub(crate) fn non_manifold<const D: usize>(stage: &str) -> Self {
        Self::NonManifoldInput {
            message: format!(
                "Cocone facets not found{stage}. {}-manifold is not reconstructable.",
                D - 1
            ),
        }
    }

    pub(crate) fn numerical(message: impl Into<String>) -> Self {
        Self::NumericalFailure {
            message: message.into(),
        }
    }
}
