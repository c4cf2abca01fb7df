//! Topology validation functions for reconstructed meshes.
//!
//! This module provides high-level validation functions that combine
//! simplex counting, classification, and Euler characteristic checking, and
//! the structural checks a reconstructed facet list must pass: well-formed
//! facets and a manifold ridge structure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ridge::{Ridge, RidgeMap, add_to_ridges};
use crate::geometry::util::facet_normal;
use crate::topology::characteristics::euler::{
    FVector, TopologyClassification, classify_facets, count_simplices, euler_characteristic,
    expected_chi_for,
};

/// Errors from the mesh checks.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MeshCheckError {
    /// A facet does not have one vertex per dimension.
    #[error("Facet {facet} has {actual} vertices, expected {expected}")]
    WrongVertexCount {
        /// Index of the facet.
        facet: usize,
        /// Required vertex count.
        expected: usize,
        /// Vertex count found.
        actual: usize,
    },
    /// A facet lists the same vertex twice.
    #[error("Facet {facet} repeats vertex {vertex}")]
    RepeatedVertex {
        /// Index of the facet.
        facet: usize,
        /// The repeated point index.
        vertex: usize,
    },
    /// A facet refers to a point that does not exist.
    #[error("Facet {facet} vertex {vertex} is out of range for {points} points")]
    VertexOutOfRange {
        /// Index of the facet.
        facet: usize,
        /// The invalid point index.
        vertex: usize,
        /// Number of points.
        points: usize,
    },
    /// A facet's points do not span a `(D-1)`-simplex.
    #[error("Facet {facet} has no finite normal")]
    DegenerateFacet {
        /// Index of the facet.
        facet: usize,
    },
    /// A ridge is shared by more than two facets, or by more than one when no
    /// boundary is allowed.
    #[error("Ridge {ridge:?} has {facets} facets")]
    NonManifoldRidge {
        /// Sorted ridge vertices.
        ridge: Vec<usize>,
        /// Number of incident facets.
        facets: usize,
    },
    /// A ridge has a single facet in a mesh that must be closed.
    #[error("Ridge {ridge:?} has only one facet in a closed mesh")]
    OpenRidge {
        /// Sorted ridge vertices.
        ridge: Vec<usize>,
    },
    /// The Euler characteristic differs from the expected value.
    #[error("Euler characteristic {computed} is not equal to {expected} ({counts})")]
    EulerCharacteristicMismatch {
        /// Computed characteristic.
        computed: isize,
        /// Expected characteristic.
        expected: isize,
        /// Simplex counts the characteristic was computed from.
        counts: FVector,
    },
}

/// What [`check_mesh`] verifies beyond facet validity.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::validation::MeshCheckOptionsBuilder;
///
/// let options = MeshCheckOptionsBuilder::default()
///     .expected_euler_characteristic(2)
///     .build()
///     .unwrap();
/// assert!(!options.has_boundary);
/// assert_eq!(options.expected_euler_characteristic, Some(2));
/// ```
#[derive(Builder, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[builder(default)]
pub struct MeshCheckOptions {
    /// Ridges may have a single facet.
    pub has_boundary: bool,
    /// Required Euler characteristic, unchecked when `None`.
    #[builder(setter(strip_option))]
    pub expected_euler_characteristic: Option<isize>,
}

/// Result of Euler characteristic validation.
///
/// Contains the computed Euler characteristic, expected value based on
/// topological classification, and diagnostic information.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::validation;
///
/// let facets = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
/// let result = validation::validate_facet_euler(&facets);
/// assert_eq!(result.chi, 2);
/// assert!(result.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyCheckResult {
    /// Computed Euler characteristic.
    pub chi: isize,

    /// Expected χ based on classification (None if unknown).
    pub expected: Option<isize>,

    /// Topological classification.
    pub classification: TopologyClassification,

    /// Full simplex counts (f-vector).
    pub counts: FVector,

    /// Diagnostic notes or warnings.
    pub notes: Vec<String>,
}

impl TopologyCheckResult {
    /// Returns `true` if χ matches expectation.
    ///
    /// If expected is None (unknown classification), returns `true`
    /// since we cannot determine if it's valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.expected.is_none_or(|exp| self.chi == exp)
    }
}

/// Validate the Euler characteristic of a facet complex against the value
/// expected for a single sphere or disk.
#[must_use]
pub fn validate_facet_euler<const D: usize>(facets: &[[usize; D]]) -> TopologyCheckResult {
    let counts = count_simplices(facets);
    let chi = euler_characteristic(&counts);
    let classification = classify_facets(facets);
    let expected = expected_chi_for(&classification);

    let mut notes = Vec::new();
    if let Some(exp) = expected.filter(|&exp| chi != exp) {
        notes.push(format!(
            "Euler characteristic mismatch: computed {chi}, expected {exp}"
        ));
    }

    TopologyCheckResult {
        chi,
        expected,
        classification,
        counts,
        notes,
    }
}

/// Checks that every facet has `D` distinct in-range vertices spanning a
/// simplex with a finite unit normal.
///
/// # Errors
///
/// Returns the first violation in facet order.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::validation::{check_facet_dimension, MeshCheckError};
///
/// let points = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]];
/// assert!(check_facet_dimension(&points, &[[0usize, 1], [1, 2]]).is_ok());
/// assert_eq!(
///     check_facet_dimension(&points, &[[0usize, 0]]),
///     Err(MeshCheckError::RepeatedVertex { facet: 0, vertex: 0 })
/// );
/// ```
pub fn check_facet_dimension<const D: usize, S: AsRef<[usize]>>(
    points: &[[f64; D]],
    facets: &[S],
) -> Result<(), MeshCheckError> {
    for (index, facet) in facets.iter().enumerate() {
        let vertices = facet.as_ref();
        if vertices.len() != D {
            return Err(MeshCheckError::WrongVertexCount {
                facet: index,
                expected: D,
                actual: vertices.len(),
            });
        }
        if let Some(&vertex) = vertices.iter().find(|&&v| v >= points.len()) {
            return Err(MeshCheckError::VertexOutOfRange {
                facet: index,
                vertex,
                points: points.len(),
            });
        }
        for (i, &v) in vertices.iter().enumerate() {
            if vertices[..i].contains(&v) {
                return Err(MeshCheckError::RepeatedVertex {
                    facet: index,
                    vertex: v,
                });
            }
        }
        let corners: [[f64; D]; D] = std::array::from_fn(|i| points[vertices[i]]);
        if facet_normal(&corners).is_err() {
            return Err(MeshCheckError::DegenerateFacet { facet: index });
        }
    }
    Ok(())
}

/// Checks that every ridge has exactly two facets, or at most two when
/// `has_boundary` is set.
///
/// # Errors
///
/// Returns the violation at the smallest ridge.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::validation::check_manifoldness;
///
/// let triangle = [[0, 1], [1, 2], [2, 0]];
/// assert!(check_manifoldness(&triangle, false).is_ok());
/// assert!(check_manifoldness(&triangle[..2], false).is_err());
/// assert!(check_manifoldness(&triangle[..2], true).is_ok());
/// ```
pub fn check_manifoldness<const D: usize>(
    facets: &[[usize; D]],
    has_boundary: bool,
) -> Result<(), MeshCheckError> {
    let mut ridges = RidgeMap::default();
    for (i, facet) in facets.iter().enumerate() {
        add_to_ridges(facet, i, &mut ridges);
    }

    let violation: Option<(&Ridge, usize)> = ridges
        .iter()
        .map(|(ridge, incident)| (ridge, incident.len()))
        .filter(|&(_, count)| count > 2 || (count == 1 && !has_boundary))
        .min_by(|a, b| a.0.cmp(b.0));

    match violation {
        None => Ok(()),
        Some((ridge, 1)) => Err(MeshCheckError::OpenRidge {
            ridge: ridge.vertices().to_vec(),
        }),
        Some((ridge, facets)) => Err(MeshCheckError::NonManifoldRidge {
            ridge: ridge.vertices().to_vec(),
            facets,
        }),
    }
}

/// Checks the Euler characteristic of the facet complex.
///
/// # Errors
///
/// Returns [`MeshCheckError::EulerCharacteristicMismatch`] with the full
/// f-vector when the characteristic differs.
pub fn check_euler_characteristic<const D: usize>(
    facets: &[[usize; D]],
    expected: isize,
) -> Result<(), MeshCheckError> {
    let counts = count_simplices(facets);
    let computed = euler_characteristic(&counts);
    if computed != expected {
        return Err(MeshCheckError::EulerCharacteristicMismatch {
            computed,
            expected,
            counts,
        });
    }
    Ok(())
}

/// Runs the facet, manifoldness and (if requested) Euler characteristic checks.
///
/// # Errors
///
/// Returns the first failed check.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::validation::{check_mesh, MeshCheckOptionsBuilder};
///
/// let points = [[1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, 1.0]];
/// let facets = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
/// let options = MeshCheckOptionsBuilder::default()
///     .expected_euler_characteristic(2)
///     .build()
///     .unwrap();
/// assert!(check_mesh(&points, &facets, &options).is_ok());
/// ```
pub fn check_mesh<const D: usize>(
    points: &[[f64; D]],
    facets: &[[usize; D]],
    options: &MeshCheckOptions,
) -> Result<(), MeshCheckError> {
    check_facet_dimension(points, facets)?;
    check_manifoldness(facets, options.has_boundary)?;
    if let Some(expected) = options.expected_euler_characteristic {
        check_euler_characteristic(facets, expected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron() -> (Vec<[f64; 3]>, Vec<[usize; 3]>) {
        let points = vec![
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, -1.0],
        ];
        let facets = vec![
            [0, 1, 2],
            [0, 2, 3],
            [0, 3, 4],
            [0, 4, 1],
            [5, 2, 1],
            [5, 3, 2],
            [5, 4, 3],
            [5, 1, 4],
        ];
        (points, facets)
    }

    #[test]
    fn test_topology_check_result_is_valid() {
        let valid_result = TopologyCheckResult {
            chi: 2,
            expected: Some(2),
            classification: TopologyClassification::ClosedSphere(2),
            counts: FVector {
                by_dim: vec![4, 6, 4],
            },
            notes: vec![],
        };
        assert!(valid_result.is_valid());

        let unknown_result = TopologyCheckResult {
            chi: 42,
            expected: None,
            classification: TopologyClassification::Unknown,
            counts: FVector { by_dim: vec![1] },
            notes: vec![],
        };
        assert!(unknown_result.is_valid()); // Unknown classification is considered valid
    }

    #[test]
    fn test_validate_facet_euler_reports_two_spheres() {
        let (_, mut facets) = octahedron();
        let copy: Vec<[usize; 3]> = facets.iter().map(|f| f.map(|v| v + 6)).collect();
        facets.extend(copy);

        let result = validate_facet_euler(&facets);
        assert_eq!(result.chi, 4);
        assert_eq!(result.expected, Some(2));
        assert!(!result.is_valid());
        assert_eq!(result.notes.len(), 1);
    }

    // =============================================================================
    // MESH CHECK TESTS
    // =============================================================================

    #[test]
    fn test_octahedron_passes_all_checks() {
        let (points, facets) = octahedron();
        let options = MeshCheckOptionsBuilder::default()
            .expected_euler_characteristic(2)
            .build()
            .unwrap();
        assert_eq!(check_mesh(&points, &facets, &options), Ok(()));
    }

    #[test]
    fn test_removed_facet_opens_the_mesh() {
        let (points, mut facets) = octahedron();
        facets.pop();

        let closed = MeshCheckOptions::default();
        assert!(matches!(
            check_mesh(&points, &facets, &closed),
            Err(MeshCheckError::OpenRidge { .. })
        ));

        let open = MeshCheckOptionsBuilder::default()
            .has_boundary(true)
            .expected_euler_characteristic(1)
            .build()
            .unwrap();
        assert_eq!(check_mesh(&points, &facets, &open), Ok(()));
    }

    #[test]
    fn test_fin_is_not_manifold() {
        let (mut points, mut facets) = octahedron();
        points.push([0.5, 0.5, 0.5]);
        facets.push([0, 1, 6]);
        let err = check_manifoldness(&facets, true).unwrap_err();
        assert_eq!(
            err,
            MeshCheckError::NonManifoldRidge {
                ridge: vec![0, 1],
                facets: 3
            }
        );
        assert!(check_facet_dimension(&points, &facets).is_ok());
    }

    #[test]
    fn test_euler_mismatch_carries_counts() {
        let (_, facets) = octahedron();
        let err = check_euler_characteristic(&facets, 0).unwrap_err();
        let MeshCheckError::EulerCharacteristicMismatch { computed, counts, .. } = &err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(*computed, 2);
        assert_eq!(counts.by_dim, vec![6, 12, 8]);
        assert_eq!(
            err.to_string(),
            "Euler characteristic 2 is not equal to 0 (f0 = 6, f1 = 12, f2 = 8)"
        );
    }

    #[test]
    fn test_facet_dimension_violations() {
        let (mut points, _) = octahedron();
        points.push([0.0, 0.0, 0.0]);
        assert_eq!(
            check_facet_dimension(&points, &[vec![0usize, 1]]),
            Err(MeshCheckError::WrongVertexCount {
                facet: 0,
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            check_facet_dimension(&points, &[[0usize, 1, 9]]),
            Err(MeshCheckError::VertexOutOfRange {
                facet: 0,
                vertex: 9,
                points: 7
            })
        );
        // Collinear points.
        assert_eq!(
            check_facet_dimension(&points, &[[0usize, 1, 2], [1, 3, 6]]),
            Err(MeshCheckError::DegenerateFacet { facet: 1 })
        );
    }

    #[test]
    fn test_options_serde() {
        let options = MeshCheckOptions {
            has_boundary: true,
            expected_euler_characteristic: Some(1),
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"has_boundary":true,"expected_euler_characteristic":1}"#);
        let back: MeshCheckOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
