//! Euler characteristic computation for facet complexes.
//!
//! This module implements dimensional-generic Euler characteristic calculation
//! using the formula: χ = Σ(-1)^k · `f_k` where `f_k` is the number of `k`-simplices.
//!
//! A reconstructed manifold in `D` dimensions is a list of `(D-1)`-simplices
//! (facets), each given by `D` point indices. Its faces of every lower
//! dimension are enumerated from the facets.
//!
//! # Examples
//!
//! ```rust
//! use cocone::topology::characteristics::euler;
//!
//! // Boundary of a tetrahedron: a triangulated 2-sphere.
//! let facets = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
//!
//! let counts = euler::count_simplices(&facets);
//! let chi = euler::euler_characteristic(&counts);
//! assert_eq!(chi, 2);  // χ(S²) = 2
//! ```

use crate::core::collections::{FastHashSet, MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer};
use crate::core::ridge::{RidgeMap, add_to_ridges};

type SimplexKey = SmallBuffer<usize, MAX_PRACTICAL_DIMENSION_SIZE>;

/// Counts of k-simplices for all dimensions 0 ≤ k ≤ `d`.
///
/// Stores the f-vector (f₀, f₁, ..., `f_d`) where `f_k` is the number of
/// `k`-dimensional simplices:
/// - `f₀` = vertices (`0`-simplices)
/// - `f₁` = edges (`1`-simplices)
/// - `f₂` = triangular faces (`2`-simplices)
///
/// In the topology literature this is commonly called the **f-vector**.
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler::FVector;
///
/// // Closed polygon with 5 edges
/// let counts = FVector {
///     by_dim: vec![5, 5],
/// };
///
/// assert_eq!(counts.count(0), 5);  // vertices
/// assert_eq!(counts.count(1), 5);  // edges
/// assert_eq!(counts.count(2), 0);  // out of range
/// assert_eq!(counts.dimension(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FVector {
    /// `by_dim[k]` = `f_k` = number of `k`-simplices
    pub by_dim: Vec<usize>,
}

impl FVector {
    /// Get the number of `k`-simplices.
    ///
    /// Returns 0 if `k` is out of range.
    #[must_use]
    #[inline]
    pub fn count(&self, k: usize) -> usize {
        self.by_dim.get(k).copied().unwrap_or(0)
    }

    /// Get the dimension (index of the last entry).
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.by_dim.len().saturating_sub(1)
    }
}

impl std::fmt::Display for FVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (k, count) in self.by_dim.iter().enumerate() {
            if k > 0 {
                f.write_str(", ")?;
            }
            write!(f, "f{k} = {count}")?;
        }
        Ok(())
    }
}

/// Topological classification of a facet complex.
///
/// # Variants
///
/// - `Empty`: No facets (χ = 0)
/// - `SingleSimplex(d)`: One d-simplex (χ = 1)
/// - `Ball(d)`: d-manifold with boundary (χ = 1 for a disk)
/// - `ClosedSphere(d)`: Closed d-manifold without boundary (χ = 1 + (-1)^d for a sphere)
/// - `Unknown`: Cannot determine topology
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler::TopologyClassification;
///
/// let sphere = TopologyClassification::ClosedSphere(2);
/// assert_eq!(format!("{:?}", sphere), "ClosedSphere(2)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyClassification {
    /// No facets.
    Empty,

    /// A single d-simplex.
    SingleSimplex(usize),

    /// Has ridges with a single incident facet.
    ///
    /// The value represents the dimension d of the facets.
    Ball(usize),

    /// Every ridge is shared.
    ///
    /// The value represents the dimension d of the facets.
    ClosedSphere(usize),

    /// Cannot determine or doesn't fit known categories.
    Unknown,
}

/// Count all k-simplices of a facet complex.
///
/// Computes the complete f-vector (f₀, ..., `f_{D-1}`) of the complex whose
/// top simplices are `facets`.
///
/// # Algorithm
///
/// - `f_{D-1}`: distinct facets
/// - lower `k`: combinations of each facet's sorted vertices, deduplicated
///   per dimension - O(F · 2^D)
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler;
///
/// let counts = euler::count_simplices(&[[0, 1], [1, 2], [2, 0]]);
/// assert_eq!(counts.by_dim, vec![3, 3]);
/// ```
#[must_use]
pub fn count_simplices<const D: usize>(facets: &[[usize; D]]) -> FVector {
    if facets.is_empty() || D == 0 {
        return FVector {
            by_dim: vec![0; D],
        };
    }

    // One set per k, filled in a single pass over the facets.
    let mut simplex_sets: Vec<FastHashSet<SimplexKey>> =
        (0..D).map(|_| FastHashSet::default()).collect();

    let mut sorted_vertices: SimplexKey = SmallBuffer::new();
    for facet in facets {
        sorted_vertices.clear();
        sorted_vertices.extend(facet.iter().copied());
        sorted_vertices.sort_unstable();

        for (simplex_dimension, simplex_set) in simplex_sets.iter_mut().enumerate() {
            insert_simplices_of_size(&sorted_vertices, simplex_dimension + 1, simplex_set);
        }
    }

    FVector {
        by_dim: simplex_sets.iter().map(|set| set.len()).collect(),
    }
}

fn insert_simplices_of_size(
    vertices: &[usize],
    simplex_size: usize,
    simplex_set: &mut FastHashSet<SimplexKey>,
) {
    let n = vertices.len();
    if n < simplex_size || simplex_size == 0 {
        return;
    }

    // With sorted input, combinations of increasing indices are already
    // canonical.
    debug_assert!(vertices.windows(2).all(|w| w[0] <= w[1]));

    // Lexicographic combinations of `indices[0..simplex_size]`:
    // 1) Find the rightmost index that can still be incremented (the pivot).
    // 2) Increment it.
    // 3) Reset all subsequent indices to consecutive values.
    let mut indices: SmallBuffer<usize, MAX_PRACTICAL_DIMENSION_SIZE> = (0..simplex_size).collect();

    'outer: loop {
        simplex_set.insert(indices.iter().map(|&i| vertices[i]).collect());

        // The maximum valid value at position `i` is `i + n - simplex_size`.
        let mut pivot = simplex_size;
        while pivot > 0 {
            pivot -= 1;
            if indices[pivot] != pivot + n - simplex_size {
                break;
            }
            if pivot == 0 {
                break 'outer;
            }
        }

        indices[pivot] += 1;
        for position in (pivot + 1)..simplex_size {
            indices[position] = indices[position - 1] + 1;
        }
    }
}

/// Compute the Euler characteristic from simplex counts.
///
/// Uses the alternating sum formula: χ = Σ(-1)^k · `f_k`
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler::{FVector, euler_characteristic};
///
/// // Octahedron surface: V=6, E=12, F=8 → χ = 6-12+8 = 2
/// let counts = FVector {
///     by_dim: vec![6, 12, 8],
/// };
/// assert_eq!(euler_characteristic(&counts), 2);
/// ```
#[must_use]
#[allow(clippy::cast_possible_wrap)] // Simplex counts won't exceed isize::MAX in practice
pub fn euler_characteristic(counts: &FVector) -> isize {
    counts
        .by_dim
        .iter()
        .enumerate()
        .map(|(k, &f_k)| {
            let sign = if k % 2 == 0 { 1 } else { -1 };
            sign * (f_k as isize)
        })
        .sum()
}

/// Classify a facet complex topologically.
///
/// # Classification Logic
///
/// - No facets → `Empty`
/// - One facet → `SingleSimplex(D-1)`
/// - A ridge with one incident facet → `Ball(D-1)`
/// - Otherwise → `ClosedSphere(D-1)`
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler::{classify_facets, TopologyClassification};
///
/// let strip = [[0, 1, 2], [1, 2, 3]];
/// assert_eq!(classify_facets(&strip), TopologyClassification::Ball(2));
/// ```
#[must_use]
pub fn classify_facets<const D: usize>(facets: &[[usize; D]]) -> TopologyClassification {
    match facets.len() {
        0 => TopologyClassification::Empty,
        _ if D == 0 => TopologyClassification::Unknown,
        1 => TopologyClassification::SingleSimplex(D - 1),
        _ => {
            let mut ridges = RidgeMap::default();
            for (i, facet) in facets.iter().enumerate() {
                add_to_ridges(facet, i, &mut ridges);
            }
            if ridges.values().any(|f| f.len() == 1) {
                TopologyClassification::Ball(D - 1)
            } else {
                TopologyClassification::ClosedSphere(D - 1)
            }
        }
    }
}

/// Get expected χ for a topological classification.
///
/// # Expected Values
///
/// - `Empty`: χ = 0
/// - `SingleSimplex(_)`: χ = 1
/// - `Ball(_)`: χ = 1
/// - `ClosedSphere(d)`: χ = 1 + (-1)^d
/// - `Unknown`: None
///
/// # Examples
///
/// ```rust
/// use cocone::topology::characteristics::euler::{TopologyClassification, expected_chi_for};
///
/// assert_eq!(expected_chi_for(&TopologyClassification::Empty), Some(0));
/// assert_eq!(expected_chi_for(&TopologyClassification::ClosedSphere(1)), Some(0));
/// assert_eq!(expected_chi_for(&TopologyClassification::ClosedSphere(2)), Some(2));
/// assert_eq!(expected_chi_for(&TopologyClassification::Unknown), None);
/// ```
#[must_use]
pub fn expected_chi_for(classification: &TopologyClassification) -> Option<isize> {
    match classification {
        TopologyClassification::Empty => Some(0),
        TopologyClassification::SingleSimplex(_) | TopologyClassification::Ball(_) => Some(1),
        TopologyClassification::ClosedSphere(d) => {
            // χ(S^d) = 1 + (-1)^d
            Some(1 + if d % 2 == 0 { 1 } else { -1 })
        }
        TopologyClassification::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplex_counts() {
        let counts = FVector {
            by_dim: vec![4, 6, 4],
        };

        assert_eq!(counts.count(0), 4);
        assert_eq!(counts.count(2), 4);
        assert_eq!(counts.count(3), 0); // out of range
        assert_eq!(counts.dimension(), 2);
        assert_eq!(counts.to_string(), "f0 = 4, f1 = 6, f2 = 4");
    }

    #[test]
    fn test_insert_simplices_of_size() {
        // n < simplex_size => no combinations.
        let mut simplex_set = FastHashSet::default();
        insert_simplices_of_size(&[0, 1], 3, &mut simplex_set);
        assert!(simplex_set.is_empty());

        // simplex_size == n => exactly one combination.
        let mut simplex_set = FastHashSet::default();
        insert_simplices_of_size(&[0, 1, 2], 3, &mut simplex_set);
        assert_eq!(simplex_set.len(), 1);
        assert!(simplex_set.contains(&SimplexKey::from_slice(&[0, 1, 2])));

        // simplex_size == 1 => n singleton combinations.
        let mut simplex_set = FastHashSet::default();
        insert_simplices_of_size(&[0, 1, 3], 1, &mut simplex_set);
        assert_eq!(simplex_set.len(), 3);
        assert!(simplex_set.contains(&SimplexKey::from_slice(&[3])));

        // C(4, 2) = 6 combinations.
        let mut simplex_set = FastHashSet::default();
        insert_simplices_of_size(&[2, 5, 7, 9], 2, &mut simplex_set);
        assert_eq!(simplex_set.len(), 6);
        for pair in [[2, 5], [2, 7], [2, 9], [5, 7], [5, 9], [7, 9]] {
            assert!(simplex_set.contains(&SimplexKey::from_slice(&pair)));
        }
    }

    // =============================================================================
    // FACET COMPLEX TESTS
    // =============================================================================

    #[test]
    fn test_count_simplices_of_octahedron() {
        // Octahedron with apexes 0 and 5 around the square 1-2-3-4.
        let facets = [
            [0, 1, 2],
            [0, 2, 3],
            [0, 3, 4],
            [0, 4, 1],
            [5, 2, 1],
            [5, 3, 2],
            [5, 4, 3],
            [5, 1, 4],
        ];
        let counts = count_simplices(&facets);
        assert_eq!(counts.by_dim, vec![6, 12, 8]);
        assert_eq!(euler_characteristic(&counts), 2);
        assert_eq!(
            classify_facets(&facets),
            TopologyClassification::ClosedSphere(2)
        );
    }

    #[test]
    fn test_count_simplices_ignores_orientation_and_duplicates() {
        let counts = count_simplices(&[[0, 1, 2], [2, 1, 0]]);
        assert_eq!(counts.by_dim, vec![3, 3, 1]);
    }

    #[test]
    fn test_count_simplices_of_3_sphere() {
        // Boundary of the 4-simplex.
        let facets: Vec<[usize; 4]> = (0..5)
            .map(|skip| {
                let v: Vec<usize> = (0..5).filter(|&i| i != skip).collect();
                [v[0], v[1], v[2], v[3]]
            })
            .collect();
        let counts = count_simplices(&facets);
        assert_eq!(counts.by_dim, vec![5, 10, 10, 5]);
        assert_eq!(euler_characteristic(&counts), 0);
    }

    #[test]
    fn test_classification() {
        let empty: [[usize; 2]; 0] = [];
        assert_eq!(classify_facets(&empty), TopologyClassification::Empty);
        assert_eq!(count_simplices(&empty).by_dim, vec![0, 0]);
        assert_eq!(
            classify_facets(&[[0, 1]]),
            TopologyClassification::SingleSimplex(1)
        );
        assert_eq!(
            classify_facets(&[[0, 1], [1, 2]]),
            TopologyClassification::Ball(1)
        );
        assert_eq!(
            classify_facets(&[[0, 1], [1, 2], [2, 0]]),
            TopologyClassification::ClosedSphere(1)
        );
    }

    #[test]
    fn test_expected_chi_for() {
        assert_eq!(
            expected_chi_for(&TopologyClassification::SingleSimplex(2)),
            Some(1)
        );
        assert_eq!(expected_chi_for(&TopologyClassification::Ball(2)), Some(1));
        assert_eq!(
            expected_chi_for(&TopologyClassification::ClosedSphere(3)),
            Some(0)
        );
    }
}
