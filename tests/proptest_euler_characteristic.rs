//! Property-based tests for f-vectors, Euler characteristic and mesh checks.
//!
//! The Euler characteristic of a complex does not depend on how its vertices
//! are labelled or in which order its facets are listed; these tests relabel
//! and shuffle known closed complexes and compare against the invariants.

use cocone::topology::characteristics::{euler, validation};
use proptest::prelude::*;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Boundary facets of the `D`-simplex on vertices `0..=D`.
fn simplex_boundary<const D: usize>() -> Vec<[usize; D]> {
    (0..=D)
        .map(|skip| {
            let mut facet = [0; D];
            for (slot, v) in facet.iter_mut().zip((0..=D).filter(|&v| v != skip)) {
                *slot = v;
            }
            facet
        })
        .collect()
}

/// Closed polygon with `n` edges.
fn polygon(n: usize) -> Vec<[usize; 2]> {
    (0..n).map(|i| [i, (i + 1) % n]).collect()
}

fn relabel<const D: usize>(facets: &[[usize; D]], labels: &[usize]) -> Vec<[usize; D]> {
    facets.iter().map(|f| f.map(|v| labels[v])).collect()
}

/// Strategy for a permutation of `0..n` shifted by `offset`.
fn vertex_labels(n: usize) -> impl Strategy<Value = Vec<usize>> {
    (Just((0..n).collect::<Vec<usize>>()).prop_shuffle(), 0usize..1000)
        .prop_map(|(perm, offset)| perm.into_iter().map(|v| v + offset).collect())
}

// =============================================================================
// DIMENSIONAL TEST GENERATION MACROS
// =============================================================================

macro_rules! test_simplex_boundary_properties {
    ($dim:literal, $chi:literal) => {
        pastey::paste! {
            proptest! {
                /// Property: relabelling and reordering keep the f-vector and χ
                #[test]
                fn [<prop_simplex_boundary_euler_ $dim d>](
                    labels in vertex_labels($dim + 1),
                    rotate in 0usize..=$dim,
                ) {
                    let mut facets = relabel(&simplex_boundary::<$dim>(), &labels);
                    facets.rotate_left(rotate);

                    let result = validation::validate_facet_euler(&facets);
                    prop_assert_eq!(result.chi, $chi);
                    prop_assert_eq!(result.counts.count(0), $dim + 1);
                    prop_assert_eq!(result.counts.count($dim - 1), $dim + 1);
                    prop_assert!(result.is_valid());
                    prop_assert!(validation::check_manifoldness(&facets, false).is_ok());
                }

                /// Property: removing a facet opens the complex into a ball
                #[test]
                fn [<prop_open_simplex_boundary_ $dim d>](
                    labels in vertex_labels($dim + 1),
                    removed in 0usize..=$dim,
                ) {
                    let mut facets = relabel(&simplex_boundary::<$dim>(), &labels);
                    facets.remove(removed);

                    prop_assert_eq!(
                        euler::classify_facets(&facets),
                        euler::TopologyClassification::Ball($dim - 1)
                    );
                    prop_assert!(validation::check_manifoldness(&facets, true).is_ok());
                    let is_open_ridge = matches!(
                        validation::check_manifoldness(&facets, false),
                        Err(validation::MeshCheckError::OpenRidge { .. })
                    );
                    prop_assert!(is_open_ridge);
                }
            }
        }
    };
}

test_simplex_boundary_properties!(3, 2);
test_simplex_boundary_properties!(4, 0);
test_simplex_boundary_properties!(5, 2);

proptest! {
    /// Property: a closed polygon has χ = 0 and as many edges as vertices
    #[test]
    fn prop_polygon_euler(n in 3usize..200) {
        let facets = polygon(n);
        let counts = euler::count_simplices(&facets);
        prop_assert_eq!(counts.by_dim.clone(), vec![n, n]);
        prop_assert_eq!(euler::euler_characteristic(&counts), 0);
        prop_assert!(validation::check_euler_characteristic(&facets, 0).is_ok());
    }

    /// Property: two disjoint spheres have twice the χ of one
    #[test]
    fn prop_disjoint_union_adds_chi(labels in vertex_labels(8)) {
        let first = relabel(&simplex_boundary::<3>(), &labels[..4]);
        let second = relabel(&simplex_boundary::<3>(), &labels[4..]);
        let union: Vec<[usize; 3]> = first.into_iter().chain(second).collect();
        prop_assert!(validation::check_euler_characteristic(&union, 4).is_ok());
    }

    /// Property: a facet listed twice makes its ridges non-manifold
    #[test]
    fn prop_duplicated_facet_is_not_manifold(labels in vertex_labels(4), which in 0usize..4) {
        let mut facets = relabel(&simplex_boundary::<3>(), &labels);
        facets.push(facets[which]);
        let is_non_manifold = matches!(
            validation::check_manifoldness(&facets, true),
            Err(validation::MeshCheckError::NonManifoldRidge { facets: 3, .. })
        );
        prop_assert!(is_non_manifold);
    }
}
