//! # cocone
//!
//! This is a library for reconstructing a `(d-1)`-dimensional manifold from
//! points sampled on it in `d`-dimensional space, using the Cocone and
//! BoundCocone algorithms of Amenta, Choi, Dey and Leekha.
//!
//! # Features
//!
//! - d-dimensional Delaunay triangulations, computed as the lower convex hull
//!   of the points lifted onto a paraboloid
//! - d-dimensional convex hulls (randomized incremental with conflict lists)
//! - Voronoi poles, cocones and per-point cell measures
//! - Cocone reconstruction of closed manifolds and BoundCocone reconstruction
//!   of manifolds with boundary
//! - Minimum spanning tree of the Delaunay graph
//! - f-vector, Euler characteristic and manifoldness checks of facet meshes
//! - Serialization/Deserialization of results and options with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! Reconstruct a closed curve in the plane:
//!
//! ```rust
//! use cocone::prelude::*;
//!
//! let points: Vec<[f64; 2]> = (0..100)
//!     .map(|i| {
//!         let a = std::f64::consts::TAU * f64::from(i) / 100.0;
//!         [a.cos(), 0.5 * a.sin()]
//!     })
//!     .collect();
//!
//! let constructor = ManifoldConstructor::new(&points, None).unwrap();
//! let curve = constructor.cocone(None).unwrap();
//!
//! assert_eq!(curve.facets.len(), 100);   // one edge per sample
//! assert_eq!(curve.normals.len(), 100);  // one unit normal per sample
//! ```
//!
//! The same constructor answers BoundCocone queries for surfaces with
//! boundary. `rho` bounds how wide an interior Voronoi cell may be relative
//! to its height and `alpha` is the largest angle, in radians, between the
//! pole lines of neighbouring interior points:
//!
//! ```rust
//! use cocone::prelude::*;
//!
//! let points: Vec<[f64; 2]> = (0..100)
//!     .map(|i| {
//!         let a = std::f64::consts::TAU * f64::from(i) / 100.0;
//!         [a.cos(), 0.5 * a.sin()]
//!     })
//!     .collect();
//!
//! let constructor = ManifoldConstructor::new(&points, None).unwrap();
//! let curve = constructor.bound_cocone(0.3, 0.14, None).unwrap();
//! assert!(!curve.facets.is_empty());
//! ```
//!
//! # Pipeline
//!
//! 1. [`compute_delaunay`](core::delaunay::compute_delaunay) normalizes the
//!    points to an integer grid, lifts them and keeps the lower facets of the
//!    convex hull. Hull predicates are exact on the grid
//!    ([`geometry::predicates`]).
//! 2. [`vertex_and_facet_data`](reconstruction::structure::vertex_and_facet_data)
//!    finds each point's positive pole, the cocone vertices of every facet and,
//!    for BoundCocone, the height and radius of each Voronoi cell.
//! 3. Candidate facets are selected: all-cocone facets for Cocone, facets on
//!    interior points for BoundCocone.
//! 4. [`prune_facets_incident_to_sharp_ridges`](reconstruction::prune::prune_facets_incident_to_sharp_ridges)
//!    repeatedly removes facets at ridges whose facets span less than 90°.
//! 5. [`extract_manifold`](reconstruction::extract::extract_manifold) walks
//!    the Delaunay objects from outside the hull and keeps the candidates it
//!    runs into, oriented towards the side it came from.
//!
//! # Determinism
//!
//! Results depend only on the input: the hull uses a fixed-seed insertion
//! order, sharp ridges are visited in sorted order and the extraction walk is
//! seeded in facet index order.
//!
//! # Concurrency
//!
//! [`ManifoldConstructor`](reconstruction::constructor::ManifoldConstructor)
//! is immutable after construction; `cocone`, `bound_cocone` and
//! `minimum_spanning_tree` may run concurrently from several threads. Progress
//! is reported through the [`ProgressRatio`](core::progress::ProgressRatio)
//! trait, which is `Send + Sync`.
//!
//! # Logging
//!
//! Stage summaries are emitted with [tracing](https://docs.rs/tracing) at
//! `info` level and per-stage details at `debug`. Install any subscriber to
//! see them.
//!
//! # References
//!
//! - N. Amenta, S. Choi, T. K. Dey and N. Leekha, "A simple algorithm for
//!   homeomorphic surface reconstruction", *SCG* 2000.
//! - T. K. Dey and J. Giesen, "Detecting undersampling in surface
//!   reconstruction", *SCG* 2001.
//! - T. K. Dey, "Curve and Surface Reconstruction: Algorithms with
//!   Mathematical Analysis", Cambridge University Press, 2006.
//! - K. L. Clarkson and P. W. Shor, "Applications of random sampling in
//!   computational geometry, II", *Discrete Comput. Geom.* 4, 1989.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the Delaunay objects the reconstruction works
/// on, the collection types of the hot loops, and progress reporting.
pub mod core {
    /// Graph algorithms over Delaunay simplices
    pub mod algorithms {
        /// Kruskal minimum spanning tree
        pub mod mst;
        pub use mst::*;
    }
    /// High-performance collection types optimized for computational geometry
    pub mod collections;
    /// Delaunay simplices, objects and facets from the lifted convex hull
    pub mod delaunay;
    pub mod progress;
    /// Ridges and ridge-to-facet maps
    pub mod ridge;
    // Note: collections module not re-exported here to avoid namespace pollution
    pub use delaunay::*;
    pub use progress::*;
    pub use ridge::*;
}

/// Contains the convex hull, stack-matrix determinants, and the vector and
/// simplex utilities the reconstruction is built from.
pub mod geometry {
    /// Geometric algorithms on point sets
    pub mod algorithms {
        /// Randomized incremental convex hull in d dimensions
        pub mod convex_hull;
        pub use convex_hull::*;
    }
    pub mod matrix;
    pub mod predicates;
    /// Geometric utility functions for d-dimensional geometry calculations
    pub mod util;
    pub use algorithms::*;
    pub use matrix::*;
    pub use predicates::*;
    pub use util::*;
}

/// Cocone and BoundCocone manifold reconstruction.
pub mod reconstruction {
    /// Cocone membership tests and Voronoi edge intersection
    pub mod cocone_geometry;
    pub mod constructor;
    pub mod error;
    pub mod extract;
    /// BoundCocone thresholds
    pub mod parameters;
    pub mod prune;
    /// Poles, heights, radii and cocone flags
    pub mod structure;
    pub use constructor::*;
    pub use error::*;
    pub use parameters::*;
}

/// Combinatorial checks of reconstructed facet meshes.
pub mod topology {
    /// Counting and validating simplicial complexes
    pub mod characteristics {
        /// f-vectors and Euler characteristic
        pub mod euler;
        /// Facet dimension, manifoldness and Euler checks
        pub mod validation;
        pub use euler::*;
        pub use validation::*;
    }
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        algorithms::mst::*,
        delaunay::{DelaunayFacet, DelaunayObject, DelaunaySimplex, compute_delaunay},
        progress::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::algorithms::convex_hull::*;

    // Re-export from reconstruction
    pub use crate::reconstruction::{constructor::*, error::*, parameters::*};

    // Re-export from topology
    pub use crate::topology::characteristics::{euler::*, validation::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
