//! Cocone and BoundCocone manifold reconstruction.
//!
//! [`ManifoldConstructor`] computes the Delaunay objects of a point cloud and
//! the per-point Voronoi data once. Each query then selects candidate facets,
//! prunes facets at sharp ridges, extracts the facets reachable from outside
//! and orients them. Queries take `&self` and can run concurrently.
//!
//! # Examples
//!
//! ```rust
//! use cocone::reconstruction::constructor::ManifoldConstructor;
//!
//! // A closed curve: 64 points on an ellipse.
//! let points: Vec<[f32; 2]> = (0..64)
//!     .map(|i| {
//!         let a = std::f32::consts::TAU * i as f32 / 64.0;
//!         [2.0 * a.cos(), a.sin()]
//!     })
//!     .collect();
//!
//! let constructor = ManifoldConstructor::new(&points, None).unwrap();
//! let manifold = constructor.cocone(None).unwrap();
//! assert_eq!(manifold.facets.len(), 64);
//! ```

use num_traits::Float;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::algorithms::mst::minimum_spanning_tree;
use crate::core::delaunay::{
    DelaunayFacet, DelaunayObject, compute_delaunay, create_delaunay_facets,
    create_delaunay_objects,
};
use crate::core::progress::{ProgressRatio, report, report_text};
use crate::geometry::algorithms::convex_hull::normalize_points;
use crate::geometry::util::dot;
use crate::reconstruction::error::ReconstructionError;
use crate::reconstruction::extract::{
    ObjectFacets, create_normals_and_facets, extract_manifold, object_facets,
};
use crate::reconstruction::parameters::BoundCoconeParameters;
use crate::reconstruction::prune::prune_facets_incident_to_sharp_ridges;
use crate::reconstruction::structure::{ManifoldFacet, ManifoldVertex, vertex_and_facet_data};
use crate::topology::characteristics::validation::{
    MeshCheckOptions, check_facet_dimension, check_mesh,
};

/// A reconstructed `(D-1)`-manifold.
///
/// `facets` index into the constructor's points; `normals` has one entry per
/// point, zero for points that no facet uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[f64; D]: Serialize, [usize; D]: Serialize",
    deserialize = "[f64; D]: Deserialize<'de>, [usize; D]: Deserialize<'de>"
))]
pub struct ReconstructedManifold<const D: usize> {
    /// Unit normal per point.
    pub normals: Vec<[f64; D]>,
    /// Oriented facets.
    pub facets: Vec<[usize; D]>,
}

/// Delaunay and Voronoi data of one point cloud.
#[derive(Clone, Debug)]
pub struct ManifoldConstructor<const D: usize> {
    cocone_only: bool,
    points: Vec<[f64; D]>,
    objects: Vec<DelaunayObject<D>>,
    facets: Vec<DelaunayFacet<D>>,
    object_facets: Vec<ObjectFacets>,
    vertex_data: Vec<ManifoldVertex<D>>,
    facet_data: Vec<ManifoldFacet<D>>,
}

fn ratio_condition<const D: usize>(vertex: &ManifoldVertex<D>, rho: f64) -> bool {
    vertex.radius <= rho * vertex.height
}

fn normal_condition<const D: usize>(
    a: &ManifoldVertex<D>,
    b: &ManifoldVertex<D>,
    cos_alpha: f64,
) -> bool {
    dot(&a.positive_norm, &b.positive_norm).abs() >= cos_alpha
}

/// Points whose Voronoi cells are long and thin along agreeing pole lines.
fn find_interior_vertices<const D: usize>(
    rho: f64,
    cos_alpha: f64,
    vertex_data: &[ManifoldVertex<D>],
) -> Vec<bool> {
    let mut interior: Vec<bool> = vertex_data
        .iter()
        .map(|vertex| {
            ratio_condition(vertex, rho)
                && vertex
                    .cocone_neighbors
                    .iter()
                    .all(|&n| normal_condition(vertex, &vertex_data[n], cos_alpha))
        })
        .collect();

    let mut count = interior.iter().filter(|&&i| i).count();
    info!(
        interior = count,
        points = vertex_data.len(),
        "Interior points after initial phase"
    );
    if count == 0 {
        return interior;
    }

    loop {
        let mut found = false;
        for v in 0..vertex_data.len() {
            if interior[v] || !ratio_condition(&vertex_data[v], rho) {
                continue;
            }
            let vertex = &vertex_data[v];
            if vertex
                .cocone_neighbors
                .iter()
                .any(|&n| interior[n] && normal_condition(vertex, &vertex_data[n], cos_alpha))
            {
                interior[v] = true;
                found = true;
                count += 1;
            }
        }
        if !found {
            break;
        }
    }

    info!(
        interior = count,
        points = vertex_data.len(),
        "Interior points after expansion phase"
    );
    interior
}

/// A facet whose vertices are interior and in its cocone, or on the boundary,
/// with at least one vertex of the first kind.
fn cocone_interior_facet<const D: usize>(
    facet: &DelaunayFacet<D>,
    data: &ManifoldFacet<D>,
    interior_vertices: &[bool],
) -> bool {
    let mut found = false;
    for (&v, &cocone) in facet.vertices().iter().zip(&data.cocone_vertex) {
        let interior = interior_vertices[v];
        let interior_cocone = interior && cocone;
        if !(interior_cocone || !interior) {
            return false;
        }
        found |= interior_cocone;
    }
    found
}

impl<const D: usize> ManifoldConstructor<D> {
    /// Builds the Delaunay objects and the full vertex data needed by both
    /// Cocone and BoundCocone.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::DegenerateInput`] for fewer than `D + 2`
    /// points or input the convex hull rejects, and
    /// [`ReconstructionError::NumericalFailure`] if a pole or a Voronoi cell
    /// measure cannot be computed.
    pub fn new<T: Float>(
        points: &[[T; D]],
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<Self, ReconstructionError> {
        Self::create(points, false, progress)
    }

    /// Builds only what Cocone needs; [`Self::bound_cocone`] is then
    /// unavailable.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn new_cocone_only<T: Float>(
        points: &[[T; D]],
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<Self, ReconstructionError> {
        Self::create(points, true, progress)
    }

    fn create<T: Float>(
        source_points: &[[T; D]],
        cocone_only: bool,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<Self, ReconstructionError> {
        if source_points.len() < D + 2 {
            return Err(ReconstructionError::DegenerateInput {
                message: format!(
                    "Error point count {} for cocone manifold reconstruction in {D}D",
                    source_points.len()
                ),
            });
        }

        let points = normalize_points(source_points)?;

        report_text(progress, "Voronoi-Delaunay: %v of %m");
        debug!(points = points.len(), dimension = D, "Compute Delaunay");
        let simplices = compute_delaunay(&points, progress)?;

        debug!("Creating Delaunay objects, facets and Voronoi vertices");
        let objects = create_delaunay_objects(&points, &simplices)?;
        let facets = create_delaunay_facets(&simplices)?;
        let object_facets = object_facets(objects.len(), &facets);

        debug!(cocone_only, "Vertex and facet data");
        let (vertex_data, facet_data) =
            vertex_and_facet_data(!cocone_only, &points, &objects, &facets)?;

        info!(
            points = points.len(),
            objects = objects.len(),
            facets = facets.len(),
            "Manifold constructor created"
        );

        Ok(Self {
            cocone_only,
            points,
            objects,
            facets,
            object_facets,
            vertex_data,
            facet_data,
        })
    }

    /// Input points on the quantization grid, translated and uniformly
    /// scaled into the unit cube.
    ///
    /// Facets, normals and the spanning tree are computed on these points.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[[f64; D]] {
        &self.points
    }

    /// Delaunay simplices with their Voronoi vertices.
    #[inline]
    #[must_use]
    pub fn delaunay_objects(&self) -> &[DelaunayObject<D>] {
        &self.objects
    }

    /// Facets of the Delaunay complex.
    #[inline]
    #[must_use]
    pub fn delaunay_facets(&self) -> &[DelaunayFacet<D>] {
        &self.facets
    }

    /// `true` for constructors made with [`Self::new_cocone_only`].
    #[inline]
    #[must_use]
    pub const fn is_cocone_only(&self) -> bool {
        self.cocone_only
    }

    /// Positive pole direction of every point, zero for points outside the
    /// Delaunay complex.
    #[must_use]
    pub fn normals(&self) -> Vec<[f64; D]> {
        self.vertex_data.iter().map(|v| v.positive_norm).collect()
    }

    fn common_computation(
        &self,
        interior_vertices: &[bool],
        mut cocone_facets: Vec<bool>,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<ReconstructedManifold<D>, ReconstructionError> {
        report(progress, 1, 4);
        debug!("Prune facets");
        prune_facets_incident_to_sharp_ridges(
            &self.points,
            &self.facets,
            interior_vertices,
            &mut cocone_facets,
        )?;
        if !cocone_facets.contains(&true) {
            return Err(ReconstructionError::non_manifold::<D>(" after prune"));
        }

        report(progress, 2, 4);
        debug!("Extract manifold");
        let reached = extract_manifold(&self.facets, &self.object_facets, &mut cocone_facets);
        if !cocone_facets.contains(&true) {
            return Err(ReconstructionError::non_manifold::<D>(
                " after manifold extraction",
            ));
        }

        report(progress, 3, 4);
        debug!("Create result");
        let (normals, facets) =
            create_normals_and_facets(&self.points, &self.facets, &reached, &self.vertex_data)?;
        check_facet_dimension(&self.points, &facets)?;

        report(progress, 4, 4);
        info!(facets = facets.len(), "Manifold reconstructed");
        Ok(ReconstructedManifold { normals, facets })
    }

    /// Cocone reconstruction of a closed manifold.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::NonManifoldInput`] if no facets are left
    /// at some stage, or [`ReconstructionError::NumericalFailure`].
    pub fn cocone(
        &self,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<ReconstructedManifold<D>, ReconstructionError> {
        report_text(progress, "Cocone reconstruction: %v of %m");
        report(progress, 0, 4);

        let cocone_facets: Vec<bool> = self.facet_data.iter().map(ManifoldFacet::all_cocone).collect();
        if !cocone_facets.contains(&true) {
            return Err(ReconstructionError::non_manifold::<D>(""));
        }

        let interior_vertices = vec![true; self.points.len()];
        self.common_computation(&interior_vertices, cocone_facets, progress)
    }

    /// BoundCocone reconstruction of a manifold that may have boundary.
    ///
    /// `rho` bounds the width-to-height ratio of interior Voronoi cells and
    /// `alpha` (radians) the angle between neighbouring pole lines.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::ConstructorMode`] for a Cocone-only
    /// constructor, [`ReconstructionError::InvalidParameters`] for thresholds
    /// outside `(0, 1)`, and the errors of [`Self::cocone`].
    pub fn bound_cocone(
        &self,
        rho: f64,
        alpha: f64,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<ReconstructedManifold<D>, ReconstructionError> {
        self.bound_cocone_with(&BoundCoconeParameters::new(rho, alpha), progress)
    }

    /// [`Self::bound_cocone`] with the thresholds in a parameter struct.
    ///
    /// # Errors
    ///
    /// As [`Self::bound_cocone`].
    pub fn bound_cocone_with(
        &self,
        parameters: &BoundCoconeParameters,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<ReconstructedManifold<D>, ReconstructionError> {
        if self.cocone_only {
            return Err(ReconstructionError::ConstructorMode);
        }
        parameters.validate()?;

        report_text(progress, "BoundCocone reconstruction: %v of %m");
        report(progress, 0, 4);

        let interior_vertices =
            find_interior_vertices(parameters.rho, parameters.cos_alpha(), &self.vertex_data);
        if !interior_vertices.contains(&true) {
            return Err(ReconstructionError::NonManifoldInput {
                message: format!(
                    "Interior vertices not found. {}-manifold is not reconstructable.",
                    D - 1
                ),
            });
        }

        let cocone_facets: Vec<bool> = self
            .facets
            .iter()
            .zip(&self.facet_data)
            .map(|(facet, data)| cocone_interior_facet(facet, data, &interior_vertices))
            .collect();
        if !cocone_facets.contains(&true) {
            return Err(ReconstructionError::NonManifoldInput {
                message: format!(
                    "Cocone interior facets not found. {}-manifold is not reconstructable.",
                    D - 1
                ),
            });
        }

        self.common_computation(&interior_vertices, cocone_facets, progress)
    }

    /// Minimum spanning tree of the Delaunay graph.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::DisconnectedGraph`] if the graph has
    /// more than one component.
    pub fn minimum_spanning_tree(
        &self,
        progress: Option<&dyn ProgressRatio>,
    ) -> Result<Vec<[usize; 2]>, ReconstructionError> {
        let simplices: Vec<&[usize]> = self
            .objects
            .iter()
            .map(|object| object.simplex().vertices())
            .collect();
        Ok(minimum_spanning_tree(&self.points, &simplices, progress)?)
    }

    /// Runs [`check_mesh`] on a result of this constructor.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::TopologyMismatch`] with the failed check.
    pub fn check_mesh(
        &self,
        manifold: &ReconstructedManifold<D>,
        options: &MeshCheckOptions,
    ) -> Result<(), ReconstructionError> {
        Ok(check_mesh(&self.points, &manifold.facets, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::progress::AtomicProgress;
    use crate::reconstruction::parameters::ParameterError;

    fn ellipse(count: usize) -> Vec<[f64; 2]> {
        (0..count)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / count as f64;
                [2.0 * a.cos(), a.sin()]
            })
            .collect()
    }

    fn vertex(norm: [f64; 2], radius: f64, neighbors: Vec<usize>) -> ManifoldVertex<2> {
        ManifoldVertex {
            positive_norm: norm,
            height: 1.0,
            radius,
            cocone_neighbors: neighbors,
        }
    }

    // =============================================================================
    // INTERIOR VERTEX TESTS
    // =============================================================================

    #[test]
    fn test_interior_vertices_expand_from_flat_seed() {
        let bent = [0.6, 0.8];
        let vertex_data = vec![
            vertex([0.0, 1.0], 0.1, vec![1]),
            vertex([0.0, -1.0], 0.1, vec![0, 2]),
            vertex([0.1, 0.995], 0.1, vec![1, 3]),
            vertex(bent, 0.1, vec![2]),
            vertex([0.0, 1.0], 0.5, vec![]),
        ];
        let interior = find_interior_vertices(0.3, 0.14f64.cos(), &vertex_data);
        // Opposite poles agree as lines; the bent one and the wide cell never join.
        assert_eq!(interior, vec![true, true, true, false, false]);
    }

    #[test]
    fn test_no_interior_vertices_without_seed() {
        let vertex_data = vec![vertex([1.0, 0.0], 0.1, vec![1]), vertex([0.0, 1.0], 0.1, vec![0])];
        let interior = find_interior_vertices(0.3, 0.14f64.cos(), &vertex_data);
        assert_eq!(interior, vec![false, false]);
    }

    // =============================================================================
    // RECONSTRUCTION TESTS
    // =============================================================================

    #[test]
    fn test_too_few_points() {
        let err = ManifoldConstructor::new(&[[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]], None).unwrap_err();
        assert_eq!(
            err,
            ReconstructionError::DegenerateInput {
                message: "Error point count 3 for cocone manifold reconstruction in 2D".to_string()
            }
        );
    }

    #[test]
    fn test_ellipse_cocone_and_progress() {
        let points = ellipse(80);
        let constructor = ManifoldConstructor::new(&points, None).unwrap();
        let progress = AtomicProgress::default();
        let manifold = constructor.cocone(Some(&progress)).unwrap();

        assert_eq!(manifold.facets.len(), 80);
        assert_eq!(manifold.normals.len(), 80);
        assert_eq!(progress.ratio(), 1.0);
        assert_eq!(progress.text(), "Cocone reconstruction: %v of %m");

        let options = MeshCheckOptions {
            has_boundary: false,
            expected_euler_characteristic: Some(0),
        };
        constructor.check_mesh(&manifold, &options).unwrap();

        // Normals point out of the ellipse.
        for (p, n) in points.iter().zip(&manifold.normals) {
            assert!(dot(p, n) > 0.0);
        }
    }

    #[test]
    fn test_bound_cocone_modes_and_parameters() {
        let points = ellipse(40);
        let cocone_only = ManifoldConstructor::new_cocone_only(&points, None).unwrap();
        assert!(cocone_only.is_cocone_only());
        assert_eq!(
            cocone_only.bound_cocone(0.3, 0.14, None),
            Err(ReconstructionError::ConstructorMode)
        );

        let constructor = ManifoldConstructor::new(&points, None).unwrap();
        assert_eq!(
            constructor.bound_cocone(1.5, 0.14, None),
            Err(ReconstructionError::InvalidParameters(
                ParameterError::RhoOutOfRange { rho: 1.5 }
            ))
        );
        let manifold = constructor
            .bound_cocone_with(&BoundCoconeParameters::default(), None)
            .unwrap();
        assert!(!manifold.facets.is_empty());
        assert!(manifold.facets.len() <= 40);
    }

    #[test]
    fn test_minimum_spanning_tree_of_ellipse() {
        let points = ellipse(30);
        let constructor = ManifoldConstructor::new(&points, None).unwrap();
        let mst = constructor.minimum_spanning_tree(None).unwrap();
        assert_eq!(mst.len(), 29);
    }
}
