//! Delaunay complex of a point set and its Voronoi dual.
//!
//! The Delaunay triangulation is the projection of the lower convex hull of
//! the points lifted onto the paraboloid. Each simplex becomes a
//! [`DelaunayObject`] carrying its circumcenter (a Voronoi vertex), and each
//! `(D-1)`-face becomes a [`DelaunayFacet`] linking the one or two objects that
//! share it. A facet with a single object lies on the convex hull of the
//! input; its Voronoi edge is a ray.

use thiserror::Error;
use tracing::debug;

use crate::core::collections::{
    Entry, FastHashMap, MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer, VertexBuffer,
    fast_hash_map_with_capacity,
};
use crate::core::progress::ProgressRatio;
use crate::geometry::algorithms::convex_hull::{
    ConvexHullError, PointStore, compute_convex_hull, quantize_points,
};
use crate::geometry::predicates::{FacetOrtho, Orientation};
use crate::geometry::util::{CircumcenterError, circumcenter, dot, facet_normal, subtract};

/// Errors from building the Voronoi dual of a triangulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DelaunayError {
    /// The circumcenter of a simplex could not be computed.
    #[error("Delaunay simplex {simplex} with vertices {vertices:?} has no Voronoi vertex: {source}")]
    NoVoronoiVertex {
        /// Index of the simplex.
        simplex: usize,
        /// Point indices of the simplex.
        vertices: Vec<usize>,
        /// Failure of the circumcenter computation.
        #[source]
        source: CircumcenterError,
    },
}

/// One simplex of the Delaunay triangulation.
///
/// `ortho(r)` is the unit normal of the facet opposite `vertex(r)`, pointing
/// out of the simplex.
#[derive(Clone, Debug, PartialEq)]
pub struct DelaunaySimplex<const D: usize> {
    vertices: VertexBuffer,
    orthos: SmallBuffer<[f64; D], MAX_PRACTICAL_DIMENSION_SIZE>,
}

impl<const D: usize> DelaunaySimplex<D> {
    /// Build a simplex from `D + 1` point indices, computing the facet normals.
    ///
    /// # Errors
    ///
    /// Returns [`ConvexHullError::DegenerateFacet`] if a facet has no normal.
    pub fn new(points: &[[f64; D]], vertices: VertexBuffer) -> Result<Self, ConvexHullError> {
        let mut orthos = SmallBuffer::with_capacity(vertices.len());
        for r in 0..vertices.len() {
            let facet: [[f64; D]; D] = std::array::from_fn(|i| {
                let local = if i < r { i } else { i + 1 };
                points[vertices[local]]
            });
            let mut normal =
                facet_normal(&facet).map_err(|_| ConvexHullError::DegenerateFacet)?;
            if dot(&normal, &subtract(&points[vertices[r]], &facet[0])) > 0.0 {
                normal = normal.map(|x| -x);
            }
            orthos.push(normal);
        }
        Ok(Self { vertices, orthos })
    }

    /// Build a simplex on grid points. Each normal is oriented by the exact
    /// side of the opposite vertex.
    pub(crate) fn from_grid(
        grid: &[[i64; D]],
        vertices: VertexBuffer,
    ) -> Result<Self, ConvexHullError> {
        let mut orthos = SmallBuffer::with_capacity(vertices.len());
        for r in 0..vertices.len() {
            let corners: SmallBuffer<&[i64], MAX_PRACTICAL_DIMENSION_SIZE> = vertices
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != r)
                .map(|(_, &v)| grid[v].as_slice())
                .collect();
            let mut ortho = FacetOrtho::new(&corners);
            match ortho.orientation(&corners, &grid[vertices[r]]) {
                Orientation::NEGATIVE => {}
                Orientation::POSITIVE => ortho.negate(),
                Orientation::DEGENERATE => return Err(ConvexHullError::DegenerateFacet),
            }
            let normal = ortho.unit_normal();
            orthos.push(std::array::from_fn(|i| normal[i]));
        }
        Ok(Self { vertices, orthos })
    }

    /// Point indices of the simplex.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Point index of local vertex `r`.
    #[inline]
    #[must_use]
    pub fn vertex(&self, r: usize) -> usize {
        self.vertices[r]
    }

    /// Outward unit normal of the facet opposite local vertex `r`.
    #[inline]
    #[must_use]
    pub fn ortho(&self, r: usize) -> &[f64; D] {
        &self.orthos[r]
    }

    /// Point indices of the facet opposite local vertex `r`, in simplex order.
    #[must_use]
    pub fn facet_vertices(&self, r: usize) -> [usize; D] {
        std::array::from_fn(|i| self.vertices[if i < r { i } else { i + 1 }])
    }
}

/// A Delaunay simplex with its Voronoi vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct DelaunayObject<const D: usize> {
    simplex: DelaunaySimplex<D>,
    voronoi_vertex: [f64; D],
}

impl<const D: usize> DelaunayObject<D> {
    /// The underlying simplex.
    #[inline]
    #[must_use]
    pub const fn simplex(&self) -> &DelaunaySimplex<D> {
        &self.simplex
    }

    /// Circumcenter of the simplex.
    #[inline]
    #[must_use]
    pub const fn voronoi_vertex(&self) -> &[f64; D] {
        &self.voronoi_vertex
    }
}

/// A `(D-1)`-face of the Delaunay complex.
#[derive(Clone, Debug, PartialEq)]
pub struct DelaunayFacet<const D: usize> {
    vertices: [usize; D],
    objects: (usize, Option<usize>),
    ortho: [f64; D],
}

impl<const D: usize> DelaunayFacet<D> {
    /// Point indices of the facet.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> &[usize; D] {
        &self.vertices
    }

    /// Index of the first incident object.
    #[inline]
    #[must_use]
    pub const fn first_object(&self) -> usize {
        self.objects.0
    }

    /// Index of the second incident object, `None` on the convex hull.
    #[inline]
    #[must_use]
    pub const fn second_object(&self) -> Option<usize> {
        self.objects.1
    }

    /// `true` for facets on the convex hull of the points.
    #[inline]
    #[must_use]
    pub const fn one_sided(&self) -> bool {
        self.objects.1.is_none()
    }

    /// Unit normal pointing away from the first object.
    #[inline]
    #[must_use]
    pub const fn ortho(&self) -> &[f64; D] {
        &self.ortho
    }
}

/// Delaunay simplices of `points`.
///
/// The points are snapped to the quantization grid of the hull. Lower-hull
/// membership and simplex orientation are decided exactly on that grid, so
/// every simplex has positive volume there.
///
/// # Errors
///
/// Returns a [`ConvexHullError`] for invalid or degenerate input.
///
/// # Examples
///
/// ```rust
/// use cocone::core::delaunay::compute_delaunay;
///
/// let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.1]];
/// let simplices = compute_delaunay(&points, None).unwrap();
/// assert_eq!(simplices.len(), 2);
/// ```
pub fn compute_delaunay<const D: usize>(
    points: &[[f64; D]],
    progress: Option<&dyn ProgressRatio>,
) -> Result<Vec<DelaunaySimplex<D>>, ConvexHullError> {
    if points.len() < D + 2 {
        return Err(ConvexHullError::InsufficientPoints {
            count: points.len(),
            dimension: D,
        });
    }
    let grid = quantize_points(points)?;
    let lifted = PointStore::lifted(&grid);
    let hull = compute_convex_hull(&lifted, progress)?;

    let simplices = hull
        .into_iter()
        .filter(|facet| facet.lower)
        .map(|facet| DelaunaySimplex::from_grid(&grid, facet.vertices))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(simplices = simplices.len(), dimension = D, "Delaunay simplices");
    Ok(simplices)
}

/// Attach Voronoi vertices to the simplices.
///
/// # Errors
///
/// Returns [`DelaunayError::NoVoronoiVertex`] naming the first simplex whose
/// circumcenter cannot be computed.
pub fn create_delaunay_objects<const D: usize>(
    points: &[[f64; D]],
    simplices: &[DelaunaySimplex<D>],
) -> Result<Vec<DelaunayObject<D>>, DelaunayError> {
    simplices
        .iter()
        .enumerate()
        .map(|(index, simplex)| {
            let vertex_points: SmallBuffer<[f64; D], MAX_PRACTICAL_DIMENSION_SIZE> =
                simplex.vertices().iter().map(|&v| points[v]).collect();
            let voronoi_vertex =
                circumcenter(&vertex_points).map_err(|source| DelaunayError::NoVoronoiVertex {
                    simplex: index,
                    vertices: simplex.vertices().to_vec(),
                    source,
                })?;
            Ok(DelaunayObject {
                simplex: simplex.clone(),
                voronoi_vertex,
            })
        })
        .collect()
}

/// All `(D-1)`-faces of the simplices with their incident objects.
///
/// # Errors
///
/// Returns [`ConvexHullError::InconsistentHorizon`] if a face is shared by
/// more than two simplices.
pub fn create_delaunay_facets<const D: usize>(
    simplices: &[DelaunaySimplex<D>],
) -> Result<Vec<DelaunayFacet<D>>, ConvexHullError> {
    let mut facets: Vec<DelaunayFacet<D>> = Vec::with_capacity(simplices.len() * (D + 1) / 2 + D);
    let mut index: FastHashMap<[usize; D], usize> = fast_hash_map_with_capacity(facets.capacity());
    for (object, simplex) in simplices.iter().enumerate() {
        for r in 0..=D {
            let vertices = simplex.facet_vertices(r);
            let mut key = vertices;
            key.sort_unstable();
            match index.entry(key) {
                Entry::Occupied(e) => {
                    let facet = &mut facets[*e.get()];
                    if facet.objects.1.is_some() {
                        return Err(ConvexHullError::InconsistentHorizon);
                    }
                    facet.objects.1 = Some(object);
                }
                Entry::Vacant(e) => {
                    e.insert(facets.len());
                    facets.push(DelaunayFacet {
                        vertices,
                        objects: (object, None),
                        ortho: *simplex.ortho(r),
                    });
                }
            }
        }
    }
    debug!(facets = facets.len(), "Delaunay facets");
    Ok(facets)
}
