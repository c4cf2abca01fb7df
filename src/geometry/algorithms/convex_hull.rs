//! Randomized incremental convex hull in runtime dimension.
//!
//! The hull is built with conflict lists: every hull facet knows the
//! not-yet-inserted points that see it, and every point knows the facets it
//! sees. Inserting a point removes its visible facets and connects the point
//! to the horizon ridges, where a horizon ridge is shared by a visible facet and
//! a facet that is not visible.
//!
//! The same engine computes Delaunay triangulations: points are lifted onto
//! the paraboloid `x_{D+1} = |x|²` and the lower hull projects back to the
//! Delaunay simplices (see [`crate::core::delaunay`]).
//!
//! # Numerical model
//!
//! Input coordinates are translated to the origin, scaled by the largest
//! bounding-box extent and rounded onto a `2^24` grid. The hull works on the
//! integer grid coordinates, lifted coordinates included, and decides
//! visibility and lower-hull membership with the exact predicates of
//! [`crate::geometry::predicates`]. A point is visible from a facet only when
//! it lies strictly outside the facet's hyperplane.

use num_traits::Float;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use slotmap::new_key_type;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::collections::{
    CoordinateBuffer, Entry, FastHashMap, MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer,
    StorageMap, VertexBuffer, fast_hash_map_with_capacity,
};
use crate::core::progress::{ProgressRatio, report};
use crate::core::ridge::Ridge;
use crate::geometry::predicates::{FacetOrtho, Orientation};
use crate::geometry::util::{dot, normalize_in_place, squared_norm};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Number of grid steps per unit of the normalized input frame.
pub const GRID_SIZE: f64 = 16_777_216.0;

/// Minimal distance from the affine span of the previous simplex vertices for
/// a point to be accepted as the next vertex of the starting simplex.
const SIMPLEX_EPSILON: f64 = 1e-6;

const PROGRESS_INTERVAL: usize = 0xfff;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during convex hull construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConvexHullError {
    /// Fewer points than a full-dimensional simplex needs.
    #[error("Insufficient points for a {dimension}D hull: got {count}")]
    InsufficientPoints {
        /// Number of input points.
        count: usize,
        /// Dimension of the hull.
        dimension: usize,
    },
    /// The hull dimension is outside the supported range.
    #[error("Unsupported hull dimension {dimension}")]
    UnsupportedDimension {
        /// Dimension of the hull.
        dimension: usize,
    },
    /// Every input point is the same point.
    #[error("All points are equal")]
    AllPointsEqual,
    /// An input coordinate is NaN, infinite, or has no `f64` value.
    #[error("Point {index} has a non-finite coordinate")]
    NonFiniteInput {
        /// Index of the offending point.
        index: usize,
    },
    /// Two input points coincide on the quantization grid.
    #[error("Points {first} and {second} are equal")]
    DuplicatePoints {
        /// Index of the earlier point.
        first: usize,
        /// Index of the later point.
        second: usize,
    },
    /// The points are affinely dependent, so no starting simplex exists.
    #[error("Convex hull simplex vertex {vertex} not found in {dimension}D; the points are degenerate")]
    SimplexNotFound {
        /// Index (0-based) of the simplex vertex that could not be found.
        vertex: usize,
        /// Dimension of the hull.
        dimension: usize,
    },
    /// A point sees the entire current hull.
    #[error("All facets are visible from point {point}")]
    AllFacetsVisible {
        /// Index of the point.
        point: usize,
    },
    /// A new facet has affinely dependent vertices.
    #[error("Degenerate convex hull facet")]
    DegenerateFacet,
    /// Horizon ridges could not be paired after an insertion.
    #[error("Inconsistent convex hull horizon")]
    InconsistentHorizon,
}

// =============================================================================
// PUBLIC TYPES
// =============================================================================

/// One facet of a `D`-dimensional convex hull.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHullFacet<const D: usize> {
    /// Indices into the input points.
    pub vertices: [usize; D],
    /// Outward unit normal.
    pub ortho: [f64; D],
}

// =============================================================================
// INPUT PREPROCESSING
// =============================================================================

/// Grid coordinates of the input points, each in `0..=GRID_SIZE`.
///
/// The translation and the single scale factor preserve proportions, so
/// normals and angles computed in the grid frame equal those of the input.
///
/// # Errors
///
/// Returns [`ConvexHullError::NonFiniteInput`], [`ConvexHullError::AllPointsEqual`]
/// or [`ConvexHullError::DuplicatePoints`].
pub(crate) fn quantize_points<T: Float, const D: usize>(
    points: &[[T; D]],
) -> Result<Vec<[i64; D]>, ConvexHullError> {
    let mut converted = Vec::with_capacity(points.len());
    for (index, point) in points.iter().enumerate() {
        let mut p = [0.0f64; D];
        for (dst, src) in p.iter_mut().zip(point) {
            *dst = src
                .to_f64()
                .filter(|x| x.is_finite())
                .ok_or(ConvexHullError::NonFiniteInput { index })?;
        }
        converted.push(p);
    }

    let mut min = [f64::INFINITY; D];
    let mut max = [f64::NEG_INFINITY; D];
    for p in &converted {
        for i in 0..D {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    let extent = (0..D).map(|i| max[i] - min[i]).fold(0.0f64, f64::max);
    if extent <= 0.0 {
        return Err(ConvexHullError::AllPointsEqual);
    }

    let mut seen: FastHashMap<[i64; D], usize> = fast_hash_map_with_capacity(converted.len());
    let mut quantized = Vec::with_capacity(converted.len());
    for (index, p) in converted.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let steps: [i64; D] =
            std::array::from_fn(|i| ((p[i] - min[i]) / extent * GRID_SIZE).round() as i64);
        match seen.entry(steps) {
            Entry::Occupied(e) => {
                return Err(ConvexHullError::DuplicatePoints {
                    first: *e.get(),
                    second: index,
                });
            }
            Entry::Vacant(e) => {
                e.insert(index);
            }
        }
        quantized.push(steps);
    }
    Ok(quantized)
}

/// Map input points onto the `[0, 1]` grid of [`GRID_SIZE`] steps.
///
/// Normalizing already normalized points returns them unchanged.
///
/// # Errors
///
/// Same as [`quantize_points`].
pub(crate) fn normalize_points<T: Float, const D: usize>(
    points: &[[T; D]],
) -> Result<Vec<[f64; D]>, ConvexHullError> {
    Ok(quantize_points(points)?
        .into_iter()
        .map(|steps| steps.map(|s| s as f64 / GRID_SIZE))
        .collect())
}

/// Flat storage of grid points with a common runtime dimension.
#[derive(Clone, Debug)]
pub(crate) struct PointStore {
    dimension: usize,
    coordinates: Vec<i64>,
    /// Size of one step per coordinate in the normalized frame.
    unit: CoordinateBuffer,
}

impl PointStore {
    /// Store the grid points unchanged.
    pub(crate) fn plain<const D: usize>(points: &[[i64; D]]) -> Self {
        Self {
            dimension: D,
            coordinates: points.iter().flatten().copied().collect(),
            unit: SmallBuffer::from_elem(GRID_SIZE.recip(), D),
        }
    }

    /// Store the grid points lifted onto the paraboloid, one dimension higher.
    pub(crate) fn lifted<const D: usize>(points: &[[i64; D]]) -> Self {
        let mut coordinates = Vec::with_capacity(points.len() * (D + 1));
        for p in points {
            coordinates.extend_from_slice(p);
            coordinates.push(p.iter().map(|x| x * x).sum());
        }
        let mut unit: CoordinateBuffer = SmallBuffer::from_elem(GRID_SIZE.recip(), D);
        unit.push((GRID_SIZE * GRID_SIZE).recip());
        Self {
            dimension: D + 1,
            coordinates,
            unit,
        }
    }

    #[inline]
    pub(crate) const fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.coordinates.len() / self.dimension
    }

    #[inline]
    fn point(&self, index: usize) -> &[i64] {
        &self.coordinates[index * self.dimension..(index + 1) * self.dimension]
    }

    /// The point in the normalized frame.
    fn normalized(&self, index: usize) -> CoordinateBuffer {
        self.point(index)
            .iter()
            .zip(&self.unit)
            .map(|(&x, u)| x as f64 * u)
            .collect()
    }

    fn corners(&self, vertices: &[usize]) -> SmallBuffer<&[i64], MAX_PRACTICAL_DIMENSION_SIZE> {
        vertices.iter().map(|&v| self.point(v)).collect()
    }
}

// =============================================================================
// HULL CONSTRUCTION
// =============================================================================

/// Hull facet produced by [`compute_convex_hull`].
#[derive(Clone, Debug)]
pub(crate) struct HullFacet {
    pub(crate) vertices: VertexBuffer,
    /// Outward unit normal in the grid frame.
    pub(crate) normal: CoordinateBuffer,
    /// The last component of the exact outward normal is negative.
    pub(crate) lower: bool,
}

new_key_type! {
    struct FacetKey;
}

#[derive(Debug)]
struct Facet {
    vertices: VertexBuffer,
    /// `links[r]` is the facet sharing the ridge opposite `vertices[r]`.
    links: SmallBuffer<FacetKey, MAX_PRACTICAL_DIMENSION_SIZE>,
    ortho: FacetOrtho,
    conflicts: Vec<usize>,
    visible: bool,
}

struct IncrementalHull<'a> {
    points: &'a PointStore,
    facets: StorageMap<FacetKey, Facet>,
    point_conflicts: Vec<Vec<FacetKey>>,
    marks: Vec<bool>,
}

fn remove_key(keys: &mut Vec<FacetKey>, key: FacetKey) {
    if let Some(position) = keys.iter().position(|&k| k == key) {
        keys.swap_remove(position);
    }
}

/// Vertices of a full-dimensional starting simplex, chosen by repeatedly
/// taking the point farthest from the affine span of the vertices so far.
fn find_initial_simplex(
    points: &PointStore,
    order: &[usize],
) -> Result<VertexBuffer, ConvexHullError> {
    let dimension = points.dimension();
    let first = order[0];
    let origin = points.normalized(first);

    let mut simplex = VertexBuffer::new();
    simplex.push(first);
    let mut basis: SmallBuffer<CoordinateBuffer, MAX_PRACTICAL_DIMENSION_SIZE> = SmallBuffer::new();

    for vertex in 1..=dimension {
        let mut best: Option<(usize, f64, CoordinateBuffer)> = None;
        for &index in order {
            let mut residual: CoordinateBuffer = points
                .normalized(index)
                .iter()
                .zip(&origin)
                .map(|(p, o)| p - o)
                .collect();
            for b in &basis {
                let d = dot(&residual, b);
                for (r, x) in residual.iter_mut().zip(b) {
                    *r -= d * x;
                }
            }
            let length = squared_norm(&residual);
            if best.as_ref().is_none_or(|(_, l, _)| length > *l) {
                best = Some((index, length, residual));
            }
        }
        match best {
            Some((index, length, mut residual)) if length.sqrt() > SIMPLEX_EPSILON => {
                normalize_in_place(&mut residual);
                basis.push(residual);
                simplex.push(index);
            }
            _ => return Err(ConvexHullError::SimplexNotFound { vertex, dimension }),
        }
    }
    Ok(simplex)
}

impl<'a> IncrementalHull<'a> {
    fn new(points: &'a PointStore, simplex: &[usize]) -> Result<Self, ConvexHullError> {
        let dimension = points.dimension();
        let mut hull = Self {
            points,
            facets: StorageMap::with_key(),
            point_conflicts: vec![Vec::new(); points.len()],
            marks: vec![false; points.len()],
        };

        // Facet r of the simplex omits simplex[r].
        let mut keys: SmallBuffer<FacetKey, MAX_PRACTICAL_DIMENSION_SIZE> = SmallBuffer::new();
        for r in 0..simplex.len() {
            let vertices: VertexBuffer = simplex
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != r)
                .map(|(_, &v)| v)
                .collect();
            let ortho = hull.outward_ortho(&vertices, simplex[r])?;
            keys.push(hull.facets.insert(Facet {
                vertices,
                links: SmallBuffer::from_elem(FacetKey::default(), dimension),
                ortho,
                conflicts: Vec::new(),
                visible: false,
            }));
        }
        for &key in &keys {
            let vertices = hull.facets[key].vertices.clone();
            for (j, v) in vertices.iter().enumerate() {
                let opposite = simplex.iter().position(|s| s == v).map(|k| keys[k]);
                hull.facets[key].links[j] = opposite.ok_or(ConvexHullError::InconsistentHorizon)?;
            }
        }

        let in_simplex = |index: usize| simplex.contains(&index);
        for point in (0..points.len()).filter(|&p| !in_simplex(p)) {
            for &key in &keys {
                if hull.sees(&hull.facets[key].vertices, &hull.facets[key].ortho, point) {
                    hull.facets[key].conflicts.push(point);
                    hull.point_conflicts[point].push(key);
                }
            }
        }
        Ok(hull)
    }

    /// Ortho of the hyperplane through `vertices`, oriented so that `inner`
    /// lies on its negative side.
    fn outward_ortho(&self, vertices: &[usize], inner: usize) -> Result<FacetOrtho, ConvexHullError> {
        let corners = self.points.corners(vertices);
        let mut ortho = FacetOrtho::new(&corners);
        match ortho.orientation(&corners, self.points.point(inner)) {
            Orientation::NEGATIVE => {}
            Orientation::POSITIVE => ortho.negate(),
            Orientation::DEGENERATE => return Err(ConvexHullError::DegenerateFacet),
        }
        Ok(ortho)
    }

    /// `true` when `point` lies strictly outside the facet.
    fn sees(&self, vertices: &[usize], ortho: &FacetOrtho, point: usize) -> bool {
        let corners = self.points.corners(vertices);
        ortho.orientation(&corners, self.points.point(point)) == Orientation::POSITIVE
    }

    /// Points from the conflict lists of `a` and `b` that see the new facet.
    fn merge_conflicts(
        &mut self,
        a: FacetKey,
        b: FacetKey,
        point: usize,
        vertices: &[usize],
        ortho: &FacetOrtho,
    ) -> Vec<usize> {
        let mut conflicts = Vec::new();
        for key in [a, b] {
            for &q in &self.facets[key].conflicts {
                if q == point || self.marks[q] {
                    continue;
                }
                self.marks[q] = true;
                if self.sees(vertices, ortho, q) {
                    conflicts.push(q);
                }
            }
        }
        for key in [a, b] {
            for &q in &self.facets[key].conflicts {
                self.marks[q] = false;
            }
        }
        conflicts
    }

    /// Insert `point`. Returns `false` if the point is inside the hull or on
    /// its boundary.
    fn insert(&mut self, point: usize) -> Result<bool, ConvexHullError> {
        let visible = std::mem::take(&mut self.point_conflicts[point]);
        if visible.is_empty() {
            return Ok(false);
        }
        if visible.len() == self.facets.len() {
            return Err(ConvexHullError::AllFacetsVisible { point });
        }
        for &key in &visible {
            self.facets[key].visible = true;
        }

        let dimension = self.points.dimension();
        let mut created: Vec<FacetKey> = Vec::new();
        for &key in &visible {
            for r in 0..dimension {
                let link = self.facets[key].links[r];
                if self.facets[link].visible {
                    continue;
                }
                // The replaced vertex is strictly inside the new facet.
                let inner = self.facets[key].vertices[r];
                let mut vertices = self.facets[key].vertices.clone();
                vertices[r] = point;
                let ortho = self.outward_ortho(&vertices, inner)?;
                let conflicts = self.merge_conflicts(key, link, point, &vertices, &ortho);
                let mut links = SmallBuffer::from_elem(FacetKey::default(), dimension);
                links[r] = link;
                let new_key = self.facets.insert(Facet {
                    vertices,
                    links,
                    ortho,
                    conflicts,
                    visible: false,
                });
                let back = self.facets[link]
                    .links
                    .iter()
                    .position(|&k| k == key)
                    .ok_or(ConvexHullError::InconsistentHorizon)?;
                self.facets[link].links[back] = new_key;
                created.push(new_key);
            }
        }

        // New facets meet each other along ridges through the new point.
        let mut ridges: FastHashMap<Ridge, (FacetKey, usize)> =
            fast_hash_map_with_capacity(created.len() * dimension);
        for &key in &created {
            let vertices = self.facets[key].vertices.clone();
            for (r, &v) in vertices.iter().enumerate() {
                if v == point {
                    continue;
                }
                match ridges.entry(Ridge::opposite(&vertices, r)) {
                    Entry::Occupied(e) => {
                        let (other, other_r) = e.remove();
                        self.facets[key].links[r] = other;
                        self.facets[other].links[other_r] = key;
                    }
                    Entry::Vacant(e) => {
                        e.insert((key, r));
                    }
                }
            }
        }
        if !ridges.is_empty() {
            return Err(ConvexHullError::InconsistentHorizon);
        }

        for key in visible {
            if let Some(facet) = self.facets.remove(key) {
                for q in facet.conflicts {
                    if q != point {
                        remove_key(&mut self.point_conflicts[q], key);
                    }
                }
            }
        }
        for &key in &created {
            for &q in &self.facets[key].conflicts {
                self.point_conflicts[q].push(key);
            }
        }
        Ok(true)
    }
}

/// Convex hull of the stored points.
///
/// Insertion order is a shuffle seeded by the point count, so the result is
/// deterministic. Points inside the hull or exactly on its boundary are
/// skipped and reported with a warning.
pub(crate) fn compute_convex_hull(
    points: &PointStore,
    progress: Option<&dyn ProgressRatio>,
) -> Result<Vec<HullFacet>, ConvexHullError> {
    let dimension = points.dimension();
    if !(2..=MAX_PRACTICAL_DIMENSION_SIZE).contains(&dimension) {
        return Err(ConvexHullError::UnsupportedDimension { dimension });
    }
    let count = points.len();
    if count < dimension + 1 {
        return Err(ConvexHullError::InsufficientPoints { count, dimension });
    }

    let mut order: Vec<usize> = (0..count).collect();
    order.shuffle(&mut StdRng::seed_from_u64(count as u64));

    let simplex = find_initial_simplex(points, &order)?;
    let mut hull = IncrementalHull::new(points, &simplex)?;

    let mut skipped = 0usize;
    for (step, &point) in order.iter().enumerate() {
        if step & PROGRESS_INTERVAL == 0 {
            report(progress, step as u64, count as u64);
        }
        if simplex.contains(&point) {
            continue;
        }
        if !hull.insert(point)? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        warn!(skipped, dimension, "Convex hull: points inside or on the hull were skipped");
    }
    debug!(facets = hull.facets.len(), dimension, "Convex hull complete");

    Ok(hull
        .facets
        .into_iter()
        .map(|(_, facet)| {
            let corners = points.corners(&facet.vertices);
            HullFacet {
                normal: facet.ortho.unit_normal(),
                lower: facet.ortho.last_coordinate(&corners) == Orientation::NEGATIVE,
                vertices: facet.vertices,
            }
        })
        .collect())
}

/// Convex hull of `D`-dimensional points.
///
/// Normals are computed in the normalized grid frame, which differs from the
/// input frame only by a translation and a uniform scale.
///
/// # Errors
///
/// Returns a [`ConvexHullError`] for invalid or degenerate input.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::algorithms::convex_hull::convex_hull;
///
/// let square = [[0.0f32, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]];
/// let hull = convex_hull(&square, None).unwrap();
/// assert_eq!(hull.len(), 4);
/// assert!(hull.iter().all(|f| !f.vertices.contains(&4)));
/// ```
pub fn convex_hull<T: Float, const D: usize>(
    points: &[[T; D]],
    progress: Option<&dyn ProgressRatio>,
) -> Result<Vec<ConvexHullFacet<D>>, ConvexHullError> {
    if points.len() < D + 1 {
        return Err(ConvexHullError::InsufficientPoints {
            count: points.len(),
            dimension: D,
        });
    }
    let quantized = quantize_points(points)?;
    let store = PointStore::plain(&quantized);
    let facets = compute_convex_hull(&store, progress)?;
    Ok(facets
        .into_iter()
        .map(|f| ConvexHullFacet {
            vertices: std::array::from_fn(|i| f.vertices[i]),
            ortho: std::array::from_fn(|i| f.normal[i]),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::ridge::{RidgeMap, add_to_ridges};
    use crate::geometry::util::random_on_sphere;
    use approx::assert_relative_eq;

    // =============================================================================
    // PREPROCESSING TESTS
    // =============================================================================

    #[test]
    fn test_normalize_points_preserves_proportions() {
        let points = [[2.0f64, 1.0], [6.0, 1.0], [2.0, 3.0]];
        let normalized = normalize_points(&points).unwrap();
        assert_eq!(normalized, vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.5]]);
    }

    #[test]
    fn test_normalize_points_rejects_bad_input() {
        assert_eq!(
            normalize_points(&[[0.0f32, 0.0], [f32::NAN, 1.0]]),
            Err(ConvexHullError::NonFiniteInput { index: 1 })
        );
        assert_eq!(
            normalize_points(&[[1.0f32, 1.0], [1.0, 1.0]]),
            Err(ConvexHullError::AllPointsEqual)
        );
        assert_eq!(
            normalize_points(&[[0.0f64, 0.0], [1.0, 1.0], [0.0, 0.0]]),
            Err(ConvexHullError::DuplicatePoints { first: 0, second: 2 })
        );
    }

    #[test]
    fn test_normalize_points_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let points: Vec<[f64; 3]> = (0..100).map(|_| random_on_sphere(&mut rng)).collect();
        let normalized = normalize_points(&points).unwrap();
        assert_eq!(normalize_points(&normalized).unwrap(), normalized);
        assert_eq!(quantize_points(&normalized).unwrap(), quantize_points(&points).unwrap());
    }

    #[test]
    fn test_lifted_store_appends_squared_norm() {
        let store = PointStore::lifted(&[[2, 1], [4, 0]]);
        assert_eq!(store.dimension(), 3);
        assert_eq!(store.len(), 2);
        assert_eq!(store.point(0), &[2, 1, 5]);
        let normalized = store.normalized(1);
        assert_relative_eq!(normalized[0], 4.0 / GRID_SIZE);
        assert_relative_eq!(normalized[2], 16.0 / (GRID_SIZE * GRID_SIZE));
    }

    // =============================================================================
    // HULL TESTS
    // =============================================================================

    #[test]
    fn test_interior_points_are_not_hull_vertices() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut points: Vec<[f64; 3]> = (0..50).map(|_| random_on_sphere(&mut rng)).collect();
        points.extend((0..50).map(|_| random_on_sphere::<_, 3>(&mut rng).map(|x| x * 0.5)));
        let hull = convex_hull(&points, None).unwrap();
        assert_eq!(hull.len(), 2 * 50 - 4);
        assert!(hull.iter().all(|f| f.vertices.iter().all(|&v| v < 50)));
        for facet in &hull {
            assert_relative_eq!(squared_norm(&facet.ortho), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_hull_is_closed_and_outward() {
        let mut rng = StdRng::seed_from_u64(5);
        let points: Vec<[f64; 3]> = (0..300).map(|_| random_on_sphere(&mut rng)).collect();
        let hull = convex_hull(&points, None).unwrap();
        assert_eq!(hull.len(), 2 * 300 - 4);

        let mut ridges = RidgeMap::default();
        for (i, f) in hull.iter().enumerate() {
            add_to_ridges(&f.vertices, i, &mut ridges);
        }
        assert!(ridges.values().all(|facets| facets.len() == 2));

        let normalized = normalize_points(&points).unwrap();
        for facet in &hull {
            for (i, p) in normalized.iter().enumerate() {
                let v = &normalized[facet.vertices[0]];
                let d: f64 = (0..3).map(|k| facet.ortho[k] * (p[k] - v[k])).sum();
                assert!(d <= 1e-9, "point {i} is outside facet {facet:?}");
            }
        }
    }

    #[test]
    fn test_collinear_boundary_points_are_not_hull_vertices() {
        // Grid square with points on its edges and inside; only the corners
        // are strictly convex.
        let mut points: Vec<[f64; 2]> = vec![[0.0, 0.0], [8.0, 0.0], [8.0, 8.0], [0.0, 8.0]];
        for i in 1..8 {
            let t = f64::from(i);
            points.extend([[t, 0.0], [8.0, t], [t, 8.0], [0.0, t], [t, 4.0]]);
        }
        let hull = convex_hull(&points, None).unwrap();
        assert_eq!(hull.len(), 4);
        assert!(hull.iter().all(|f| f.vertices.iter().all(|&v| v < 4)));
    }

    #[test]
    fn test_lower_flag_of_lifted_hull() {
        // Lifted quad with its center: four lower triangles meet at the
        // center, the upper side is a two-triangle lid. One corner is moved
        // off the circle so the lid is not flat.
        let s = 1 << 20;
        let grid: [[i64; 2]; 5] = [[0, 0], [2 * s, 0], [2 * s + 1, 2 * s + 1], [0, 2 * s], [s, s]];
        let store = PointStore::lifted(&grid);
        let hull = compute_convex_hull(&store, None).unwrap();
        let lower: Vec<&HullFacet> = hull.iter().filter(|f| f.lower).collect();
        assert_eq!(lower.len(), 4);
        assert!(lower.iter().all(|f| f.vertices.contains(&4)));
        assert!(lower.iter().all(|f| f.normal[2] < 0.0));
        assert!(hull.iter().filter(|f| !f.lower).all(|f| !f.vertices.contains(&4)));
    }

    #[test]
    fn test_degenerate_input_reports_missing_simplex_vertex() {
        let collinear: Vec<[f64; 2]> = (0..10).map(|i| [f64::from(i), 2.0 * f64::from(i)]).collect();
        assert_eq!(
            convex_hull(&collinear, None),
            Err(ConvexHullError::SimplexNotFound {
                vertex: 2,
                dimension: 2
            })
        );
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            convex_hull(&[[0.0f64, 0.0, 0.0], [1.0, 0.0, 0.0]], None),
            Err(ConvexHullError::InsufficientPoints {
                count: 2,
                dimension: 3
            })
        );
    }

    macro_rules! gen_simplex_hull_tests {
        ($d:literal) => {
            pastey::paste! {
                #[test]
                fn [<test_simplex_hull_ $d d>]() {
                    let mut points = vec![[0.0f64; $d]];
                    for i in 0..$d {
                        let mut p = [0.0; $d];
                        p[i] = 1.0;
                        points.push(p);
                    }
                    let hull = convex_hull(&points, None).unwrap();
                    assert_eq!(hull.len(), $d + 1);
                }
            }
        };
    }

    gen_simplex_hull_tests!(2);
    gen_simplex_hull_tests!(3);
    gen_simplex_hull_tests!(4);
    gen_simplex_hull_tests!(5);
}
