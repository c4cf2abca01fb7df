//! Per-sample Voronoi data: poles, cell height and radius, cocone flags.
//!
//! For every sample point this module computes the positive pole direction
//! and marks, for every Delaunay facet around the point, whether the facet's
//! dual Voronoi edge meets the point's cocone. With full data it also
//! measures the Voronoi cell: its height (distance to the negative pole) and
//! its radius (largest distance to the cell inside the cocone), and collects
//! the cocone neighbours used by BoundCocone.

use tracing::debug;

use crate::core::delaunay::{DelaunayFacet, DelaunayObject};
use crate::geometry::util::{dot, hypot, is_finite_vector, normalized, subtract};
use crate::reconstruction::cocone_geometry::{
    cocone_inside_or_equal, intersect_cocone, voronoi_edge_intersects_cocone,
};
use crate::reconstruction::error::ReconstructionError;

/// Voronoi data of one sample point.
///
/// Points that did not become Delaunay vertices have all-zero data.
#[derive(Clone, Debug, PartialEq)]
pub struct ManifoldVertex<const D: usize> {
    /// Unit positive pole direction.
    pub positive_norm: [f64; D],
    /// Length of the negative pole vector.
    pub height: f64,
    /// Largest distance from the point to its Voronoi cell within the cocone.
    pub radius: f64,
    /// Sorted points sharing a facet whose dual edge meets this point's cocone
    /// and theirs.
    pub cocone_neighbors: Vec<usize>,
}

impl<const D: usize> Default for ManifoldVertex<D> {
    fn default() -> Self {
        Self {
            positive_norm: [0.0; D],
            height: 0.0,
            radius: 0.0,
            cocone_neighbors: Vec::new(),
        }
    }
}

/// Cocone flags of one Delaunay facet, one per facet vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManifoldFacet<const D: usize> {
    /// `cocone_vertex[i]` is set when the dual Voronoi edge meets the cocone of
    /// the facet's vertex `i`.
    pub cocone_vertex: [bool; D],
}

impl<const D: usize> Default for ManifoldFacet<D> {
    fn default() -> Self {
        Self {
            cocone_vertex: [false; D],
        }
    }
}

impl<const D: usize> ManifoldFacet<D> {
    /// `true` when the facet is in the cocone of all its vertices.
    #[inline]
    #[must_use]
    pub fn all_cocone(&self) -> bool {
        self.cocone_vertex.iter().all(|&c| c)
    }
}

#[derive(Clone, Copy, Debug)]
struct VertexFacet {
    facet: usize,
    local: usize,
}

/// Objects and facets incident to one point.
#[derive(Clone, Debug, Default)]
struct VertexConnections {
    objects: Vec<usize>,
    facets: Vec<VertexFacet>,
}

fn vertex_connections<const D: usize>(
    point_count: usize,
    objects: &[DelaunayObject<D>],
    facets: &[DelaunayFacet<D>],
) -> Vec<VertexConnections> {
    let mut connections = vec![VertexConnections::default(); point_count];
    for (facet, f) in facets.iter().enumerate() {
        for (local, &v) in f.vertices().iter().enumerate() {
            connections[v].facets.push(VertexFacet { facet, local });
        }
    }
    for (object, o) in objects.iter().enumerate() {
        for &v in o.simplex().vertices() {
            connections[v].objects.push(object);
        }
    }
    connections
}

/// Positive pole direction.
///
/// On the convex hull the pole is the normalized sum of the outward normals
/// of the incident one-sided facets; elsewhere it points to the farthest
/// Voronoi vertex of the cell.
fn voronoi_positive_norm<const D: usize>(
    vertex: usize,
    point: &[f64; D],
    objects: &[DelaunayObject<D>],
    facets: &[DelaunayFacet<D>],
    connections: &VertexConnections,
) -> Result<[f64; D], ReconstructionError> {
    let mut hull_sum: Option<[f64; D]> = None;
    for vf in &connections.facets {
        let facet = &facets[vf.facet];
        if facet.one_sided() {
            let sum = hull_sum.get_or_insert([0.0; D]);
            for (s, o) in sum.iter_mut().zip(facet.ortho()) {
                *s += o;
            }
        }
    }

    let direction = match hull_sum {
        Some(sum) => sum,
        None => {
            let farthest = connections
                .objects
                .iter()
                .map(|&o| subtract(objects[o].voronoi_vertex(), point))
                .max_by(|a, b| dot(a, a).total_cmp(&dot(b, b)));
            farthest.ok_or_else(|| {
                ReconstructionError::numerical(format!(
                    "Vertex {vertex} has too few Delaunay simplices in its vicinity"
                ))
            })?
        }
    };

    let positive_norm = normalized(&direction);
    if !is_finite_vector(&positive_norm) {
        return Err(ReconstructionError::numerical("Positive pole vector not finite"));
    }
    Ok(positive_norm)
}

/// Length of the negative pole: the farthest Voronoi vertex on the side
/// opposite the positive pole.
fn voronoi_height<const D: usize>(
    point: &[f64; D],
    objects: &[DelaunayObject<D>],
    positive_norm: &[f64; D],
    connections: &VertexConnections,
) -> Result<f64, ReconstructionError> {
    let max_distance = connections
        .objects
        .iter()
        .map(|&o| subtract(objects[o].voronoi_vertex(), point))
        .filter(|vp| dot(vp, positive_norm) < 0.0)
        .map(|vp| dot(&vp, &vp))
        .reduce(f64::max)
        .ok_or_else(|| ReconstructionError::numerical("Negative pole vector not found"))?;

    let height = max_distance.sqrt();
    if !height.is_finite() {
        return Err(ReconstructionError::numerical("Negative pole vector not finite"));
    }
    Ok(height)
}

/// Vectors from the sample to the two ends of a facet's Voronoi edge.
struct VoronoiEdge<const D: usize> {
    pa: [f64; D],
    pa_length: f64,
    pb_length: f64,
    cos_n_a: f64,
    cos_n_b: f64,
    /// Direction from the first end to the second; the outward normal for rays.
    a_to_b: [f64; D],
    ray: bool,
}

impl<const D: usize> VoronoiEdge<D> {
    fn new(
        point: &[f64; D],
        facet: &DelaunayFacet<D>,
        objects: &[DelaunayObject<D>],
        positive_norm: &[f64; D],
    ) -> Self {
        let a = objects[facet.first_object()].voronoi_vertex();
        let pa = subtract(a, point);
        let pa_length = hypot(&pa);
        let cos_n_a = dot(positive_norm, &pa) / pa_length;

        match facet.second_object() {
            None => Self {
                pa,
                pa_length,
                pb_length: 0.0,
                cos_n_a,
                cos_n_b: dot(positive_norm, facet.ortho()),
                a_to_b: *facet.ortho(),
                ray: true,
            },
            Some(second) => {
                let b = objects[second].voronoi_vertex();
                let pb = subtract(b, point);
                let pb_length = hypot(&pb);
                Self {
                    pa,
                    pa_length,
                    pb_length,
                    cos_n_a,
                    cos_n_b: dot(positive_norm, &pb) / pb_length,
                    a_to_b: subtract(b, a),
                    ray: false,
                }
            }
        }
    }

    /// Largest distance from the sample to the part of this edge inside the
    /// cocone.
    fn radius(&self, positive_norm: &[f64; D]) -> Result<f64, ReconstructionError> {
        let a_inside = cocone_inside_or_equal(self.cos_n_a);
        let b_inside = cocone_inside_or_equal(self.cos_n_b);

        if self.ray && b_inside {
            return Ok(f64::MAX);
        }
        if !self.ray && a_inside && b_inside {
            return Ok(self.pa_length.max(self.pb_length));
        }

        let t_max = if self.ray { f64::INFINITY } else { 1.0 };
        let distance = match intersect_cocone(positive_norm, &self.pa, &self.a_to_b, t_max) {
            Some(distance) => distance,
            None => {
                // The edge passes through the sample point along the pole line.
                let cos_a_ab = dot(&self.pa, &self.a_to_b) / (self.pa_length * hypot(&self.a_to_b));
                if self.cos_n_a.abs() > 0.99 && cos_a_ab < -0.9999 {
                    0.0
                } else {
                    let side = if self.cos_n_a.abs() > 0.99 { "close to" } else { "far from" };
                    return Err(ReconstructionError::numerical(format!(
                        "Cocone intersection not found, PA is {side} positive pole"
                    )));
                }
            }
        };
        if !distance.is_finite() {
            return Err(ReconstructionError::numerical("Cocone intersection distance is not finite"));
        }

        let mut radius = distance;
        if a_inside {
            radius = radius.max(self.pa_length);
        }
        if !self.ray && b_inside {
            radius = radius.max(self.pb_length);
        }
        Ok(radius)
    }
}

/// Marks the cocone facets of one vertex and returns its Voronoi radius when
/// requested.
fn cocone_facets_and_voronoi_radius<const D: usize>(
    point: &[f64; D],
    objects: &[DelaunayObject<D>],
    facets: &[DelaunayFacet<D>],
    positive_norm: &[f64; D],
    connections: &VertexConnections,
    find_radius: bool,
    facet_data: &mut [ManifoldFacet<D>],
) -> Result<f64, ReconstructionError> {
    let mut radius = 0.0f64;
    for vf in &connections.facets {
        let facet = &facets[vf.facet];
        let edge = VoronoiEdge::new(point, facet, objects, positive_norm);
        if !voronoi_edge_intersects_cocone(edge.cos_n_a, edge.cos_n_b) {
            continue;
        }
        facet_data[vf.facet].cocone_vertex[vf.local] = true;

        if find_radius && radius != f64::MAX {
            radius = radius.max(edge.radius(positive_norm)?);
        }
    }
    Ok(radius)
}

fn cocone_neighbors<const D: usize>(
    vertex: usize,
    facets: &[DelaunayFacet<D>],
    facet_data: &[ManifoldFacet<D>],
    connections: &VertexConnections,
) -> Vec<usize> {
    let mut neighbors: Vec<usize> = Vec::new();
    for vf in &connections.facets {
        let facet = &facets[vf.facet];
        for (local, &v) in facet.vertices().iter().enumerate() {
            if local == vf.local {
                debug_assert_eq!(v, vertex);
                continue;
            }
            if facet_data[vf.facet].cocone_vertex[local] {
                neighbors.push(v);
            }
        }
    }
    neighbors.sort_unstable();
    neighbors.dedup();
    neighbors
}

/// Vertex and facet data for all points.
///
/// With `find_all_vertex_data` unset only the poles and the cocone flags are
/// computed, which is all Cocone needs.
///
/// # Errors
///
/// Returns [`ReconstructionError::NumericalFailure`] if a pole, height or
/// radius cannot be computed.
pub fn vertex_and_facet_data<const D: usize>(
    find_all_vertex_data: bool,
    points: &[[f64; D]],
    objects: &[DelaunayObject<D>],
    facets: &[DelaunayFacet<D>],
) -> Result<(Vec<ManifoldVertex<D>>, Vec<ManifoldFacet<D>>), ReconstructionError> {
    let connections = vertex_connections(points.len(), objects, facets);
    let mut vertex_data: Vec<ManifoldVertex<D>> = Vec::with_capacity(points.len());
    let mut facet_data = vec![ManifoldFacet::default(); facets.len()];

    let mut unused = 0usize;
    for (v, point) in points.iter().enumerate() {
        let connection = &connections[v];
        if connection.facets.is_empty() && connection.objects.is_empty() {
            // The hull may skip points that are too close to others.
            unused += 1;
            vertex_data.push(ManifoldVertex::default());
            continue;
        }

        let positive_norm = voronoi_positive_norm(v, point, objects, facets, connection)?;
        if find_all_vertex_data {
            let height = voronoi_height(point, objects, &positive_norm, connection)?;
            let radius = cocone_facets_and_voronoi_radius(
                point,
                objects,
                facets,
                &positive_norm,
                connection,
                true,
                &mut facet_data,
            )?;
            vertex_data.push(ManifoldVertex {
                positive_norm,
                height,
                radius,
                cocone_neighbors: Vec::new(),
            });
        } else {
            cocone_facets_and_voronoi_radius(
                point,
                objects,
                facets,
                &positive_norm,
                connection,
                false,
                &mut facet_data,
            )?;
            vertex_data.push(ManifoldVertex {
                positive_norm,
                ..ManifoldVertex::default()
            });
        }
    }

    if find_all_vertex_data {
        for (v, data) in vertex_data.iter_mut().enumerate() {
            data.cocone_neighbors = cocone_neighbors(v, facets, &facet_data, &connections[v]);
        }
    }

    debug!(points = points.len(), unused, "Vertex data computed");
    Ok((vertex_data, facet_data))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::delaunay::{compute_delaunay, create_delaunay_facets, create_delaunay_objects};
    use approx::assert_relative_eq;

    fn circle(count: usize) -> Vec<[f64; 2]> {
        (0..count)
            .map(|i| {
                let angle = std::f64::consts::TAU * i as f64 / count as f64 + 0.01 * (i % 3) as f64;
                let r = 1.0 + 0.0005 * (i % 2) as f64;
                [r * angle.cos(), r * angle.sin()]
            })
            .collect()
    }

    #[test]
    fn test_poles_are_radial_on_a_circle() {
        let points = circle(60);
        let simplices = compute_delaunay(&points, None).unwrap();
        let objects = create_delaunay_objects(&points, &simplices).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let (vertices, facet_data) = vertex_and_facet_data(true, &points, &objects, &facets).unwrap();

        for (p, data) in points.iter().zip(&vertices) {
            let radial = normalized(p);
            assert!(dot(&radial, &data.positive_norm).abs() > 0.9);
            assert!(data.height > 0.0);
            assert!(data.radius > 0.0);
            assert!(data.radius <= 0.3 * data.height);
            assert_eq!(data.cocone_neighbors.len(), 2);
        }

        // Circle edges are exactly the facets in the cocone of both endpoints.
        let cocone = facet_data.iter().filter(|f| f.all_cocone()).count();
        assert_eq!(cocone, 60);
    }

    #[test]
    fn test_cocone_only_data_has_no_cell_measures() {
        let points = circle(40);
        let simplices = compute_delaunay(&points, None).unwrap();
        let objects = create_delaunay_objects(&points, &simplices).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let (vertices, _) = vertex_and_facet_data(false, &points, &objects, &facets).unwrap();
        for data in &vertices {
            assert_eq!(data.height, 0.0);
            assert_eq!(data.radius, 0.0);
            assert!(data.cocone_neighbors.is_empty());
            assert_relative_eq!(hypot(&data.positive_norm), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_default_vertex_has_zero_data() {
        let vertex = ManifoldVertex::<4>::default();
        assert_eq!(vertex.positive_norm, [0.0; 4]);
        assert_eq!(vertex.height, 0.0);
        assert_eq!(vertex.radius, 0.0);
        assert!(vertex.cocone_neighbors.is_empty());
        assert_eq!(vertex, ManifoldVertex::<4>::default());
    }
}
