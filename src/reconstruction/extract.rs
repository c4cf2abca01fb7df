//! Manifold extraction and orientation.
//!
//! The walk starts outside the convex hull and moves through Delaunay
//! objects, crossing only facets that are not candidates. Candidate facets it
//! runs into are kept and remember the side they were reached from; candidates
//! the walk never reaches, for example facets enclosed by a closed surface,
//! are dropped.

use tracing::debug;

use crate::core::collections::{MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer};
use crate::core::delaunay::DelaunayFacet;
use crate::geometry::util::{dot, facet_normal, scale};
use crate::reconstruction::error::ReconstructionError;
use crate::reconstruction::structure::ManifoldVertex;

/// Facets of one Delaunay object.
pub type ObjectFacets = SmallBuffer<usize, MAX_PRACTICAL_DIMENSION_SIZE>;

/// Where the walk came from when it reached a facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalkSide {
    /// Outside the convex hull.
    Outside,
    /// Inside the Delaunay object with this index.
    Object(usize),
}

/// Facets of every object, indexed by object.
#[must_use]
pub fn object_facets<const D: usize>(
    object_count: usize,
    facets: &[DelaunayFacet<D>],
) -> Vec<ObjectFacets> {
    let mut result = vec![ObjectFacets::new(); object_count];
    for (index, facet) in facets.iter().enumerate() {
        result[facet.first_object()].push(index);
        if let Some(second) = facet.second_object() {
            result[second].push(index);
        }
    }
    result
}

/// Keeps the candidate facets reachable from outside the hull.
///
/// Clears `cocone_facets[i]` for unreached candidates and returns, for every
/// kept facet, the side it was first reached from.
pub fn extract_manifold<const D: usize>(
    facets: &[DelaunayFacet<D>],
    object_facets: &[ObjectFacets],
    cocone_facets: &mut [bool],
) -> Vec<Option<WalkSide>> {
    debug_assert_eq!(facets.len(), cocone_facets.len());

    let mut reached: Vec<Option<WalkSide>> = vec![None; facets.len()];
    let mut visited = vec![false; object_facets.len()];

    let mut stack: Vec<(usize, WalkSide)> = Vec::new();
    for (index, facet) in facets.iter().enumerate().rev() {
        if !facet.one_sided() {
            continue;
        }
        if cocone_facets[index] {
            reached[index] = Some(WalkSide::Outside);
        } else {
            stack.push((index, WalkSide::Outside));
        }
    }

    while let Some((index, from)) = stack.pop() {
        if cocone_facets[index] {
            if reached[index].is_none() {
                reached[index] = Some(from);
            }
            continue;
        }

        let facet = &facets[index];
        let next = match from {
            WalkSide::Outside => Some(facet.first_object()),
            WalkSide::Object(o) if o == facet.first_object() => facet.second_object(),
            WalkSide::Object(_) => Some(facet.first_object()),
        };
        let Some(object) = next else {
            continue;
        };
        if visited[object] {
            continue;
        }
        visited[object] = true;

        for &other in object_facets[object].iter().rev() {
            if other != index {
                stack.push((other, WalkSide::Object(object)));
            }
        }
    }

    let mut dropped = 0usize;
    for (cocone, side) in cocone_facets.iter_mut().zip(&reached) {
        if *cocone && side.is_none() {
            *cocone = false;
            dropped += 1;
        }
    }
    debug!(
        visited_objects = visited.iter().filter(|&&v| v).count(),
        dropped,
        "Manifold extracted"
    );
    reached
}

/// Unit direction a facet's normal should take: towards the side it was
/// reached from.
fn desired_direction<const D: usize>(facet: &DelaunayFacet<D>, side: WalkSide) -> [f64; D] {
    match side {
        WalkSide::Object(o) if o == facet.first_object() => scale(facet.ortho(), -1.0),
        WalkSide::Outside | WalkSide::Object(_) => *facet.ortho(),
    }
}

/// Oriented output facets in facet index order and the per-point normals.
///
/// Each kept facet's vertex order is chosen so its [`facet_normal`] points to
/// the side it was reached from. A used point's normal is its positive pole,
/// flipped to agree with the oriented facets around it; unused points get a
/// zero normal.
///
/// # Errors
///
/// Returns [`ReconstructionError::NumericalFailure`] for a facet without a
/// well-defined normal.
pub fn create_normals_and_facets<const D: usize>(
    points: &[[f64; D]],
    facets: &[DelaunayFacet<D>],
    reached: &[Option<WalkSide>],
    vertex_data: &[ManifoldVertex<D>],
) -> Result<(Vec<[f64; D]>, Vec<[usize; D]>), ReconstructionError> {
    let mut normal_sums: Vec<Option<[f64; D]>> = vec![None; points.len()];
    let mut result_facets: Vec<[usize; D]> = Vec::new();

    for (facet, side) in facets.iter().zip(reached) {
        let Some(side) = *side else {
            continue;
        };
        let mut vertices = *facet.vertices();
        let corners: [[f64; D]; D] = std::array::from_fn(|i| points[vertices[i]]);
        let mut normal = facet_normal(&corners).map_err(|e| {
            ReconstructionError::numerical(format!("Facet {vertices:?} normal: {e}"))
        })?;
        if dot(&normal, &desired_direction(facet, side)) < 0.0 {
            vertices.swap(0, 1);
            normal = scale(&normal, -1.0);
        }

        for &v in &vertices {
            let sum = normal_sums[v].get_or_insert([0.0; D]);
            for (s, n) in sum.iter_mut().zip(&normal) {
                *s += n;
            }
        }
        result_facets.push(vertices);
    }

    let normals = normal_sums
        .iter()
        .zip(vertex_data)
        .map(|(sum, vertex)| match sum {
            None => [0.0; D],
            Some(sum) if dot(sum, &vertex.positive_norm) < 0.0 => {
                scale(&vertex.positive_norm, -1.0)
            }
            Some(_) => vertex.positive_norm,
        })
        .collect();

    debug!(facets = result_facets.len(), "Result created");
    Ok((normals, result_facets))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::delaunay::{compute_delaunay, create_delaunay_facets};
    use crate::geometry::util::{normalized, random_on_sphere, subtract};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn polygon(count: usize) -> Vec<[f64; 2]> {
        (0..count)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / count as f64;
                let r = 1.0 + 0.001 * (i % 2) as f64;
                [r * a.cos(), r * a.sin()]
            })
            .chain([[0.01, 0.02], [-0.3, 0.1]])
            .collect()
    }

    fn is_polygon_edge(vertices: &[usize; 2], count: usize) -> bool {
        let (a, b) = (vertices[0].min(vertices[1]), vertices[0].max(vertices[1]));
        b < count && (b - a == 1 || (a == 0 && b == count - 1))
    }

    // =============================================================================
    // WALK TESTS
    // =============================================================================

    #[test]
    fn test_object_facets_cover_each_object() {
        let points = polygon(12);
        let simplices = compute_delaunay(&points, None).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let by_object = object_facets(simplices.len(), &facets);
        assert!(by_object.iter().all(|f| f.len() == 3));
    }

    #[test]
    fn test_enclosed_candidates_are_dropped() {
        let count = 20;
        let points = polygon(count);
        let simplices = compute_delaunay(&points, None).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let by_object = object_facets(simplices.len(), &facets);

        // Polygon edges plus every edge of the inner point.
        let inner = count;
        let mut cocone: Vec<bool> = facets
            .iter()
            .map(|f| is_polygon_edge(f.vertices(), count) || f.vertices().contains(&inner))
            .collect();

        let reached = extract_manifold(&facets, &by_object, &mut cocone);
        for (i, f) in facets.iter().enumerate() {
            assert_eq!(cocone[i], is_polygon_edge(f.vertices(), count));
            assert_eq!(reached[i].is_some(), cocone[i]);
            if cocone[i] {
                assert_eq!(reached[i], Some(WalkSide::Outside));
            }
        }
    }

    #[test]
    fn test_walk_passes_through_open_curve() {
        let count = 20;
        let points = polygon(count);
        let simplices = compute_delaunay(&points, None).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let by_object = object_facets(simplices.len(), &facets);

        // Half of the polygon: the walk enters the hull through the other half.
        let mut cocone: Vec<bool> = facets
            .iter()
            .map(|f| is_polygon_edge(f.vertices(), count) && f.vertices().iter().all(|&v| v <= 10))
            .collect();
        let expected = cocone.clone();

        let reached = extract_manifold(&facets, &by_object, &mut cocone);
        assert_eq!(cocone, expected);
        assert!(reached.iter().flatten().all(|&s| s == WalkSide::Outside));
    }

    // =============================================================================
    // ORIENTATION TESTS
    // =============================================================================

    #[test]
    fn test_sphere_hull_is_oriented_outward() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut points: Vec<[f64; 3]> = (0..200).map(|_| random_on_sphere(&mut rng)).collect();
        points.push([0.05, -0.02, 0.01]);
        let simplices = compute_delaunay(&points, None).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let by_object = object_facets(simplices.len(), &facets);

        let mut cocone: Vec<bool> = facets.iter().map(DelaunayFacet::one_sided).collect();
        let reached = extract_manifold(&facets, &by_object, &mut cocone);

        // Poles pointing inward must come out flipped.
        let vertex_data: Vec<ManifoldVertex<3>> = points
            .iter()
            .map(|p| ManifoldVertex {
                positive_norm: scale(&normalized(p), -1.0),
                ..ManifoldVertex::default()
            })
            .collect();
        let (normals, result) =
            create_normals_and_facets(&points, &facets, &reached, &vertex_data).unwrap();

        assert_eq!(result.len(), 2 * 200 - 4);
        for f in &result {
            let corners = [points[f[0]], points[f[1]], points[f[2]]];
            let n = facet_normal(&corners).unwrap();
            assert!(dot(&n, &corners[0]) > 0.0);
        }
        for (p, n) in points.iter().zip(&normals).take(200) {
            assert!(dot(n, p) > 0.9);
        }
        assert_eq!(normals[200], [0.0; 3]);
    }

    #[test]
    fn test_polygon_orientation_is_consistent() {
        let count = 16;
        let points = polygon(count);
        let simplices = compute_delaunay(&points, None).unwrap();
        let facets = create_delaunay_facets(&simplices).unwrap();
        let by_object = object_facets(simplices.len(), &facets);

        let mut cocone: Vec<bool> = facets
            .iter()
            .map(|f| is_polygon_edge(f.vertices(), count))
            .collect();
        let reached = extract_manifold(&facets, &by_object, &mut cocone);
        let vertex_data = vec![ManifoldVertex::<2>::default(); points.len()];
        let (_, result) = create_normals_and_facets(&points, &facets, &reached, &vertex_data).unwrap();

        assert_eq!(result.len(), count);
        // Outward normals put the polygon in counterclockwise order.
        for f in &result {
            let edge = subtract(&points[f[1]], &points[f[0]]);
            let cross = points[f[0]][0].mul_add(edge[1], -(points[f[0]][1] * edge[0]));
            assert!(cross > 0.0);
        }
    }
}
