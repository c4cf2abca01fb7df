//! Removal of cocone facets incident to sharp ridges.
//!
//! A ridge is sharp when all facets around it fit inside a wedge of less than
//! 90 degrees, or when only one facet is left on it. Removing the facets of a
//! sharp ridge may make neighbouring ridges sharp, so the ridges of removed
//! facets through the removed apex are checked again until nothing changes.
//! Ridges with a non-interior vertex are never sharp; they carry the boundary
//! of a bounded manifold.

use tracing::debug;

use crate::core::collections::{FastHashSet, SmallBuffer};
use crate::core::delaunay::DelaunayFacet;
use crate::core::ridge::{
    Ridge, RidgeFacet, RidgeMap, add_ridges_containing, add_to_ridges, remove_from_ridges,
};
use crate::geometry::util::{dot, normalize_in_place, subtract, unit_orthogonal_complement};
use crate::reconstruction::error::ReconstructionError;

/// Orthonormal basis `(e0, e1)` of the plane orthogonal to a ridge.
struct RidgeComplement<const D: usize> {
    e0: [f64; D],
    e1: [f64; D],
}

impl<const D: usize> RidgeComplement<D> {
    fn new(points: &[[f64; D]], ridge: &[usize], apex: usize) -> Result<Self, ReconstructionError> {
        let origin = &points[ridge[0]];
        let mut vectors: Vec<[f64; D]> = ridge[1..]
            .iter()
            .map(|&v| subtract(&points[v], origin))
            .collect();

        vectors.push(subtract(&points[apex], origin));
        let e0 = to_array(&unit_orthogonal_complement(&vectors).map_err(|e| {
            ReconstructionError::numerical(format!("Ridge complement failed: {e}"))
        })?);

        if let Some(last) = vectors.last_mut() {
            *last = e0;
        }
        let e1 = to_array(&unit_orthogonal_complement(&vectors).map_err(|e| {
            ReconstructionError::numerical(format!("Ridge complement failed: {e}"))
        })?);

        Ok(Self { e0, e1 })
    }

    /// Unit 2D direction of `v` in the ridge's complement plane.
    fn coordinates(&self, v: &[f64; D]) -> [f64; 2] {
        let mut c = [dot(&self.e0, v), dot(&self.e1, v)];
        normalize_in_place(&mut c);
        c
    }
}

fn to_array<const D: usize>(v: &[f64]) -> [f64; D] {
    std::array::from_fn(|i| v[i])
}

/// Smallest cosines on either side of the first facet, with their sines.
#[derive(Clone, Copy, Debug)]
struct Angles {
    cos_plus: f64,
    cos_minus: f64,
    sin_plus: f64,
    sin_minus: f64,
}

impl Default for Angles {
    fn default() -> Self {
        Self {
            cos_plus: 1.0,
            cos_minus: 1.0,
            sin_plus: 0.0,
            sin_minus: 0.0,
        }
    }
}

fn compute_angles<const D: usize>(
    points: &[[f64; D]],
    ridge: &Ridge,
    facets: &[RidgeFacet],
) -> Result<Angles, ReconstructionError> {
    let ridge = ridge.vertices();
    let origin = &points[ridge[0]];
    let basis = RidgeComplement::new(points, ridge, facets[0].point)?;

    let base = basis.coordinates(&subtract(&points[facets[0].point], origin));
    let mut angles = Angles::default();

    for facet in &facets[1..] {
        let v = basis.coordinates(&subtract(&points[facet.point], origin));
        if !(v[0].is_finite() && v[1].is_finite()) {
            return Err(ReconstructionError::numerical(
                "Ridge angle coordinates are not finite",
            ));
        }

        let sine = base[0].mul_add(v[1], -(base[1] * v[0]));
        let cosine = base[0].mul_add(v[0], base[1] * v[1]);

        if sine >= 0.0 {
            if cosine < angles.cos_plus {
                angles.cos_plus = cosine;
                angles.sin_plus = sine;
            }
        } else if cosine < angles.cos_minus {
            angles.cos_minus = cosine;
            angles.sin_minus = sine;
        }
    }

    Ok(angles)
}

fn boundary_ridge(interior_vertices: &[bool], ridge: &Ridge) -> bool {
    ridge.vertices().iter().any(|&v| !interior_vertices[v])
}

fn sharp_ridge<const D: usize>(
    points: &[[f64; D]],
    interior_vertices: &[bool],
    ridge: &Ridge,
    facets: &[RidgeFacet],
) -> Result<bool, ReconstructionError> {
    debug_assert!(!facets.is_empty());

    if boundary_ridge(interior_vertices, ridge) {
        return Ok(false);
    }
    if facets.len() == 1 {
        return Ok(true);
    }

    let angles = compute_angles(points, ridge, facets)?;

    // An angle of 90 degrees or more on either side.
    if angles.cos_plus <= 0.0 || angles.cos_minus <= 0.0 {
        return Ok(false);
    }

    // cos(a + b) with sin_minus < 0
    let cos_sum =
        angles.cos_plus * angles.cos_minus - (angles.sin_plus * angles.sin_minus).abs();
    Ok(cos_sum > 0.0)
}

/// One pass over the suspicious ridges. Returns the ridges to check next.
fn prune_pass<const D: usize>(
    points: &[[f64; D]],
    facets: &[DelaunayFacet<D>],
    interior_vertices: &[bool],
    suspicious: &[Ridge],
    cocone_facets: &mut [bool],
    ridge_map: &mut RidgeMap,
) -> Result<FastHashSet<Ridge>, ReconstructionError> {
    let mut next = FastHashSet::default();

    for ridge in suspicious {
        let Some(incident) = ridge_map.get(ridge) else {
            continue;
        };
        if !sharp_ridge(points, interior_vertices, ridge, incident)? {
            continue;
        }

        let removed: SmallBuffer<RidgeFacet, 2> = incident.clone();
        for rf in &removed {
            add_ridges_containing(facets[rf.facet].vertices(), rf.point, &mut next);
            cocone_facets[rf.facet] = false;
        }
        for rf in &removed {
            remove_from_ridges(facets[rf.facet].vertices(), rf.facet, ridge_map);
        }
    }

    Ok(next)
}

/// Clears `cocone_facets[i]` for every facet that is incident to a sharp ridge,
/// repeating until no sharp ridge remains.
///
/// `interior_vertices` marks the points whose ridges may be sharp; pass all
/// `true` for a closed manifold.
///
/// # Errors
///
/// Returns [`ReconstructionError::NumericalFailure`] if the plane around a
/// ridge cannot be constructed.
pub fn prune_facets_incident_to_sharp_ridges<const D: usize>(
    points: &[[f64; D]],
    facets: &[DelaunayFacet<D>],
    interior_vertices: &[bool],
    cocone_facets: &mut [bool],
) -> Result<(), ReconstructionError> {
    debug_assert_eq!(facets.len(), cocone_facets.len());
    debug_assert_eq!(points.len(), interior_vertices.len());

    let mut ridge_map = RidgeMap::default();
    for (i, facet) in facets.iter().enumerate() {
        if cocone_facets[i] {
            add_to_ridges(facet.vertices(), i, &mut ridge_map);
        }
    }

    let mut suspicious: Vec<Ridge> = ridge_map.keys().cloned().collect();
    let mut passes = 0usize;
    while !suspicious.is_empty() {
        // Deterministic order.
        suspicious.sort_unstable();
        let next = prune_pass(
            points,
            facets,
            interior_vertices,
            &suspicious,
            cocone_facets,
            &mut ridge_map,
        )?;
        suspicious = next.into_iter().collect();
        passes += 1;
    }

    debug!(
        passes,
        remaining = cocone_facets.iter().filter(|&&c| c).count(),
        "Sharp ridge pruning finished"
    );
    Ok(())
}
