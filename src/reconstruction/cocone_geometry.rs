//! Cocone predicates.
//!
//! The cocone of a sample point `p` with unit pole direction `n` is the set of
//! points `x` whose direction `x - p` makes an angle of at least `3π/8` with the
//! line through `n`. Vectors are classified by the cosine of their angle with
//! `n`: `|cos| ≤ cos(3π/8)` is inside the cocone.

use crate::geometry::util::{dot, hypot};

/// `cos(3π/8)`.
pub const COCONE_COS: f64 = 0.382_683_432_365_089_8;

const LINEAR_EPSILON: f64 = 1e-12;
const ROOT_EPSILON: f64 = 1e-9;

/// Returns `true` if a vector at the given cosine to the pole lies inside or on
/// the boundary of the cocone.
///
/// # Examples
///
/// ```rust
/// use cocone::reconstruction::cocone_geometry::{cocone_inside_or_equal, COCONE_COS};
///
/// assert!(cocone_inside_or_equal(0.0));
/// assert!(cocone_inside_or_equal(-COCONE_COS));
/// assert!(!cocone_inside_or_equal(0.9));
/// ```
#[inline]
#[must_use]
pub fn cocone_inside_or_equal(cos: f64) -> bool {
    cos.abs() <= COCONE_COS
}

/// Returns `true` if the Voronoi edge between the endpoints at cosines
/// `cos_a` and `cos_b` meets the cocone.
///
/// An endpoint inside is enough. With both endpoints outside, the edge misses
/// the cocone when both lie in the same nappe of the double cone and crosses
/// it when they lie in opposite nappes.
///
/// # Examples
///
/// ```rust
/// use cocone::reconstruction::cocone_geometry::voronoi_edge_intersects_cocone;
///
/// assert!(voronoi_edge_intersects_cocone(0.1, 0.95));
/// assert!(!voronoi_edge_intersects_cocone(0.9, 0.95));
/// assert!(voronoi_edge_intersects_cocone(0.9, -0.95));
/// ```
#[must_use]
pub fn voronoi_edge_intersects_cocone(cos_a: f64, cos_b: f64) -> bool {
    if cocone_inside_or_equal(cos_a) || cocone_inside_or_equal(cos_b) {
        return true;
    }
    !((cos_a > COCONE_COS && cos_b > COCONE_COS) || (cos_a < -COCONE_COS && cos_b < -COCONE_COS))
}

/// Largest distance from the sample to a point where `a + t·d`, `t ∈ [0, t_max]`,
/// crosses the cocone boundary.
///
/// `a` is measured from the sample point and `normal` is the unit pole
/// direction. Returns `None` if the line does not cross the boundary in range.
///
/// # Examples
///
/// ```rust
/// use cocone::reconstruction::cocone_geometry::{intersect_cocone, COCONE_COS};
///
/// // A vertical segment from (1, -1) to (1, 1) against the pole (0, 1).
/// let d = intersect_cocone(&[0.0, 1.0], &[1.0, -1.0], &[0.0, 2.0], 1.0).unwrap();
/// let expected = 1.0 / (1.0 - COCONE_COS * COCONE_COS).sqrt();
/// assert!((d - expected).abs() < 1e-12);
/// ```
#[must_use]
pub fn intersect_cocone<const D: usize>(
    normal: &[f64; D],
    a: &[f64; D],
    d: &[f64; D],
    t_max: f64,
) -> Option<f64> {
    let c2 = COCONE_COS * COCONE_COS;
    let an = dot(a, normal);
    let dn = dot(d, normal);
    let aa = dot(a, a);
    let ad = dot(a, d);
    let dd = dot(d, d);

    // (n·(a + td))² = c²|a + td|²
    let qa = dn.mul_add(dn, -c2 * dd);
    let qb = 2.0 * an.mul_add(dn, -c2 * ad);
    let qc = an.mul_add(an, -c2 * aa);

    let mut roots = [f64::NAN; 2];
    if qa.abs() <= LINEAR_EPSILON * dd {
        if qb != 0.0 {
            roots[0] = -qc / qb;
        }
    } else {
        let discriminant = qb.mul_add(qb, -4.0 * qa * qc);
        if discriminant < 0.0 {
            return None;
        }
        let sqrt = discriminant.sqrt();
        roots[0] = (-qb + sqrt) / (2.0 * qa);
        roots[1] = (-qb - sqrt) / (2.0 * qa);
    }

    let tolerance = ROOT_EPSILON * t_max.min(1.0);
    roots
        .into_iter()
        .filter(|t| t.is_finite() && *t >= -tolerance && *t <= t_max + tolerance)
        .map(|t| {
            let t = t.clamp(0.0, t_max);
            let x: [f64; D] = std::array::from_fn(|i| d[i].mul_add(t, a[i]));
            hypot(&x)
        })
        .reduce(f64::max)
}
