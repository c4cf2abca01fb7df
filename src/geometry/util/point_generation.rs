//! Deterministic point samples for testing and benchmarking reconstruction.
//!
//! The reference shape is the unit sphere with a "notch": the upper half is
//! pushed down near the pole, which gives the surface a region of higher
//! curvature. The bounded variant removes a cap around the lower pole so the
//! sample comes from a surface with boundary.

use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Points with `dot(p, last_axis)` below this value are dropped from bounded samples.
pub const BOUNDED_SPHERE_CUTOFF: f64 = -0.3;

/// Errors from point generation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RandomPointGenerationError {
    /// A sphere sample needs at least two dimensions.
    #[error("Cannot sample a sphere in {dimension} dimensions")]
    InvalidDimension {
        /// Requested dimension.
        dimension: usize,
    },
}

/// Uniform random point on the unit sphere `S^(D-1)`.
///
/// Uses rejection sampling in the unit ball followed by projection.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::random_on_sphere;
/// use rand::SeedableRng;
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let p: [f64; 3] = random_on_sphere(&mut rng);
/// let len: f64 = p.iter().map(|x| x * x).sum::<f64>().sqrt();
/// assert!((len - 1.0).abs() < 1e-12);
/// ```
pub fn random_on_sphere<R: Rng + ?Sized, const D: usize>(rng: &mut R) -> [f64; D] {
    loop {
        let v: [f64; D] = std::array::from_fn(|_| rng.random_range(-1.0..1.0));
        let length_squared: f64 = v.iter().map(|x| x * x).sum();
        if length_squared > 0.01 && length_squared <= 1.0 {
            let length = length_squared.sqrt();
            return v.map(|x| x / length);
        }
    }
}

/// Sample `count` points from the notched unit sphere in `D` dimensions.
///
/// The generator is seeded with `count`, so the same call always returns the
/// same points. With `bounded`, points whose last coordinate is below
/// [`BOUNDED_SPHERE_CUTOFF`] are rejected and resampled.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidDimension`] for `D < 2`.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::generate_sphere_with_notch;
///
/// let a = generate_sphere_with_notch::<3>(100, false).unwrap();
/// let b = generate_sphere_with_notch::<3>(100, false).unwrap();
/// assert_eq!(a.len(), 100);
/// assert_eq!(a, b);
/// ```
pub fn generate_sphere_with_notch<const D: usize>(
    count: usize,
    bounded: bool,
) -> Result<Vec<[f32; D]>, RandomPointGenerationError> {
    if D < 2 {
        return Err(RandomPointGenerationError::InvalidDimension { dimension: D });
    }

    let mut rng = StdRng::seed_from_u64(count as u64);
    let mut points = Vec::with_capacity(count);
    while points.len() < count {
        let mut v: [f64; D] = random_on_sphere(&mut rng);
        let height = v[D - 1];
        if bounded && height < BOUNDED_SPHERE_CUTOFF {
            continue;
        }
        if height > 0.0 {
            v[D - 1] *= 1.0 - (0.5 * height.powi(5)).abs();
        }
        points.push(v.map(|x| x as f32));
    }
    Ok(points)
}

/// Replicate a point set into `1 + 2^D` separated copies.
///
/// The original points come first, followed by one copy translated by
/// `(±shift, …, ±shift)` for every sign combination. With a shift larger than
/// the object's diameter the copies are pairwise disjoint.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::clone_object;
///
/// let copies = clone_object(&[[0.0f32, 0.0]], 3.0);
/// assert_eq!(copies.len(), 5);
/// assert!(copies.contains(&[-3.0, 3.0]));
/// ```
#[must_use]
pub fn clone_object<T: Float, const D: usize>(points: &[[T; D]], shift: T) -> Vec<[T; D]> {
    let copies = 1usize << D;
    let mut result = Vec::with_capacity(points.len() * (copies + 1));
    result.extend_from_slice(points);
    for mask in 0..copies {
        let offset: [T; D] =
            std::array::from_fn(|i| if mask & (1 << i) == 0 { -shift } else { shift });
        result.extend(
            points
                .iter()
                .map(|p| std::array::from_fn(|i| p[i] + offset[i])),
        );
    }
    result
}
