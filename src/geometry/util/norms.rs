//! Vector norms and elementwise helpers.
//!
//! Slice-based functions work for both const-generic `[f64; D]` points and
//! runtime-dimension buffers; the array helpers return new arrays so callers
//! can stay in `[f64; D]` throughout the reconstruction code.

/// Dot product of two equally long vectors.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::dot;
///
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// ```
#[inline]
#[must_use]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Squared Euclidean norm.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::squared_norm;
///
/// assert_eq!(squared_norm(&[3.0, 4.0]), 25.0);
/// ```
#[inline]
#[must_use]
pub fn squared_norm(v: &[f64]) -> f64 {
    dot(v, v)
}

/// Euclidean norm with scaling to avoid overflow/underflow of the squares.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::hypot;
///
/// assert_eq!(hypot(&[3.0, 4.0]), 5.0);
/// assert_eq!(hypot(&[0.0, 0.0]), 0.0);
/// ```
#[must_use]
pub fn hypot(v: &[f64]) -> f64 {
    let max_abs = v.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if max_abs == 0.0 || !max_abs.is_finite() {
        return max_abs;
    }
    let sum: f64 = v
        .iter()
        .map(|x| {
            let s = x / max_abs;
            s * s
        })
        .sum();
    max_abs * sum.sqrt()
}

/// Returns `true` if every component is finite.
#[inline]
#[must_use]
pub fn is_finite_vector(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// `a - b` for fixed-size points.
#[inline]
#[must_use]
pub fn subtract<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|i| a[i] - b[i])
}

/// `a + b` for fixed-size points.
#[inline]
#[must_use]
pub fn add<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|i| a[i] + b[i])
}

/// `v * s` for fixed-size vectors.
#[inline]
#[must_use]
pub fn scale<const D: usize>(v: &[f64; D], s: f64) -> [f64; D] {
    std::array::from_fn(|i| v[i] * s)
}

/// Unit vector in the direction of `v`.
///
/// Like a plain division by the norm, a zero vector yields non-finite
/// components; callers check with [`is_finite_vector`] where that matters.
///
/// # Examples
///
/// ```rust
/// use cocone::geometry::util::{is_finite_vector, normalized};
///
/// assert_eq!(normalized(&[0.0, 3.0, 4.0]), [0.0, 0.6, 0.8]);
/// assert!(!is_finite_vector(&normalized(&[0.0, 0.0])));
/// ```
#[must_use]
pub fn normalized<const D: usize>(v: &[f64; D]) -> [f64; D] {
    let len = hypot(v);
    std::array::from_fn(|i| v[i] / len)
}

/// Normalize a runtime-dimension vector in place, returning its original length.
pub fn normalize_in_place(v: &mut [f64]) -> f64 {
    let len = hypot(v);
    for x in v.iter_mut() {
        *x /= len;
    }
    len
}
