//! Exact orientation predicates for points on an integer grid.
//!
//! A hull facet in `N` dimensions has `N` vertices `v₀ … v_{N-1}`. Its
//! [`FacetOrtho`] holds the cofactors of the `(N-1) × N` matrix of edge
//! vectors `vᵢ - v₀`, so `ortho · (x - v₀)` equals the determinant of that
//! matrix with `x - v₀` appended as the last row. Signs are taken from an
//! `f64` evaluation when a forward error bound separates the value from zero,
//! and recomputed with [`BigInt`] otherwise. For integer coordinates below
//! `2^53` in magnitude every returned sign is exact.

use std::cell::OnceCell;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Zero};

use crate::core::collections::{CoordinateBuffer, MAX_PRACTICAL_DIMENSION_SIZE, SmallBuffer};

/// Represents the orientation of a point relative to an oriented hyperplane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The point is on the negative side (determinant < 0)
    NEGATIVE,
    /// The point is on the hyperplane (determinant = 0)
    DEGENERATE,
    /// The point is on the positive side (determinant > 0)
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

impl Orientation {
    /// The orientation seen from the other side of the hyperplane.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }

    const fn from_sign(sign: Sign) -> Self {
        match sign {
            Sign::Minus => Self::NEGATIVE,
            Sign::NoSign => Self::DEGENERATE,
            Sign::Plus => Self::POSITIVE,
        }
    }
}

/// Minors of the edge matrix, indexed by column bitmask. Inline for `N <= 5`.
type MinorTable = SmallBuffer<f64, 32>;

/// Relative forward error bound of the `f64` cofactor expansion.
#[inline]
fn error_factor(dimension: usize) -> f64 {
    let n = dimension as f64 + 1.0;
    4.0 * n * n * f64::EPSILON
}

/// Sign of `value` if it is certain given the absolute error `bound`.
#[inline]
fn filtered(value: f64, bound: f64, dimension: usize) -> Option<Orientation> {
    let tolerance = error_factor(dimension) * bound;
    if value > tolerance {
        Some(Orientation::POSITIVE)
    } else if value < -tolerance {
        Some(Orientation::NEGATIVE)
    } else {
        None
    }
}

/// `true` when an odd number of the columns in `mask` come after `column`.
#[inline]
const fn odd_after(mask: usize, column: usize) -> bool {
    (mask >> (column + 1)).count_ones() % 2 == 1
}

fn columns(mask: usize) -> impl Iterator<Item = usize> {
    let mut bits = mask;
    std::iter::from_fn(move || {
        if bits == 0 {
            return None;
        }
        let column = bits.trailing_zeros() as usize;
        bits &= bits - 1;
        Some(column)
    })
}

/// `f64` cofactors together with bounds on their absolute values, computed by
/// Laplace expansion over column subsets.
fn float_cofactors(corners: &[&[i64]]) -> (CoordinateBuffer, CoordinateBuffer) {
    let dimension = corners[0].len();
    let origin = corners[0];
    let full = (1usize << dimension) - 1;
    let mut minors: MinorTable = SmallBuffer::from_elem(0.0, full + 1);
    let mut bounds: MinorTable = SmallBuffer::from_elem(0.0, full + 1);
    minors[0] = 1.0;
    bounds[0] = 1.0;

    for mask in 1..full {
        let row = corners[mask.count_ones() as usize];
        let mut value = 0.0;
        let mut bound = 0.0;
        for column in columns(mask) {
            let entry = (row[column] - origin[column]) as f64;
            let rest = mask ^ (1 << column);
            if odd_after(mask, column) {
                value -= entry * minors[rest];
            } else {
                value += entry * minors[rest];
            }
            bound += entry.abs() * bounds[rest];
        }
        minors[mask] = value;
        bounds[mask] = bound;
    }

    let approx = (0..dimension)
        .map(|k| {
            let minor = minors[full ^ (1 << k)];
            if odd_after(full, k) { -minor } else { minor }
        })
        .collect();
    let bound = (0..dimension).map(|k| bounds[full ^ (1 << k)]).collect();
    (approx, bound)
}

/// The same expansion as [`float_cofactors`] in arbitrary precision.
fn exact_cofactors(corners: &[&[i64]]) -> Box<[BigInt]> {
    let dimension = corners[0].len();
    let origin = corners[0];
    let full = (1usize << dimension) - 1;
    let mut minors: Vec<BigInt> = vec![BigInt::zero(); full + 1];
    minors[0] = BigInt::one();

    for mask in 1..full {
        let row = corners[mask.count_ones() as usize];
        let mut value = BigInt::zero();
        for column in columns(mask) {
            let entry = BigInt::from(row[column] - origin[column]);
            let term = &minors[mask ^ (1 << column)] * &entry;
            if odd_after(mask, column) {
                value -= term;
            } else {
                value += term;
            }
        }
        minors[mask] = value;
    }

    (0..dimension)
        .map(|k| {
            let minor = &minors[full ^ (1 << k)];
            if odd_after(full, k) { -minor } else { minor.clone() }
        })
        .collect()
}

/// Oriented normal of the hyperplane through `N` integer points in `N`
/// dimensions.
///
/// The vertex coordinates are not stored; every query takes the same corner
/// slice the ortho was built from.
#[derive(Clone, Debug)]
pub(crate) struct FacetOrtho {
    approx: CoordinateBuffer,
    bound: CoordinateBuffer,
    exact: OnceCell<Box<[BigInt]>>,
    negated: bool,
}

impl FacetOrtho {
    /// Ortho of the hyperplane through `corners`, each a point with
    /// `corners.len()` coordinates.
    pub(crate) fn new(corners: &[&[i64]]) -> Self {
        debug_assert!((2..=MAX_PRACTICAL_DIMENSION_SIZE).contains(&corners.len()));
        debug_assert!(corners.iter().all(|c| c.len() == corners.len()));
        let (approx, bound) = float_cofactors(corners);
        Self {
            approx,
            bound,
            exact: OnceCell::new(),
            negated: false,
        }
    }

    /// Point the ortho the other way.
    pub(crate) fn negate(&mut self) {
        self.negated = !self.negated;
    }

    fn exact(&self, corners: &[&[i64]]) -> &[BigInt] {
        self.exact.get_or_init(|| exact_cofactors(corners))
    }

    const fn oriented(&self, orientation: Orientation) -> Orientation {
        if self.negated {
            orientation.reversed()
        } else {
            orientation
        }
    }

    /// Side of the hyperplane `point` lies on; `POSITIVE` is the side the
    /// ortho points to.
    pub(crate) fn orientation(&self, corners: &[&[i64]], point: &[i64]) -> Orientation {
        let origin = corners[0];
        let mut value = 0.0;
        let mut bound = 0.0;
        for k in 0..point.len() {
            let difference = (point[k] - origin[k]) as f64;
            value += self.approx[k] * difference;
            bound += self.bound[k] * difference.abs();
        }
        let orientation = filtered(value, bound, point.len()).unwrap_or_else(|| {
            let value: BigInt = self
                .exact(corners)
                .iter()
                .zip(point.iter().zip(origin))
                .map(|(c, (&p, &o))| c * BigInt::from(p - o))
                .sum();
            Orientation::from_sign(value.sign())
        });
        self.oriented(orientation)
    }

    /// Sign of the last ortho component.
    pub(crate) fn last_coordinate(&self, corners: &[&[i64]]) -> Orientation {
        let k = self.approx.len() - 1;
        let orientation = filtered(self.approx[k], self.bound[k], self.approx.len())
            .unwrap_or_else(|| Orientation::from_sign(self.exact(corners)[k].sign()));
        self.oriented(orientation)
    }

    /// The ortho scaled to unit length, in `f64`.
    pub(crate) fn unit_normal(&self) -> CoordinateBuffer {
        let norm = self.approx.iter().map(|x| x * x).sum::<f64>().sqrt();
        let scale = if self.negated { -norm.recip() } else { norm.recip() };
        self.approx.iter().map(|x| x * scale).collect()
    }
}
