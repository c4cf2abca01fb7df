//! Canonical ridge identifiers and ridge-to-facet incidence maps.
//!
//! A ridge is an `(N-1)`-subset of a facet's `N` vertices. Ridges are not
//! stored explicitly; they are derived from facets and used as hash keys when
//! facets need to find their neighbours, for example while pruning sharp
//! edges from the cocone complex or when checking manifoldness.
//!
//! ## Canonical form
//!
//! A [`Ridge`] stores its vertex indices sorted ascending, so the same subset
//! reached from different facets compares and hashes equal.

use crate::core::collections::{FastHashMap, FastHashSet, SmallBuffer, VertexBuffer};

/// Canonical identifier for a ridge.
///
/// # Examples
///
/// ```rust
/// use cocone::core::ridge::Ridge;
///
/// let a = Ridge::new([4, 1, 7]);
/// let b = Ridge::new([7, 4, 1]);
/// assert_eq!(a, b);
/// assert_eq!(a.vertices(), &[1, 4, 7]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ridge {
    vertices: VertexBuffer,
}

impl Ridge {
    /// Creates a ridge from any order of its vertices.
    #[must_use]
    pub fn new(vertices: impl IntoIterator<Item = usize>) -> Self {
        let mut vertices: VertexBuffer = vertices.into_iter().collect();
        vertices.sort_unstable();
        Self { vertices }
    }

    /// The ridge of `facet` that omits the vertex at local index `skip`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cocone::core::ridge::Ridge;
    ///
    /// let ridge = Ridge::opposite(&[3, 9, 5], 1);
    /// assert_eq!(ridge.vertices(), &[3, 5]);
    /// ```
    #[must_use]
    pub fn opposite(facet: &[usize], skip: usize) -> Self {
        Self::new(
            facet
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != skip)
                .map(|(_, &v)| v),
        )
    }

    /// Sorted vertex indices.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Returns `true` if `vertex` belongs to this ridge.
    #[inline]
    #[must_use]
    pub fn contains(&self, vertex: usize) -> bool {
        self.vertices.binary_search(&vertex).is_ok()
    }
}

/// One facet incident to a ridge, with the facet vertex not on the ridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RidgeFacet {
    /// Index of the facet in the caller's facet array.
    pub facet: usize,
    /// The facet's vertex opposite the ridge.
    pub point: usize,
}

/// Incident facets per ridge. Two facets per ridge is the manifold case.
pub type RidgeMap = FastHashMap<Ridge, SmallBuffer<RidgeFacet, 2>>;

/// Register every ridge of `vertices` as incident to facet number `facet`.
///
/// # Examples
///
/// ```rust
/// use cocone::core::ridge::{add_to_ridges, Ridge, RidgeMap};
///
/// let mut map = RidgeMap::default();
/// add_to_ridges(&[0, 1, 2], 0, &mut map);
/// add_to_ridges(&[1, 2, 3], 1, &mut map);
/// assert_eq!(map.len(), 5);
/// assert_eq!(map[&Ridge::new([1, 2])].len(), 2);
/// ```
pub fn add_to_ridges(vertices: &[usize], facet: usize, map: &mut RidgeMap) {
    for (skip, &point) in vertices.iter().enumerate() {
        map.entry(Ridge::opposite(vertices, skip))
            .or_default()
            .push(RidgeFacet { facet, point });
    }
}

/// Remove facet number `facet` from all of its ridges, dropping ridges that
/// end up with no incident facets.
pub fn remove_from_ridges(vertices: &[usize], facet: usize, map: &mut RidgeMap) {
    for skip in 0..vertices.len() {
        let ridge = Ridge::opposite(vertices, skip);
        let Some(facets) = map.get_mut(&ridge) else {
            continue;
        };
        facets.retain(|f| f.facet != facet);
        if facets.is_empty() {
            map.remove(&ridge);
        }
    }
}

/// Insert into `set` every ridge of `vertices` that contains `point`.
pub fn add_ridges_containing(vertices: &[usize], point: usize, set: &mut FastHashSet<Ridge>) {
    for (skip, &vertex) in vertices.iter().enumerate() {
        if vertex != point {
            set.insert(Ridge::opposite(vertices, skip));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================================
    // RIDGE KEY TESTS
    // =============================================================================

    #[test]
    fn test_ridge_is_order_independent() {
        assert_eq!(Ridge::new([2, 0]), Ridge::new([0, 2]));
        assert_eq!(Ridge::opposite(&[5, 1, 3, 2], 0), Ridge::new([1, 2, 3]));
        assert!(Ridge::new([1, 2, 3]).contains(2));
        assert!(!Ridge::new([1, 2, 3]).contains(4));
    }

    // =============================================================================
    // RIDGE MAP TESTS
    // =============================================================================

    #[test]
    fn test_tetrahedron_boundary_has_two_facets_per_ridge() {
        let facets = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        let mut map = RidgeMap::default();
        for (i, f) in facets.iter().enumerate() {
            add_to_ridges(f, i, &mut map);
        }
        assert_eq!(map.len(), 6);
        assert!(map.values().all(|f| f.len() == 2));

        let edge = &map[&Ridge::new([0, 1])];
        let mut opposite: Vec<usize> = edge.iter().map(|f| f.point).collect();
        opposite.sort_unstable();
        assert_eq!(opposite, vec![2, 3]);
    }

    #[test]
    fn test_remove_from_ridges_drops_empty_entries() {
        let mut map = RidgeMap::default();
        add_to_ridges(&[0, 1, 2], 0, &mut map);
        add_to_ridges(&[1, 2, 3], 1, &mut map);
        remove_from_ridges(&[0, 1, 2], 0, &mut map);
        assert_eq!(map.len(), 3);
        assert_eq!(
            map[&Ridge::new([1, 2])].as_slice(),
            &[RidgeFacet { facet: 1, point: 3 }]
        );
        remove_from_ridges(&[1, 2, 3], 1, &mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn test_add_ridges_containing_skips_opposite_ridge() {
        let mut set = FastHashSet::default();
        add_ridges_containing(&[4, 5, 6], 5, &mut set);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Ridge::new([4, 5])));
        assert!(set.contains(&Ridge::new([5, 6])));
    }
}
