use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use slotmap::SlotMap;
use smallvec::SmallVec;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Arena used for facets that are created and destroyed during hull construction.
///
/// Keys stay valid while their facet is alive; removed facets leave stale keys
/// that simply fail lookups.
pub type StorageMap<K, V> = SlotMap<K, V>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Hasher used by [`FastHashMap`] and [`FastHashSet`].
pub type FastHasher = FxHasher;

/// Build hasher for [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Optimized `HashMap` type for performance-critical operations.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: keys here are always internal indices.
///
/// # Examples
///
/// ```rust
/// use cocone::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<usize, usize> = FastHashMap::default();
/// map.insert(1, 2);
/// assert_eq!(map.get(&1), Some(&2));
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Re-export of the standard entry API for [`FastHashMap`].
pub use std::collections::hash_map::Entry;

/// Optimized `HashSet` type for membership tests on internal indices.
///
/// # Examples
///
/// ```rust
/// use cocone::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<usize> = FastHashSet::default();
/// set.insert(7);
/// assert!(set.contains(&7));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// # Size Guidelines
///
/// - **N=2**: Facet sharing patterns (1-2 simplices per facet)
/// - **N=8**: Vertex lists and coordinates of a simplex in practical dimensions
///
/// # Examples
///
/// ```rust
/// use cocone::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 8> = SmallBuffer::new();
/// buffer.extend([3, 1, 2]);
/// assert_eq!(buffer.len(), 3);
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Semantic constant for the maximum practical dimension in computational geometry.
///
/// Reconstruction runs in 2D–5D and lifts by one dimension, so 8 keeps every
/// simplex vertex list and coordinate vector on the stack.
pub const MAX_PRACTICAL_DIMENSION_SIZE: usize = 8;

/// Point indices of one simplex, facet or ridge.
pub type VertexBuffer = SmallBuffer<usize, MAX_PRACTICAL_DIMENSION_SIZE>;

/// Coordinates of a runtime-dimension vector.
pub type CoordinateBuffer = SmallBuffer<f64, MAX_PRACTICAL_DIMENSION_SIZE>;
