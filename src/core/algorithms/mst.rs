//! Minimum spanning tree of the Delaunay graph.
//!
//! Kruskal's algorithm over the unique edges of a simplex set, weighted by
//! squared Euclidean length, with a weighted quick-union forest.
//!
//! # References
//!
//! - R. Sedgewick and K. Wayne, "Algorithms", 4th ed., sections 1.5 and 4.3.

use thiserror::Error;
use tracing::{debug, info};

use crate::core::collections::FastHashSet;
use crate::core::progress::{ProgressRatio, report, report_text};
use crate::geometry::util::squared_norm;

const PROGRESS_INTERVAL: usize = 0xfff;

/// Errors from [`minimum_spanning_tree`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MstError {
    /// Kruskal's algorithm ran out of edges before connecting every vertex.
    #[error(
        "The graph is not connected: {edges} spanning edges for {vertices} vertices"
    )]
    Disconnected {
        /// Edges in the spanning forest.
        edges: usize,
        /// Distinct vertices referenced by the simplices.
        vertices: usize,
    },
    /// A simplex references a point that does not exist.
    #[error("Simplex vertex {index} is out of range for {points} points")]
    IndexOutOfRange {
        /// Offending vertex index.
        index: usize,
        /// Number of points.
        points: usize,
    },
}

/// Disjoint-set forest with union by size and path halving.
#[derive(Clone, Debug)]
struct WeightedQuickUnion {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl WeightedQuickUnion {
    fn new(count: usize) -> Self {
        Self {
            parent: (0..count).collect(),
            size: vec![1; count],
        }
    }

    fn find(&mut self, mut p: usize) -> usize {
        while p != self.parent[p] {
            self.parent[p] = self.parent[self.parent[p]];
            p = self.parent[p];
        }
        p
    }

    /// Joins the components of `p` and `q`. Returns `false` if they were
    /// already joined.
    fn connect(&mut self, p: usize, q: usize) -> bool {
        let i = self.find(p);
        let j = self.find(q);
        if i == j {
            return false;
        }
        if self.size[i] < self.size[j] {
            self.parent[i] = j;
            self.size[j] += self.size[i];
        } else {
            self.parent[j] = i;
            self.size[i] += self.size[j];
        }
        true
    }
}

#[derive(Clone, Copy, Debug)]
struct WeightedEdge {
    weight: f64,
    edge: [usize; 2],
}

fn sorted_edges<const D: usize, S: AsRef<[usize]>>(
    points: &[[f64; D]],
    simplices: &[S],
    progress: Option<&dyn ProgressRatio>,
) -> Result<Vec<WeightedEdge>, MstError> {
    report_text(progress, "MST: object %v of %m");

    let mut edges: Vec<[usize; 2]> = Vec::new();
    for (object, simplex) in simplices.iter().enumerate() {
        if object & PROGRESS_INTERVAL == PROGRESS_INTERVAL {
            report(progress, object as u64, simplices.len() as u64);
        }
        let vertices = simplex.as_ref();
        if let Some(&index) = vertices.iter().find(|&&v| v >= points.len()) {
            return Err(MstError::IndexOutOfRange {
                index,
                points: points.len(),
            });
        }
        for (i, &a) in vertices.iter().enumerate() {
            for &b in &vertices[i + 1..] {
                edges.push([a.min(b), a.max(b)]);
            }
        }
    }

    report(progress, 1, 2);
    report_text(progress, "MST: edges");
    edges.sort_unstable();
    edges.dedup();

    let mut weighted: Vec<WeightedEdge> = edges
        .into_iter()
        .map(|edge| {
            let line: [f64; D] = std::array::from_fn(|i| points[edge[1]][i] - points[edge[0]][i]);
            WeightedEdge {
                weight: squared_norm(&line),
                edge,
            }
        })
        .collect();

    report_text(progress, "MST: sort");
    weighted.sort_by(|a, b| a.weight.total_cmp(&b.weight).then(a.edge.cmp(&b.edge)));
    Ok(weighted)
}

fn used_vertex_count<S: AsRef<[usize]>>(simplices: &[S]) -> usize {
    simplices
        .iter()
        .flat_map(|s| s.as_ref().iter().copied())
        .collect::<FastHashSet<usize>>()
        .len()
}

/// Minimum spanning tree of the graph formed by the edges of `simplices`.
///
/// Points not referenced by any simplex are ignored. Edges are returned in
/// the order Kruskal's algorithm accepts them, each as `[min, max]`.
///
/// # Errors
///
/// Returns [`MstError::Disconnected`] if the used vertices do not form one
/// component and [`MstError::IndexOutOfRange`] for invalid simplex indices.
///
/// # Examples
///
/// ```rust
/// use cocone::core::algorithms::mst::minimum_spanning_tree;
///
/// let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 2.0], [1.0, 2.0]];
/// let simplices = [[0usize, 1, 2], [1, 2, 3]];
/// let mst = minimum_spanning_tree(&points, &simplices, None).unwrap();
/// assert_eq!(mst, vec![[0, 1], [2, 3], [0, 2]]);
/// ```
pub fn minimum_spanning_tree<const D: usize, S: AsRef<[usize]>>(
    points: &[[f64; D]],
    simplices: &[S],
    progress: Option<&dyn ProgressRatio>,
) -> Result<Vec<[usize; 2]>, MstError> {
    debug!(simplices = simplices.len(), "Weight and sort edges");
    let edges = sorted_edges(points, simplices, progress)?;

    let vertex_count = used_vertex_count(simplices);
    let target = vertex_count.saturating_sub(1);

    report_text(progress, "MST: edge %v of %m");
    let mut forest = WeightedQuickUnion::new(points.len());
    let mut mst: Vec<[usize; 2]> = Vec::with_capacity(target);
    for e in &edges {
        if mst.len() >= target {
            break;
        }
        if mst.len() & PROGRESS_INTERVAL == PROGRESS_INTERVAL {
            report(progress, mst.len() as u64, target as u64);
        }
        if forest.connect(e.edge[0], e.edge[1]) {
            mst.push(e.edge);
        }
    }

    if mst.len() != target {
        return Err(MstError::Disconnected {
            edges: mst.len(),
            vertices: vertex_count,
        });
    }

    info!(edges = mst.len(), vertices = vertex_count, "MST created");
    Ok(mst)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::progress::AtomicProgress;

    #[test]
    fn test_union_find_merges_components() {
        let mut forest = WeightedQuickUnion::new(5);
        assert!(forest.connect(0, 1));
        assert!(forest.connect(2, 3));
        assert!(!forest.connect(1, 0));
        assert!(forest.connect(1, 3));
        assert_eq!(forest.find(0), forest.find(2));
        assert_ne!(forest.find(0), forest.find(4));
    }

    #[test]
    fn test_square_mst_skips_diagonal() {
        let points = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let simplices = [[0usize, 1, 2], [0, 2, 3]];
        let mst = minimum_spanning_tree(&points, &simplices, None).unwrap();
        assert_eq!(mst.len(), 3);
        assert!(!mst.contains(&[0, 2]));
    }

    #[test]
    fn test_unused_points_are_ignored() {
        let points = [[0.0, 0.0], [9.0, 9.0], [1.0, 0.0], [0.0, 1.0]];
        let simplices = vec![vec![0usize, 2, 3]];
        let mst = minimum_spanning_tree(&points, &simplices, None).unwrap();
        assert_eq!(mst, vec![[0, 2], [0, 3]]);
    }

    #[test]
    fn test_disconnected_components_fail() {
        let points = [
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [5.0, 5.0],
            [6.0, 5.0],
            [5.0, 6.0],
        ];
        let simplices = [[0usize, 1, 2], [3, 4, 5]];
        let err = minimum_spanning_tree(&points, &simplices, None).unwrap_err();
        assert_eq!(
            err,
            MstError::Disconnected {
                edges: 4,
                vertices: 6
            }
        );
        assert!(err.to_string().contains("The graph is not connected"));
    }

    #[test]
    fn test_out_of_range_index_is_reported() {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let err = minimum_spanning_tree(&points, &[[0usize, 1, 7]], None).unwrap_err();
        assert_eq!(err, MstError::IndexOutOfRange { index: 7, points: 3 });
    }

    #[test]
    fn test_empty_input_and_progress() {
        let points: [[f64; 3]; 0] = [];
        let simplices: [[usize; 4]; 0] = [];
        let progress = AtomicProgress::default();
        let mst = minimum_spanning_tree(&points, &simplices, Some(&progress)).unwrap();
        assert!(mst.is_empty());
        assert_eq!(progress.text(), "MST: edge %v of %m");
    }
}
