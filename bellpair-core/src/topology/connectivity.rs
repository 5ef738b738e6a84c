//! Weak-connectivity test over directed edge lists.

use crate::network::NodeId;

/// Returns `true` when the edges, read as undirected, join every mentioned
/// node into a single component.
///
/// Nodes not referenced by any edge are outside the graph and do not
/// count. An empty edge list has no component and is not connected.
///
/// # Examples
/// ```
/// use bellpair_core::bigraph_connected;
///
/// assert!(bigraph_connected(&[(0, 1), (2, 1)]));
/// assert!(!bigraph_connected(&[(0, 1), (2, 3)]));
/// assert!(!bigraph_connected(&[]));
/// ```
#[must_use]
pub fn bigraph_connected(edges: &[(NodeId, NodeId)]) -> bool {
    let Some(max_node) = edges.iter().map(|&(u, v)| u.max(v)).max() else {
        return false;
    };
    let mut forest = UnionFind::new(max_node + 1);
    for &(u, v) in edges {
        forest.union(u, v);
    }
    let mut root = None;
    edges.iter().flat_map(|&(u, v)| [u, v]).all(|node| {
        let found = forest.find(node);
        match root {
            Some(existing) => existing == found,
            None => {
                root = Some(found);
                true
            }
        }
    })
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, node: usize) -> usize {
        let mut current = node;
        while self.parent[current] != current {
            // Path halving keeps the forest shallow.
            let grandparent = self.parent[self.parent[current]];
            self.parent[current] = grandparent;
            current = grandparent;
        }
        current
    }

    fn union(&mut self, left: usize, right: usize) {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root != right_root {
            self.parent[right_root] = left_root;
        }
    }
}
