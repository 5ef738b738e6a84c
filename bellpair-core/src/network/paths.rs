//! Shortest-path searches over the residual graph.
//!
//! Flow admission searches the subgraph of edges whose residual meets a
//! rising gross-rate threshold; app admission enumerates k shortest simple
//! paths per peer with Yen's algorithm. Both count hops only, and both are
//! deterministic: neighbours are explored in ascending node order, so ties
//! resolve to the lexicographically smallest path.

use std::collections::{BTreeSet, VecDeque};

use super::{CapacityNetwork, NodeId};

impl CapacityNetwork {
    /// Shortest path from `source` to `target` using only edges whose
    /// residual is at least `threshold`. Returns the full node sequence,
    /// `source` included.
    pub(crate) fn shortest_admissible_path(
        &self,
        source: NodeId,
        target: NodeId,
        threshold: f64,
    ) -> Option<Vec<NodeId>> {
        self.bfs_shortest_path(source, target, threshold, None, None)
    }

    /// Up to `count` shortest simple paths from `source` to `target` over
    /// positive-residual edges, ordered by length and then lexicographic
    /// node order. Full node sequences, `source` included.
    pub(crate) fn k_shortest_paths(
        &self,
        source: NodeId,
        target: NodeId,
        count: usize,
    ) -> Vec<Vec<NodeId>> {
        let Some(first) = self.bfs_shortest_path(source, target, f64::MIN_POSITIVE, None, None)
        else {
            return Vec::new();
        };

        let mut accepted = vec![first];
        // Candidate pool ordered by (length, node sequence); BTreeSet keeps
        // the pop deterministic and deduplicates spur results.
        let mut candidates: BTreeSet<(usize, Vec<NodeId>)> = BTreeSet::new();

        while accepted.len() < count {
            let previous = &accepted[accepted.len() - 1];
            for spur_index in 0..previous.len() - 1 {
                let spur_node = previous[spur_index];
                let root = &previous[..=spur_index];

                let mut banned_edges: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
                for path in &accepted {
                    if path.len() > spur_index + 1 && path[..=spur_index] == *root {
                        banned_edges.insert((path[spur_index], path[spur_index + 1]));
                    }
                }
                let banned_nodes: BTreeSet<NodeId> = root[..spur_index].iter().copied().collect();

                if let Some(spur_path) = self.bfs_shortest_path(
                    spur_node,
                    target,
                    f64::MIN_POSITIVE,
                    Some(&banned_nodes),
                    Some(&banned_edges),
                ) {
                    let mut total = root.to_vec();
                    total.extend_from_slice(&spur_path[1..]);
                    if !accepted.contains(&total) {
                        candidates.insert((total.len(), total));
                    }
                }
            }

            match candidates.pop_first() {
                Some((_, path)) => accepted.push(path),
                None => break,
            }
        }
        accepted
    }

    /// Unit-cost BFS restricted to edges with residual `>= threshold`,
    /// skipping banned nodes and banned `(source, target)` pairs. Only a
    /// pair's first inserted edge is consulted, matching the resolution
    /// rule used when capacities are adjusted.
    fn bfs_shortest_path(
        &self,
        source: NodeId,
        target: NodeId,
        threshold: f64,
        banned_nodes: Option<&BTreeSet<NodeId>>,
        banned_edges: Option<&BTreeSet<(NodeId, NodeId)>>,
    ) -> Option<Vec<NodeId>> {
        if source >= self.num_nodes() || target >= self.num_nodes() || source == target {
            return None;
        }
        let is_banned =
            |node: NodeId| banned_nodes.is_some_and(|banned| banned.contains(&node));
        if is_banned(source) {
            return None;
        }

        let mut predecessor: Vec<Option<NodeId>> = vec![None; self.num_nodes()];
        let mut visited = vec![false; self.num_nodes()];
        visited[source] = true;
        let mut queue = VecDeque::from([source]);

        'search: while let Some(node) = queue.pop_front() {
            let mut last_target = None;
            for &index in &self.outgoing[node] {
                let edge = &self.edges[index];
                // Outgoing indices are sorted by target, so repeats of a
                // pair's first edge are adjacent and skipped here.
                if last_target == Some(edge.target) {
                    continue;
                }
                last_target = Some(edge.target);

                if edge.weight < threshold
                    || visited[edge.target]
                    || is_banned(edge.target)
                    || banned_edges.is_some_and(|banned| banned.contains(&(node, edge.target)))
                {
                    continue;
                }
                visited[edge.target] = true;
                predecessor[edge.target] = Some(node);
                if edge.target == target {
                    break 'search;
                }
                queue.push_back(edge.target);
            }
        }

        if !visited[target] {
            return None;
        }
        let mut path = vec![target];
        let mut node = target;
        while let Some(previous) = predecessor[node] {
            path.push(previous);
            node = previous;
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::CapacityNetwork;

    fn ladder() -> CapacityNetwork {
        CapacityNetwork::from_weighted_edges([
            (0, 1, 4.0),
            (1, 2, 4.0),
            (2, 3, 4.0),
            (0, 4, 1.0),
            (4, 3, 4.0),
        ])
        .expect("weights must be valid")
    }

    #[test]
    fn shortest_path_prefers_fewer_hops() {
        let network = ladder();
        let path = network
            .shortest_admissible_path(0, 3, 1.0)
            .expect("a path must exist");
        assert_eq!(path, vec![0, 4, 3]);
    }

    #[test]
    fn threshold_filters_out_thin_edges() {
        let network = ladder();
        let path = network
            .shortest_admissible_path(0, 3, 2.0)
            .expect("the long way must still be admissible");
        assert_eq!(path, vec![0, 1, 2, 3]);
        assert!(network.shortest_admissible_path(0, 3, 5.0).is_none());
    }

    #[test]
    fn shortest_path_breaks_ties_lexicographically() {
        let diamond = CapacityNetwork::from_weighted_edges([
            (0, 2, 1.0),
            (0, 1, 1.0),
            (1, 3, 1.0),
            (2, 3, 1.0),
        ])
        .expect("weights must be valid");
        let path = diamond
            .shortest_admissible_path(0, 3, 1.0)
            .expect("a path must exist");
        assert_eq!(path, vec![0, 1, 3]);
    }

    #[test]
    fn k_shortest_enumerates_both_routes() {
        let network = ladder();
        let paths = network.k_shortest_paths(0, 3, 99);
        assert_eq!(paths, vec![vec![0, 4, 3], vec![0, 1, 2, 3]]);
    }

    #[test]
    fn k_shortest_respects_the_limit() {
        let network = ladder();
        assert_eq!(network.k_shortest_paths(0, 3, 1), vec![vec![0, 4, 3]]);
    }

    #[test]
    fn k_shortest_orders_equal_lengths_lexicographically() {
        let diamond = CapacityNetwork::from_weighted_edges([
            (0, 2, 1.0),
            (0, 1, 1.0),
            (1, 3, 1.0),
            (2, 3, 1.0),
        ])
        .expect("weights must be valid");
        let paths = diamond.k_shortest_paths(0, 3, 5);
        assert_eq!(paths, vec![vec![0, 1, 3], vec![0, 2, 3]]);
    }

    #[test]
    fn k_shortest_ignores_saturated_edges() {
        let network = CapacityNetwork::from_weighted_edges([
            (0, 1, 0.0),
            (1, 3, 2.0),
            (0, 2, 2.0),
            (2, 3, 2.0),
        ])
        .expect("weights must be valid");
        assert_eq!(network.k_shortest_paths(0, 3, 9), vec![vec![0, 2, 3]]);
    }

    #[test]
    fn unreachable_targets_yield_nothing() {
        let network = ladder();
        assert!(network.shortest_admissible_path(3, 0, 0.5).is_none());
        assert!(network.k_shortest_paths(3, 0, 3).is_empty());
    }
}
