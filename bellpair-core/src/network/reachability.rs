//! Hop-bounded reachability queries.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{CapacityNetwork, NodeId};

/// The result of a hop-bounded reachability sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reachability {
    reachable: BTreeMap<NodeId, BTreeSet<NodeId>>,
    diameter: usize,
}

impl Reachability {
    /// Returns, per source node, the nodes whose hop distance falls inside
    /// the queried window. Sources that reach nothing map to an empty set.
    #[must_use]
    pub fn per_source(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        &self.reachable
    }

    /// Returns the nodes reachable from `source` inside the window.
    #[must_use]
    pub fn from_node(&self, source: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.reachable.get(&source)
    }

    /// Returns the largest finite hop distance observed during the sweep,
    /// regardless of the queried window.
    #[must_use]
    pub fn diameter(&self) -> usize {
        self.diameter
    }
}

impl CapacityNetwork {
    /// Runs an unweighted BFS from every node and reports, per source, the
    /// nodes whose shortest hop distance `d` satisfies
    /// `min_hops <= d <= max_hops`. A source never includes itself.
    ///
    /// Edges count regardless of their residual weight: reachability is a
    /// property of the graph, not of the capacity left on it.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::CapacityNetwork;
    ///
    /// let network = CapacityNetwork::from_weighted_edges([
    ///     (0, 1, 1.0),
    ///     (1, 2, 1.0),
    ///     (2, 3, 1.0),
    /// ])?;
    /// let sweep = network.reachable_nodes(0, usize::MAX);
    /// assert_eq!(sweep.diameter(), 3);
    /// assert!(sweep.from_node(0).is_some_and(|set| set.len() == 3));
    /// assert!(sweep.from_node(3).is_some_and(|set| set.is_empty()));
    /// # Ok::<(), bellpair_core::NetworkError>(())
    /// ```
    #[must_use]
    pub fn reachable_nodes(&self, min_hops: usize, max_hops: usize) -> Reachability {
        let mut reachable = BTreeMap::new();
        let mut diameter = 0;
        for source in 0..self.num_nodes() {
            let distances = self.hop_distances(source);
            let mut window = BTreeSet::new();
            for (node, distance) in distances.iter().enumerate() {
                let Some(distance) = *distance else { continue };
                if node != source {
                    diameter = diameter.max(distance);
                    if (min_hops..=max_hops).contains(&distance) {
                        window.insert(node);
                    }
                }
            }
            reachable.insert(source, window);
        }
        Reachability {
            reachable,
            diameter,
        }
    }

    fn hop_distances(&self, source: NodeId) -> Vec<Option<usize>> {
        let mut distances: Vec<Option<usize>> = vec![None; self.num_nodes()];
        distances[source] = Some(0);
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            let next = distances[node].unwrap_or(0) + 1;
            for &index in &self.outgoing[node] {
                let target = self.edges[index].target;
                if distances[target].is_none() {
                    distances[target] = Some(next);
                    queue.push_back(target);
                }
            }
        }
        distances
    }
}
