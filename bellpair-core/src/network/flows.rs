//! Single-destination flow admission.

use tracing::debug;

use crate::error::{NetworkError, Result};

use super::{CapacityNetwork, NodeId};

/// A single-destination rate request and, after routing, its outcome.
///
/// An admitted flow carries the hop sequence (destination included, source
/// excluded) and the gross rate reserved on every edge of that path; a
/// rejected flow keeps an empty path and a zero gross rate. In both cases
/// [`FlowDescriptor::path_searches`] records how many shortest-path
/// searches the admission performed.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDescriptor {
    source: NodeId,
    target: NodeId,
    net_rate: f64,
    path: Vec<NodeId>,
    gross_rate: f64,
    path_searches: u32,
}

impl FlowDescriptor {
    /// Creates a request for `net_rate` end-to-end from `source` to
    /// `target`. Validation happens when the flow is routed.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, net_rate: f64) -> Self {
        Self {
            source,
            target,
            net_rate,
            path: Vec::new(),
            gross_rate: 0.0,
            path_searches: 0,
        }
    }

    /// Returns the source node.
    #[must_use]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the destination node.
    #[must_use]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Returns the requested end-to-end rate.
    #[must_use]
    pub fn net_rate(&self) -> f64 {
        self.net_rate
    }

    /// Returns the admitted hop sequence, empty when rejected.
    #[must_use]
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    /// Returns the gross rate reserved on every path edge, zero when
    /// rejected.
    #[must_use]
    pub fn gross_rate(&self) -> f64 {
        self.gross_rate
    }

    /// Returns how many shortest-path searches the admission performed.
    #[must_use]
    pub fn path_searches(&self) -> u32 {
        self.path_searches
    }
}

impl CapacityNetwork {
    /// Routes `flows` in input order, reserving capacity for each admitted
    /// flow before the next one is considered.
    ///
    /// Each flow is searched on the subgraph of edges that can still carry
    /// its gross rate. The gross rate depends on the path length, which is
    /// only known once a candidate is found, so the admissible threshold
    /// rises and the search repeats until a candidate survives its own
    /// gross-rate check or no path remains.
    ///
    /// # Errors
    /// Fails without touching the network or the descriptors when any flow
    /// has coinciding endpoints, an out-of-range node, or a non-positive
    /// rate.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::{CapacityNetwork, FlowDescriptor};
    ///
    /// let mut network = CapacityNetwork::from_weighted_edges([
    ///     (0, 1, 4.0),
    ///     (1, 2, 4.0),
    ///     (2, 3, 4.0),
    ///     (0, 4, 1.0),
    ///     (4, 3, 4.0),
    /// ])?;
    /// let mut flows = vec![FlowDescriptor::new(0, 3, 1.0)];
    /// network.route_flows(&mut flows)?;
    /// assert_eq!(flows[0].path(), &[4, 3]);
    /// assert_eq!(flows[0].gross_rate(), 1.0);
    /// assert_eq!(network.total_capacity(), 15.0);
    /// # Ok::<(), bellpair_core::NetworkError>(())
    /// ```
    pub fn route_flows(&mut self, flows: &mut [FlowDescriptor]) -> Result<()> {
        self.route_flows_with(flows, |_| true)
    }

    /// Routes `flows` like [`CapacityNetwork::route_flows`], additionally
    /// rejecting any candidate for which `constraint` returns `false`.
    ///
    /// The predicate sees the candidate descriptor with its path and gross
    /// rate filled in; a constrained rejection leaves the network unchanged
    /// and does not trigger a further search.
    ///
    /// # Errors
    /// Same validation failures as [`CapacityNetwork::route_flows`].
    pub fn route_flows_with<C>(&mut self, flows: &mut [FlowDescriptor], constraint: C) -> Result<()>
    where
        C: Fn(&FlowDescriptor) -> bool,
    {
        for flow in flows.iter() {
            self.validate_node(flow.source)?;
            self.validate_node(flow.target)?;
            if flow.source == flow.target {
                return Err(NetworkError::SourceIsDestination { node: flow.source });
            }
            if !flow.net_rate.is_finite() || flow.net_rate <= 0.0 {
                return Err(NetworkError::NonPositiveRate {
                    rate: flow.net_rate,
                });
            }
        }

        for flow in flows.iter_mut() {
            flow.path.clear();
            flow.gross_rate = 0.0;
            flow.path_searches = 0;
            self.route_single_flow(flow, &constraint);
        }
        Ok(())
    }

    fn route_single_flow<C>(&mut self, flow: &mut FlowDescriptor, constraint: &C)
    where
        C: Fn(&FlowDescriptor) -> bool,
    {
        // A single-hop path needs no swaps, so the initial admissible
        // threshold is the net rate itself.
        let mut threshold = flow.net_rate;
        loop {
            flow.path_searches += 1;
            let Some(full_path) =
                self.shortest_admissible_path(flow.source, flow.target, threshold)
            else {
                debug!(
                    source = flow.source,
                    target = flow.target,
                    searches = flow.path_searches,
                    "flow rejected, no admissible path"
                );
                return;
            };

            let edge_count = full_path.len() - 1;
            let gross = self.to_gross_rate(flow.net_rate, edge_count);
            let indices: Vec<usize> = full_path
                .windows(2)
                .filter_map(|step| self.find_edge(step[0], step[1]))
                .collect();
            let feasible = indices.len() == edge_count
                && indices.iter().all(|&index| self.edge_weight(index) >= gross);
            if !feasible {
                threshold = gross;
                continue;
            }

            flow.path = full_path[1..].to_vec();
            flow.gross_rate = gross;
            if !constraint(flow) {
                flow.path.clear();
                flow.gross_rate = 0.0;
                debug!(
                    source = flow.source,
                    target = flow.target,
                    "flow rejected by constraint"
                );
                return;
            }

            for index in indices {
                self.subtract_weight(index, gross);
            }
            debug!(
                source = flow.source,
                target = flow.target,
                hops = edge_count,
                gross,
                "flow admitted"
            );
            return;
        }
    }
}
