//! Multi-peer app admission.
//!
//! Apps request capacity towards several peers at once and are served in
//! rate quanta: the service loop repeatedly picks the least-served app
//! (weighted by priority) and lets it reserve one increment along its best
//! remaining candidate path. A path stays available until its bottleneck
//! residual is exhausted, so an app may collect many quanta along the same
//! route before moving to the next one.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::error::{NetworkError, Result};

use super::{CapacityNetwork, NodeId};

/// One reservation an app holds along a single path towards a peer.
///
/// Repeated admissions along the same path accumulate into one allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    hops: Vec<NodeId>,
    gross_rate: f64,
    net_rate: f64,
}

impl Allocation {
    /// Returns the hop sequence (peer included, source excluded).
    #[must_use]
    pub fn hops(&self) -> &[NodeId] {
        &self.hops
    }

    /// Returns the rate reserved on every edge of the path.
    #[must_use]
    pub fn gross_rate(&self) -> f64 {
        self.gross_rate
    }

    /// Returns the end-to-end rate delivered after swap attenuation.
    #[must_use]
    pub fn net_rate(&self) -> f64 {
        self.net_rate
    }
}

/// A candidate path an app may still draw quanta from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathCandidate {
    peer: NodeId,
    hops: Vec<NodeId>,
}

impl PathCandidate {
    /// Returns the peer this candidate leads to.
    #[must_use]
    pub fn peer(&self) -> NodeId {
        self.peer
    }

    /// Returns the hop sequence (peer included, source excluded).
    #[must_use]
    pub fn hops(&self) -> &[NodeId] {
        &self.hops
    }
}

/// A multi-peer rate request and, after routing, its admission state.
#[derive(Clone, Debug)]
pub struct AppDescriptor {
    source: NodeId,
    peers: BTreeSet<NodeId>,
    priority: f64,
    allocated: BTreeMap<NodeId, Vec<Allocation>>,
    remaining_paths: VecDeque<PathCandidate>,
    visits: usize,
}

impl AppDescriptor {
    /// Creates a request from `source` towards `peers` with the given
    /// scheduling `priority`. Validation happens when the app is routed.
    #[must_use]
    pub fn new<P>(source: NodeId, peers: P, priority: f64) -> Self
    where
        P: IntoIterator<Item = NodeId>,
    {
        Self {
            source,
            peers: peers.into_iter().collect(),
            priority,
            allocated: BTreeMap::new(),
            remaining_paths: VecDeque::new(),
            visits: 0,
        }
    }

    /// Returns the source node.
    #[must_use]
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the requested peers.
    #[must_use]
    pub fn peers(&self) -> &BTreeSet<NodeId> {
        &self.peers
    }

    /// Returns the scheduling priority.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Returns the allocations obtained per peer.
    #[must_use]
    pub fn allocations(&self) -> &BTreeMap<NodeId, Vec<Allocation>> {
        &self.allocated
    }

    /// Returns the candidate paths not yet exhausted or discarded.
    #[must_use]
    pub fn remaining_paths(&self) -> &VecDeque<PathCandidate> {
        &self.remaining_paths
    }

    /// Returns how many times the service loop selected this app.
    #[must_use]
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Returns the total rate reserved on behalf of this app.
    #[must_use]
    pub fn gross_rate(&self) -> f64 {
        self.allocated
            .values()
            .flatten()
            .map(Allocation::gross_rate)
            .sum()
    }

    /// Returns the total end-to-end rate delivered to this app's peers.
    #[must_use]
    pub fn net_rate(&self) -> f64 {
        self.allocated
            .values()
            .flatten()
            .map(Allocation::net_rate)
            .sum()
    }

    fn record(&mut self, peer: NodeId, hops: &[NodeId], gross: f64, net: f64) {
        let allocations = self.allocated.entry(peer).or_default();
        match allocations
            .iter_mut()
            .find(|allocation| allocation.hops == hops)
        {
            Some(allocation) => {
                allocation.gross_rate += gross;
                allocation.net_rate += net;
            }
            None => allocations.push(Allocation {
                hops: hops.to_vec(),
                gross_rate: gross,
                net_rate: net,
            }),
        }
    }
}

impl CapacityNetwork {
    /// Admits `apps` iteratively in rate quanta.
    ///
    /// For every (source, peer) pair up to `path_count` shortest simple
    /// paths over positive-residual edges are precomputed, ordered by
    /// length and then lexicographic node order. The service loop then
    /// repeatedly selects the app minimising reserved rate over priority
    /// (ties resolve to input order, and every selection counts as a
    /// visit). The selected app inspects its best remaining candidate: a
    /// path with an exhausted bottleneck is discarded, otherwise the app
    /// reserves the length-attenuated quantum, capped by the bottleneck,
    /// on every edge of the path. The loop ends when no candidates remain.
    ///
    /// # Errors
    /// Fails without touching the network or the descriptors when
    /// `quantum` is not positive and finite, `path_count` is zero, or any
    /// app has an empty peer set, an out-of-range node, itself among its
    /// peers, or a non-positive priority.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::{AppDescriptor, CapacityNetwork};
    ///
    /// let mut network = CapacityNetwork::from_weighted_edges([(0, 1, 1.0)])?;
    /// let mut apps = vec![AppDescriptor::new(0, [1], 1.0)];
    /// network.route_apps(&mut apps, 0.5, 1)?;
    /// assert_eq!(apps[0].gross_rate(), 1.0);
    /// assert_eq!(apps[0].visits(), 3);
    /// assert_eq!(network.total_capacity(), 0.0);
    /// # Ok::<(), bellpair_core::NetworkError>(())
    /// ```
    pub fn route_apps(
        &mut self,
        apps: &mut [AppDescriptor],
        quantum: f64,
        path_count: usize,
    ) -> Result<()> {
        if !quantum.is_finite() || quantum <= 0.0 {
            return Err(NetworkError::NonPositiveQuantum { quantum });
        }
        if path_count == 0 {
            return Err(NetworkError::ZeroPathCount);
        }
        for app in apps.iter() {
            self.validate_node(app.source)?;
            if app.peers.is_empty() {
                return Err(NetworkError::EmptyPeers { source_node: app.source });
            }
            for &peer in &app.peers {
                self.validate_node(peer)?;
                if peer == app.source {
                    return Err(NetworkError::PeerIsSource { source_node: app.source });
                }
            }
            if !app.priority.is_finite() || app.priority <= 0.0 {
                return Err(NetworkError::NonPositivePriority {
                    priority: app.priority,
                });
            }
        }

        for app in apps.iter_mut() {
            app.allocated.clear();
            app.visits = 0;
            app.remaining_paths.clear();
            for &peer in &app.peers {
                for path in self.k_shortest_paths(app.source, peer, path_count) {
                    app.remaining_paths.push_back(PathCandidate {
                        peer,
                        hops: path[1..].to_vec(),
                    });
                }
            }
            app.remaining_paths
                .make_contiguous()
                .sort_by(|left, right| {
                    (left.hops.len(), &left.hops).cmp(&(right.hops.len(), &right.hops))
                });
        }

        while let Some((selected, candidate)) = self.select_app(apps) {
            let app = &mut apps[selected];
            app.visits += 1;

            let indices = self.path_edge_indices(app.source, &candidate.hops);
            let bottleneck = indices
                .iter()
                .map(|&index| self.edge_weight(index))
                .fold(f64::INFINITY, f64::min);
            if indices.len() != candidate.hops.len() || bottleneck <= 0.0 {
                app.remaining_paths.pop_front();
                continue;
            }

            let edge_count = candidate.hops.len();
            let step = self.to_net_rate(quantum, edge_count);
            let amount = step.min(bottleneck);
            for index in indices {
                self.subtract_weight(index, amount);
            }
            let delivered = self.to_net_rate(amount, edge_count);
            app.record(candidate.peer, &candidate.hops, amount, delivered);
            debug!(
                source = app.source,
                peer = candidate.peer,
                hops = edge_count,
                amount,
                "app admission step"
            );
        }
        Ok(())
    }

    /// Picks the app to serve next: least reserved rate over priority,
    /// earliest input position on ties. Returns its current candidate.
    fn select_app(&self, apps: &[AppDescriptor]) -> Option<(usize, PathCandidate)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, app) in apps.iter().enumerate() {
            if app.remaining_paths.is_empty() {
                continue;
            }
            let score = app.gross_rate() / app.priority;
            if best.map_or(true, |(_, current)| score < current) {
                best = Some((index, score));
            }
        }
        let (index, _) = best?;
        apps[index]
            .remaining_paths
            .front()
            .cloned()
            .map(|candidate| (index, candidate))
    }

    fn path_edge_indices(&self, source: NodeId, hops: &[NodeId]) -> Vec<usize> {
        let mut indices = Vec::with_capacity(hops.len());
        let mut previous = source;
        for &hop in hops {
            match self.find_edge(previous, hop) {
                Some(index) => indices.push(index),
                None => break,
            }
            previous = hop;
        }
        indices
    }
}
