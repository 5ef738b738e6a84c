//! The capacity network: a directed weighted multigraph with reservable
//! per-edge residuals.
//!
//! Edges model entanglement-generation links; residual weights are the EPR
//! pair rates still available for admission. All mutation happens through
//! the admission calls ([`CapacityNetwork::route_flows`],
//! [`CapacityNetwork::route_apps`]) and
//! [`CapacityNetwork::add_capacity_to_path`]; every public mutation either
//! commits entirely or leaves the network unchanged.

mod apps;
mod flows;
mod paths;
mod reachability;

pub use apps::{Allocation, AppDescriptor, PathCandidate};
pub use flows::FlowDescriptor;
pub use reachability::Reachability;

use std::{fs::File, io, io::Write, path::Path};

use crate::{
    error::{NetworkError, Result},
    sampler::RateSampler,
};

/// Identifier of a network node. Nodes are densely numbered from 0.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Edge {
    source: NodeId,
    target: NodeId,
    weight: f64,
}

/// A directed weighted multigraph with per-edge residual capacities and a
/// scalar measurement probability.
///
/// # Examples
/// ```
/// use bellpair_core::CapacityNetwork;
///
/// let network = CapacityNetwork::from_weighted_edges([
///     (0, 1, 4.0),
///     (1, 2, 4.0),
///     (2, 3, 4.0),
///     (0, 4, 1.0),
///     (4, 3, 4.0),
/// ])?;
/// assert_eq!(network.num_nodes(), 5);
/// assert_eq!(network.num_edges(), 5);
/// assert_eq!(network.total_capacity(), 17.0);
/// # Ok::<(), bellpair_core::NetworkError>(())
/// ```
#[derive(Clone, Debug)]
pub struct CapacityNetwork {
    edges: Vec<Edge>,
    /// Per-node out-edge indices, sorted by (target, insertion order).
    outgoing: Vec<Vec<usize>>,
    measurement_probability: f64,
}

impl CapacityNetwork {
    /// Builds a network from explicit `(source, target, weight)` triples.
    ///
    /// The node count is one past the largest identifier mentioned. No
    /// reverse edges are inserted.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidWeight`] when a weight is negative or
    /// non-finite.
    pub fn from_weighted_edges<I>(weighted: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut edges = Vec::new();
        for (source, target, weight) in weighted {
            if !weight.is_finite() || weight < 0.0 {
                return Err(NetworkError::InvalidWeight {
                    source_node: source,
                    target,
                    weight,
                });
            }
            edges.push(Edge {
                source,
                target,
                weight,
            });
        }
        Ok(Self::from_edge_records(edges))
    }

    /// Builds a network from `(source, target)` pairs, drawing one weight
    /// per edge from `sampler`.
    ///
    /// With `bidirectional` set, every pair also inserts the reverse edge
    /// with its own independent weight draw.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidWeight`] when the sampler produces a
    /// negative or non-finite value.
    pub fn from_edges<I, S>(pairs: I, sampler: &mut S, bidirectional: bool) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
        S: RateSampler + ?Sized,
    {
        let mut edges = Vec::new();
        let mut push = |source: NodeId, target: NodeId, sampler: &mut S| -> Result<()> {
            let weight = sampler.sample();
            if !weight.is_finite() || weight < 0.0 {
                return Err(NetworkError::InvalidWeight {
                    source_node: source,
                    target,
                    weight,
                });
            }
            edges.push(Edge {
                source,
                target,
                weight,
            });
            Ok(())
        };
        for (source, target) in pairs {
            push(source, target, sampler)?;
            if bidirectional {
                push(target, source, sampler)?;
            }
        }
        Ok(Self::from_edge_records(edges))
    }

    fn from_edge_records(edges: Vec<Edge>) -> Self {
        let node_count = edges
            .iter()
            .map(|edge| edge.source.max(edge.target) + 1)
            .max()
            .unwrap_or(0);
        let mut outgoing = vec![Vec::new(); node_count];
        for (index, edge) in edges.iter().enumerate() {
            outgoing[edge.source].push(index);
        }
        for indices in &mut outgoing {
            indices.sort_by_key(|&index| (edges[index].target, index));
        }
        Self {
            edges,
            outgoing,
            measurement_probability: 1.0,
        }
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.outgoing.len()
    }

    /// Returns the number of directed edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Returns the sum of all residual capacities.
    #[must_use]
    pub fn total_capacity(&self) -> f64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }

    /// Returns, per node, the sum of residuals on its outgoing edges.
    #[must_use]
    pub fn node_capacities(&self) -> Vec<f64> {
        let mut capacities = vec![0.0; self.num_nodes()];
        for edge in &self.edges {
            capacities[edge.source] += edge.weight;
        }
        capacities
    }

    /// Returns the `(min, max)` in-degree across nodes.
    #[must_use]
    pub fn in_degree(&self) -> (usize, usize) {
        let mut degrees = vec![0_usize; self.num_nodes()];
        for edge in &self.edges {
            degrees[edge.target] += 1;
        }
        degree_extremes(&degrees)
    }

    /// Returns the `(min, max)` out-degree across nodes.
    #[must_use]
    pub fn out_degree(&self) -> (usize, usize) {
        let degrees: Vec<usize> = self.outgoing.iter().map(Vec::len).collect();
        degree_extremes(&degrees)
    }

    /// Returns the current residual capacities as `(source, target, weight)`
    /// triples, in edge insertion order.
    #[must_use]
    pub fn weights(&self) -> Vec<(NodeId, NodeId, f64)> {
        self.edges
            .iter()
            .map(|edge| (edge.source, edge.target, edge.weight))
            .collect()
    }

    /// Returns the measurement probability applied per entanglement swap.
    #[must_use]
    pub fn measurement_probability(&self) -> f64 {
        self.measurement_probability
    }

    /// Sets the measurement probability.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidMeasurementProbability`] and leaves
    /// the current value unchanged unless `probability` lies in `(0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::CapacityNetwork;
    ///
    /// let mut network = CapacityNetwork::from_weighted_edges([(0, 1, 1.0)])?;
    /// assert_eq!(network.measurement_probability(), 1.0);
    /// network.set_measurement_probability(0.5)?;
    /// assert!(network.set_measurement_probability(2.0).is_err());
    /// assert_eq!(network.measurement_probability(), 0.5);
    /// # Ok::<(), bellpair_core::NetworkError>(())
    /// ```
    pub fn set_measurement_probability(&mut self, probability: f64) -> Result<()> {
        if !probability.is_finite() || probability <= 0.0 || probability > 1.0 {
            return Err(NetworkError::InvalidMeasurementProbability { probability });
        }
        self.measurement_probability = probability;
        Ok(())
    }

    /// Adds `delta` to the residual of every edge along the path
    /// `source -> hops[0] -> hops[1] -> ...`.
    ///
    /// All edges are validated before any residual changes, so a failed
    /// call leaves the network untouched. A negative `delta` releases
    /// capacity and must not drive any residual below zero.
    ///
    /// # Errors
    /// - [`NetworkError::NodeOutOfRange`] for an unknown node identifier.
    /// - [`NetworkError::NonFiniteDelta`] for a NaN or infinite delta.
    /// - [`NetworkError::MissingEdge`] when a step has no matching edge.
    /// - [`NetworkError::CapacityUnderflow`] when a negative delta exceeds
    ///   a residual.
    ///
    /// # Examples
    /// ```
    /// use bellpair_core::CapacityNetwork;
    ///
    /// let mut network = CapacityNetwork::from_weighted_edges([(0, 1, 2.0), (1, 2, 2.0)])?;
    /// network.add_capacity_to_path(0, &[1, 2], 3.0)?;
    /// assert_eq!(network.total_capacity(), 10.0);
    /// network.add_capacity_to_path(0, &[1, 2], -3.0)?;
    /// assert_eq!(network.total_capacity(), 4.0);
    /// # Ok::<(), bellpair_core::NetworkError>(())
    /// ```
    pub fn add_capacity_to_path(&mut self, source: NodeId, hops: &[NodeId], delta: f64) -> Result<()> {
        if !delta.is_finite() {
            return Err(NetworkError::NonFiniteDelta { delta });
        }
        self.validate_node(source)?;
        for &hop in hops {
            self.validate_node(hop)?;
        }

        let mut indices = Vec::with_capacity(hops.len());
        let mut previous = source;
        for &hop in hops {
            let index = self
                .find_edge(previous, hop)
                .ok_or(NetworkError::MissingEdge {
                    source_node: previous,
                    target: hop,
                })?;
            indices.push(index);
            previous = hop;
        }

        if delta < 0.0 {
            // A path may in principle revisit an edge, so account for the
            // cumulative change per edge before committing anything.
            let mut pending: Vec<(usize, f64)> = Vec::with_capacity(indices.len());
            for &index in &indices {
                let applied = match pending.iter_mut().find(|(seen, _)| *seen == index) {
                    Some((_, total)) => {
                        *total += delta;
                        *total
                    }
                    None => {
                        pending.push((index, delta));
                        delta
                    }
                };
                let edge = &self.edges[index];
                if edge.weight + applied < 0.0 {
                    return Err(NetworkError::CapacityUnderflow {
                        source_node: edge.source,
                        target: edge.target,
                        residual: edge.weight,
                        delta,
                    });
                }
            }
        }

        for index in indices {
            self.edges[index].weight += delta;
        }
        Ok(())
    }

    /// Writes a Graphviz rendition of the network, labelling each edge with
    /// its residual weight.
    ///
    /// # Errors
    /// Propagates failures of the underlying writer.
    pub fn write_dot<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "digraph G {{")?;
        for node in 0..self.num_nodes() {
            writeln!(writer, "{node};")?;
        }
        for edge in &self.edges {
            writeln!(
                writer,
                "{}->{} [label=\"{}\"];",
                edge.source, edge.target, edge.weight
            )?;
        }
        writeln!(writer, "}}")
    }

    /// Writes the Graphviz rendition to the file at `path`.
    ///
    /// # Errors
    /// Returns [`NetworkError::Io`] when the file cannot be created or
    /// written.
    pub fn to_dot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source| NetworkError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = io::BufWriter::new(file);
        self.write_dot(&mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)
    }

    pub(crate) fn validate_node(&self, node: NodeId) -> Result<()> {
        if node >= self.num_nodes() {
            return Err(NetworkError::NodeOutOfRange {
                node,
                node_count: self.num_nodes(),
            });
        }
        Ok(())
    }

    /// Finds the first inserted edge `source -> target`, if any.
    ///
    /// Parallel edges beyond the first are storage-only: routing and
    /// capacity adjustment always resolve a node pair to its first edge.
    pub(crate) fn find_edge(&self, source: NodeId, target: NodeId) -> Option<usize> {
        self.outgoing
            .get(source)?
            .iter()
            .copied()
            .find(|&index| self.edges[index].target == target)
    }

    pub(crate) fn edge_weight(&self, index: usize) -> f64 {
        self.edges[index].weight
    }

    pub(crate) fn subtract_weight(&mut self, index: usize, amount: f64) {
        self.edges[index].weight -= amount;
    }

    /// Gross rate needed on every edge of an `edge_count`-hop path so the
    /// destination sees `net_rate` after per-swap attenuation.
    pub(crate) fn to_gross_rate(&self, net_rate: f64, edge_count: usize) -> f64 {
        net_rate / self.swap_attenuation(edge_count)
    }

    /// End-to-end rate delivered when `gross_rate` is reserved on every
    /// edge of an `edge_count`-hop path.
    pub(crate) fn to_net_rate(&self, gross_rate: f64, edge_count: usize) -> f64 {
        gross_rate * self.swap_attenuation(edge_count)
    }

    fn swap_attenuation(&self, edge_count: usize) -> f64 {
        self.measurement_probability
            .powi(edge_count.saturating_sub(1) as i32)
    }
}

fn degree_extremes(degrees: &[usize]) -> (usize, usize) {
    let min = degrees.iter().copied().min().unwrap_or(0);
    let max = degrees.iter().copied().max().unwrap_or(0);
    (min, max)
}

#[cfg(test)]
mod tests;
