//! Bellpair core library.
//!
//! A capacity-constrained model of an entanglement distribution network:
//! repeater nodes joined by rate-limited links over which end-to-end flows
//! and multi-peer apps are admitted along shortest feasible paths. Each
//! intermediate swap succeeds with the network's measurement probability,
//! so the rate reserved on a path's edges exceeds the rate its endpoints
//! see.
//!
//! Topologies either come from explicit edge lists or from the Poisson
//! point process factory, which redraws until the sampled graph is
//! connected.
//!
//! # Examples
//! ```
//! use bellpair_core::{CapacityNetwork, FlowDescriptor};
//!
//! let mut network = CapacityNetwork::from_weighted_edges([
//!     (0, 1, 4.0),
//!     (1, 2, 4.0),
//!     (2, 3, 4.0),
//!     (0, 4, 1.0),
//!     (4, 3, 4.0),
//! ])?;
//!
//! let mut flows = vec![FlowDescriptor::new(0, 3, 1.0)];
//! network.route_flows(&mut flows)?;
//! assert_eq!(flows[0].path(), &[4, 3]);
//! assert_eq!(network.total_capacity(), 15.0);
//! # Ok::<(), bellpair_core::NetworkError>(())
//! ```

mod error;
mod geometry;
mod network;
mod sampler;
mod topology;

pub use crate::{
    error::{NetworkError, NetworkErrorCode, Result},
    geometry::{Coordinate, PoissonPointProcess},
    network::{
        Allocation, AppDescriptor, CapacityNetwork, FlowDescriptor, NodeId, PathCandidate,
        Reachability,
    },
    sampler::{FnSampler, RateSampler, UniformRateSampler},
    topology::{
        bigraph_connected, find_links, make_capacity_network_from_links,
        make_capacity_network_ppp,
    },
};
