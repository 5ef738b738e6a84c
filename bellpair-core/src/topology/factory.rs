//! Factories producing connected capacity networks.

use tracing::debug;

use crate::{
    error::{NetworkError, Result},
    geometry::{Coordinate, PoissonPointProcess},
    network::{CapacityNetwork, NodeId},
    sampler::RateSampler,
};

use super::{bigraph_connected, find_links};

/// Upper bound on point-process draws before the factory gives up.
const MAX_ATTEMPTS: u32 = 1_000_000;

/// Stride between point-process seeds of consecutive attempts.
const SEED_STRIDE: u64 = 1_000_000;

/// Draws Poisson point topologies until one is connected and wraps it into
/// a bidirectional [`CapacityNetwork`] with rates from `sampler`.
///
/// Each attempt samples points on a `grid_length`-sided square and forms
/// links within `threshold` at `link_probability`. The point-process seed
/// advances by a fixed stride between attempts while the link-formation
/// seed stays at `seed`, so the link retention pattern is reproducible
/// across the retry sequence. Returns the network together with the point
/// positions that produced it.
///
/// # Errors
/// Propagates parameter validation failures from the point process, link
/// formation, and network construction; returns
/// [`NetworkError::Exhausted`] when no connected instance appears within
/// the attempt budget.
pub fn make_capacity_network_ppp<S>(
    sampler: &mut S,
    seed: u64,
    mean_points: f64,
    grid_length: f64,
    threshold: f64,
    link_probability: f64,
) -> Result<(CapacityNetwork, Vec<Coordinate>)>
where
    S: RateSampler + ?Sized,
{
    let mut process_seed = seed;
    for _ in 0..MAX_ATTEMPTS {
        let mut process =
            PoissonPointProcess::new(mean_points, process_seed, grid_length, grid_length)?;
        let coordinates = process.draw();
        let links = find_links(&coordinates, threshold, link_probability, seed)?;
        if bigraph_connected(&links) {
            let network = CapacityNetwork::from_edges(links, sampler, true)?;
            return Ok((network, coordinates));
        }
        debug!(
            seed = process_seed,
            points = coordinates.len(),
            "draw not connected, retrying"
        );
        process_seed = process_seed.wrapping_add(SEED_STRIDE);
    }
    Err(NetworkError::Exhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Wraps an externally produced link list (for instance, one read from a
/// GraphML document) into a bidirectional [`CapacityNetwork`] with rates
/// from `sampler`.
///
/// # Errors
/// Returns [`NetworkError::NotConnected`] when the links do not join all
/// mentioned nodes, and propagates construction failures.
pub fn make_capacity_network_from_links<S>(
    sampler: &mut S,
    links: &[(NodeId, NodeId)],
) -> Result<CapacityNetwork>
where
    S: RateSampler + ?Sized,
{
    if !bigraph_connected(links) {
        return Err(NetworkError::NotConnected);
    }
    CapacityNetwork::from_edges(links.iter().copied(), sampler, true)
}
