//! Topology formation: link sampling, connectivity, and the retrying
//! factory that turns Poisson point draws into connected networks.

mod connectivity;
mod factory;

pub use connectivity::bigraph_connected;
pub use factory::{make_capacity_network_from_links, make_capacity_network_ppp};

use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::{
    error::{NetworkError, Result},
    geometry::Coordinate,
    network::NodeId,
};

/// Derives candidate links from point positions.
///
/// Every unordered pair of points within `threshold` of each other yields
/// two directed link candidates, one per direction; each candidate is
/// retained independently with probability `link_probability`. Node
/// identifiers are the point indices.
///
/// # Errors
/// Returns [`NetworkError::InvalidThreshold`] for a negative or non-finite
/// threshold and [`NetworkError::InvalidLinkProbability`] when
/// `link_probability` lies outside `[0, 1]`.
///
/// # Examples
/// ```
/// use bellpair_core::{Coordinate, find_links};
///
/// let coordinates = [Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)];
/// let links = find_links(&coordinates, 2.0, 1.0, 42)?;
/// assert_eq!(links, vec![(0, 1), (1, 0)]);
/// # Ok::<(), bellpair_core::NetworkError>(())
/// ```
pub fn find_links(
    coordinates: &[Coordinate],
    threshold: f64,
    link_probability: f64,
    seed: u64,
) -> Result<Vec<(NodeId, NodeId)>> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(NetworkError::InvalidThreshold { threshold });
    }
    if !link_probability.is_finite() || !(0.0..=1.0).contains(&link_probability) {
        return Err(NetworkError::InvalidLinkProbability {
            probability: link_probability,
        });
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut links = Vec::new();
    for i in 0..coordinates.len() {
        for j in (i + 1)..coordinates.len() {
            if coordinates[i].distance_to(&coordinates[j]) > threshold {
                continue;
            }
            if rng.gen_bool(link_probability) {
                links.push((i, j));
            }
            if rng.gen_bool(link_probability) {
                links.push((j, i));
            }
        }
    }
    Ok(links)
}
