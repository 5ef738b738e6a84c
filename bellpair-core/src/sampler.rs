//! Rate sampling seam used when constructing networks.
//!
//! The network never embeds a PRNG choice of its own: callers hand in any
//! source of non-negative reals, one draw per edge.

use rand::{Rng, SeedableRng, distributions::Uniform, rngs::SmallRng};

use crate::error::{NetworkError, Result};

/// A source of per-edge entanglement generation rates.
///
/// Implementations must return a non-negative finite value from every call;
/// network construction rejects anything else.
pub trait RateSampler {
    /// Draws the next rate.
    fn sample(&mut self) -> f64;
}

/// Adapts any `FnMut() -> f64` closure into a [`RateSampler`].
///
/// # Examples
/// ```
/// use bellpair_core::{CapacityNetwork, FnSampler, RateSampler};
///
/// let mut sampler = FnSampler::new(|| 2.0);
/// assert_eq!(sampler.sample(), 2.0);
///
/// let network = CapacityNetwork::from_edges([(0, 1), (1, 2)], &mut sampler, false)?;
/// assert_eq!(network.total_capacity(), 4.0);
/// # Ok::<(), bellpair_core::NetworkError>(())
/// ```
#[derive(Clone, Debug)]
pub struct FnSampler<F>(F);

impl<F> FnSampler<F>
where
    F: FnMut() -> f64,
{
    /// Wraps `draw` as a sampler.
    #[must_use]
    pub fn new(draw: F) -> Self {
        Self(draw)
    }
}

impl<F> RateSampler for FnSampler<F>
where
    F: FnMut() -> f64,
{
    fn sample(&mut self) -> f64 {
        (self.0)()
    }
}

/// A seeded sampler drawing rates uniformly from `[min, max]`.
///
/// # Examples
/// ```
/// use bellpair_core::{RateSampler, UniformRateSampler};
///
/// let mut sampler = UniformRateSampler::new(1.0, 5.0, 42)?;
/// let rate = sampler.sample();
/// assert!((1.0..=5.0).contains(&rate));
/// # Ok::<(), bellpair_core::NetworkError>(())
/// ```
#[derive(Clone, Debug)]
pub struct UniformRateSampler {
    rng: SmallRng,
    range: Uniform<f64>,
}

impl UniformRateSampler {
    /// Creates a sampler over `[min, max]` seeded with `seed`.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidRateRange`] unless
    /// `0 <= min <= max` and both bounds are finite.
    pub fn new(min: f64, max: f64, seed: u64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(NetworkError::InvalidRateRange { min, max });
        }
        Ok(Self {
            rng: SmallRng::seed_from_u64(seed),
            range: Uniform::new_inclusive(min, max),
        })
    }
}

impl RateSampler for UniformRateSampler {
    fn sample(&mut self) -> f64 {
        self.rng.sample(self.range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sampler_stays_in_range() {
        let mut sampler = UniformRateSampler::new(2.0, 3.0, 7).expect("range must be valid");
        for _ in 0..100 {
            let rate = sampler.sample();
            assert!((2.0..=3.0).contains(&rate), "rate {rate} out of range");
        }
    }

    #[test]
    fn uniform_sampler_is_deterministic_per_seed() {
        let mut left = UniformRateSampler::new(0.0, 10.0, 99).expect("range must be valid");
        let mut right = UniformRateSampler::new(0.0, 10.0, 99).expect("range must be valid");
        let first: Vec<f64> = (0..16).map(|_| left.sample()).collect();
        let second: Vec<f64> = (0..16).map(|_| right.sample()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn uniform_sampler_rejects_bad_ranges() {
        assert!(matches!(
            UniformRateSampler::new(5.0, 1.0, 0),
            Err(NetworkError::InvalidRateRange { .. })
        ));
        assert!(matches!(
            UniformRateSampler::new(-1.0, 1.0, 0),
            Err(NetworkError::InvalidRateRange { .. })
        ));
        assert!(matches!(
            UniformRateSampler::new(0.0, f64::INFINITY, 0),
            Err(NetworkError::InvalidRateRange { .. })
        ));
    }

    #[test]
    fn closures_adapt_into_samplers() {
        let mut counter = 0.0;
        let mut sampler = FnSampler::new(move || {
            counter += 1.0;
            counter
        });
        assert_eq!(sampler.sample(), 1.0);
        assert_eq!(sampler.sample(), 2.0);
    }
}
