//! Planar geometry and the Poisson point process used for topology sampling.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Poisson};

use crate::error::{NetworkError, Result};

/// A point in the sampling rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    x: f64,
    y: f64,
}

impl Coordinate {
    /// Creates a coordinate from its components.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the horizontal component.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Returns the vertical component.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Returns the Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A homogeneous Poisson point process over a `width x height` rectangle.
///
/// `mean_points` is the expected number of points per draw; each draw pulls
/// the count from `Poisson(mean_points)` and places the points uniformly at
/// random in the rectangle. Draws advance the internal PRNG, so repeated
/// calls on the same instance yield different point sets.
///
/// # Examples
/// ```
/// use bellpair_core::PoissonPointProcess;
///
/// let mut process = PoissonPointProcess::new(10.0, 42, 1000.0, 1.0)?;
/// for point in process.draw() {
///     assert!((0.0..=1000.0).contains(&point.x()));
///     assert!((0.0..=1.0).contains(&point.y()));
/// }
/// # Ok::<(), bellpair_core::NetworkError>(())
/// ```
#[derive(Clone, Debug)]
pub struct PoissonPointProcess {
    count: Poisson<f64>,
    width: f64,
    height: f64,
    rng: SmallRng,
}

impl PoissonPointProcess {
    /// Creates a process with the given expected point count, seed, and
    /// rectangle sides.
    ///
    /// # Errors
    /// Returns [`NetworkError::InvalidIntensity`] when `mean_points` is not
    /// positive and finite, and [`NetworkError::InvalidGridDimension`] when
    /// either side is not positive and finite.
    pub fn new(mean_points: f64, seed: u64, width: f64, height: f64) -> Result<Self> {
        if !mean_points.is_finite() || mean_points <= 0.0 {
            return Err(NetworkError::InvalidIntensity { mean_points });
        }
        if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
            return Err(NetworkError::InvalidGridDimension { width, height });
        }
        let count =
            Poisson::new(mean_points).map_err(|_| NetworkError::InvalidIntensity { mean_points })?;
        Ok(Self {
            count,
            width,
            height,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /// Draws one point set. The empty draw is possible.
    pub fn draw(&mut self) -> Vec<Coordinate> {
        let count = self.count.sample(&mut self.rng) as usize;
        (0..count)
            .map(|_| {
                Coordinate::new(
                    self.rng.gen_range(0.0..=self.width),
                    self.rng.gen_range(0.0..=self.height),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    #[test]
    fn coordinates_measure_euclidean_distance() {
        let origin = Coordinate::new(0.0, 0.0);
        let point = Coordinate::new(3.0, 4.0);
        assert_eq!(origin.distance_to(&point), 5.0);
        assert_eq!(point.distance_to(&origin), 5.0);
    }

    #[test]
    fn draws_stay_inside_the_rectangle() {
        let mut process =
            PoissonPointProcess::new(10.0, 42, 1000.0, 1.0).expect("parameters must be valid");
        for _ in 0..20 {
            for point in process.draw() {
                assert!((0.0..=1000.0).contains(&point.x()));
                assert!((0.0..=1.0).contains(&point.y()));
            }
        }
    }

    #[test]
    fn draw_sizes_follow_the_expected_count() {
        let mut process =
            PoissonPointProcess::new(10.0, 42, 1000.0, 1.0).expect("parameters must be valid");
        let sizes: Vec<usize> = (0..200).map(|_| process.draw().len()).collect();

        let mean = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
        assert!(
            (5.0..=20.0).contains(&mean),
            "sample mean {mean} is far from the configured 10"
        );

        let distinct: BTreeSet<usize> = sizes.iter().copied().collect();
        assert!(
            distinct.len() >= 5,
            "expected varied draw sizes, got {distinct:?}"
        );
    }

    #[test]
    fn consecutive_draws_differ() {
        let mut process =
            PoissonPointProcess::new(10.0, 7, 100.0, 100.0).expect("parameters must be valid");
        let first = process.draw();
        let second = process.draw();
        assert_ne!(first, second);
    }

    #[test]
    fn identical_seeds_reproduce_draws() {
        let mut left =
            PoissonPointProcess::new(10.0, 13, 50.0, 50.0).expect("parameters must be valid");
        let mut right =
            PoissonPointProcess::new(10.0, 13, 50.0, 50.0).expect("parameters must be valid");
        assert_eq!(left.draw(), right.draw());
        assert_eq!(left.draw(), right.draw());
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            PoissonPointProcess::new(0.0, 0, 1.0, 1.0),
            Err(NetworkError::InvalidIntensity { .. })
        ));
        assert!(matches!(
            PoissonPointProcess::new(-3.0, 0, 1.0, 1.0),
            Err(NetworkError::InvalidIntensity { .. })
        ));
        assert!(matches!(
            PoissonPointProcess::new(1.0, 0, 0.0, 1.0),
            Err(NetworkError::InvalidGridDimension { .. })
        ));
        assert!(matches!(
            PoissonPointProcess::new(1.0, 0, 1.0, f64::NAN),
            Err(NetworkError::InvalidGridDimension { .. })
        ));
    }
}
