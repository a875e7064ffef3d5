//! Deferred, seeded data generators.
//!
//! A [`DataGen`] is sampled together with the rest of a case but only produces
//! values when [`DataGen::generate`] is called, which the oracle does once per
//! case right before execution. Generation is pure: the same generator, shape
//! and dtype always produce the same tensor.

use autoscan_dtype::DType;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution as _;
use rand_distr::{Normal, Uniform};
use snafu::ensure;

use crate::error::*;
use crate::{Result, TensorData, shape};

/// Value distribution of a generator. Samples are drawn in `f64` and cast to
/// the element type (integers truncate toward zero).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// Uniform over `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f64, std: f64 },
}

impl Distribution {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Uniform { .. } => "uniform",
            Self::Normal { .. } => "normal",
        }
    }

    fn validate(&self) -> Result<()> {
        let distribution = self.name();
        match *self {
            Self::Uniform { low, high } => {
                ensure!(
                    (high - low).is_finite(),
                    InvalidDistributionSnafu { distribution, reason: "bounds and their span must be finite" }
                );
                ensure!(
                    low < high,
                    InvalidDistributionSnafu { distribution, reason: format!("low {low} must be below high {high}") }
                );
            }
            Self::Normal { mean, std } => {
                ensure!(
                    mean.is_finite() && std.is_finite(),
                    InvalidDistributionSnafu { distribution, reason: "parameters must be finite" }
                );
                ensure!(
                    std >= 0.0,
                    InvalidDistributionSnafu { distribution, reason: format!("std {std} must be non-negative") }
                );
            }
        }
        Ok(())
    }
}

/// Zero-argument producer of one input tensor's values.
///
/// Stores only the distribution and a seed, so descriptors stay cheap to clone,
/// compare and print; values are materialized by [`DataGen::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataGen {
    pub distribution: Distribution,
    pub seed: u64,
}

impl DataGen {
    pub const fn new(distribution: Distribution, seed: u64) -> Self {
        Self { distribution, seed }
    }

    pub const fn uniform(low: f64, high: f64, seed: u64) -> Self {
        Self::new(Distribution::Uniform { low, high }, seed)
    }

    pub const fn normal(mean: f64, std: f64, seed: u64) -> Self {
        Self::new(Distribution::Normal { mean, std }, seed)
    }

    /// Materialize a tensor of `shape` and `dtype`.
    pub fn generate(&self, shape: &[usize], dtype: DType) -> Result<TensorData> {
        shape::validate_shape(shape)?;
        self.distribution.validate()?;

        let count = shape::numel(shape);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let samples: Vec<f64> = match self.distribution {
            Distribution::Uniform { low, high } => {
                let uniform = Uniform::new(low, high);
                (0..count).map(|_| uniform.sample(&mut rng)).collect()
            }
            Distribution::Normal { mean, std } => {
                let normal = Normal::new(mean, std)
                    .map_err(|e| InvalidDistributionSnafu { distribution: "normal", reason: e.to_string() }.build())?;
                (0..count).map(|_| normal.sample(&mut rng)).collect()
            }
        };

        tracing::trace!(
            seed = self.seed,
            distribution = self.distribution.name(),
            count,
            %dtype,
            "generated tensor data"
        );
        TensorData::from_f64(shape, dtype, &samples)
    }
}
