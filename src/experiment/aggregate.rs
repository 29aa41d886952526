//! Seed-level aggregate statistics
//!
//! Mean and sample standard deviation are accumulated incrementally
//! (Welford, 1962) so a group never needs a second pass over its values.

use serde::{Deserialize, Serialize};

/// Running mean/variance accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStat {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningStat {
    /// Empty accumulator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Add one observation
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Observations seen
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean, `None` when empty
    #[must_use]
    pub const fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean)
        }
    }

    /// Sample variance (n−1 divisor); 0.0 for n ≤ 1
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_variance(&self) -> f64 {
        if self.count <= 1 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0)
        }
    }

    /// Sample standard deviation; 0.0 for n ≤ 1
    #[must_use]
    pub fn sample_std(&self) -> f64 {
        self.sample_variance().sqrt()
    }

    /// Freeze into an [`AggregateStat`], `None` when empty
    #[must_use]
    pub fn finish(&self) -> Option<AggregateStat> {
        Some(AggregateStat {
            mean: self.mean()?,
            std: self.sample_std(),
            count: self.count,
        })
    }
}

impl FromIterator<f64> for RunningStat {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stat = Self::new();
        for value in iter {
            stat.push(value);
        }
        stat
    }
}

/// Per-metric summary of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (0.0 for a single observation)
    pub std: f64,
    /// Number of observations
    pub count: usize,
}

impl AggregateStat {
    /// Summarize a slice of values, `None` when empty
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        values.iter().copied().collect::<RunningStat>().finish()
    }

    /// `"0.0563 ± 0.0006"`
    #[must_use]
    pub fn mean_pm(&self) -> String {
        format_mean_pm(self.mean, self.std)
    }
}

/// Format a mean and std with 4 decimals each
#[must_use]
pub fn format_mean_pm(mean: f64, std: f64) -> String {
    format!("{mean:.4} ± {std:.4}")
}

/// Round to 4 decimal places
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Summary of one (dataset, configuration) group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Dataset
    pub dataset: String,
    /// Configuration id
    pub config_id: String,
    /// Distinct seeds that contributed a validated record
    pub num_seeds: usize,
    /// Per-metric statistics, in configured metric order
    pub stats: Vec<(String, AggregateStat)>,
}

impl GroupSummary {
    /// Statistics of one metric
    #[must_use]
    pub fn stat(&self, metric: &str) -> Option<&AggregateStat> {
        self.stats
            .iter()
            .find(|(name, _)| name == metric)
            .map(|(_, stat)| stat)
    }
}
