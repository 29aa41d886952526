//! Significance of a challenger configuration against a baseline
//!
//! For each metric the engine reports:
//! - percent delta of the challenger mean over the baseline mean
//! - two-sided p-value of Welch's t-test (unequal variances)
//! - two-sided p-value of Student's t-test (pooled variance)
//!
//! Every number is an [`Outcome`]: either a value or the reason it is
//! undefined. Undefined values are never replaced by a numeric sentinel.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

use crate::experiment::RunningStat;

/// Why a statistic is undefined
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatsError {
    /// Percent delta against a baseline whose mean is exactly zero
    #[error("undefined (zero baseline mean)")]
    ZeroBaselineMean,

    /// A sample has fewer than two observations, so its variance is undefined
    #[error("insufficient data")]
    InsufficientData {
        /// Baseline observations
        baseline: usize,
        /// Challenger observations
        challenger: usize,
    },

    /// Both samples are constant, so the standard error is zero
    #[error("undefined (zero variance)")]
    ZeroVariance,

    /// An empty sample has no mean
    #[error("empty sample")]
    EmptySample,

    /// The t distribution could not be built (non-finite degrees of freedom)
    #[error("t distribution error: {0}")]
    Distribution(String),
}

/// A statistic or the reason it is undefined
pub type Outcome = std::result::Result<f64, StatsError>;

/// One row of the significance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Dataset
    pub dataset: String,
    /// Metric
    pub metric: String,
    /// Baseline configuration id
    pub baseline_config: String,
    /// Challenger configuration id
    pub challenger_config: String,
    /// 100 × (challenger − baseline) / baseline
    pub delta_percent: Outcome,
    /// Welch's t-test p-value
    pub p_welch: Outcome,
    /// Student's t-test p-value
    pub p_student: Outcome,
}

impl ComparisonResult {
    /// True if either test could not be computed for lack of samples
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        matches!(self.p_welch, Err(StatsError::InsufficientData { .. }))
    }
}

/// Per-seed values of one metric for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    /// Configuration id
    pub config_id: &'a str,
    /// One value per seed
    pub values: &'a [f64],
}

/// Stateless statistics over per-seed samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignificanceEngine;

impl SignificanceEngine {
    /// Create an engine
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compare `challenger` against `baseline` for one (dataset, metric).
    #[must_use]
    pub fn compare(
        &self,
        dataset: &str,
        metric: &str,
        baseline: Sample<'_>,
        challenger: Sample<'_>,
    ) -> ComparisonResult {
        ComparisonResult {
            dataset: dataset.to_string(),
            metric: metric.to_string(),
            baseline_config: baseline.config_id.to_string(),
            challenger_config: challenger.config_id.to_string(),
            delta_percent: percent_delta(baseline.values, challenger.values),
            p_welch: welch_t_test(challenger.values, baseline.values),
            p_student: student_t_test(challenger.values, baseline.values),
        }
    }
}

/// Percent change of the challenger mean over the baseline mean.
///
/// # Errors
///
/// [`StatsError::ZeroBaselineMean`] if the baseline mean is exactly zero,
/// [`StatsError::EmptySample`] if either sample is empty.
pub fn percent_delta(baseline: &[f64], challenger: &[f64]) -> Outcome {
    let base = sample_mean(baseline)?;
    let chal = sample_mean(challenger)?;
    percent_delta_of_means(base, chal)
}

/// Percent change between two means.
///
/// # Errors
///
/// [`StatsError::ZeroBaselineMean`] if `baseline_mean` is exactly zero.
pub fn percent_delta_of_means(baseline_mean: f64, challenger_mean: f64) -> Outcome {
    if baseline_mean == 0.0 {
        return Err(StatsError::ZeroBaselineMean);
    }
    Ok(100.0 * (challenger_mean - baseline_mean) / baseline_mean)
}

fn sample_mean(values: &[f64]) -> Outcome {
    values
        .iter()
        .copied()
        .collect::<RunningStat>()
        .mean()
        .ok_or(StatsError::EmptySample)
}

/// Mean, sample variance and size of a sample with at least two values.
fn moments(a: &[f64], b: &[f64]) -> Result<[(f64, f64, f64); 2], StatsError> {
    if a.len() < 2 || b.len() < 2 {
        return Err(StatsError::InsufficientData {
            baseline: b.len(),
            challenger: a.len(),
        });
    }
    let describe = |values: &[f64]| {
        let stat: RunningStat = values.iter().copied().collect();
        #[allow(clippy::cast_precision_loss)]
        let n = stat.count() as f64;
        (stat.mean().unwrap_or(0.0), stat.sample_variance(), n)
    };
    Ok([describe(a), describe(b)])
}

/// Two-sided p-value of Welch's t-test.
///
/// # Errors
///
/// [`StatsError::InsufficientData`] if either sample has fewer than two
/// values, [`StatsError::ZeroVariance`] if both samples are constant.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Outcome {
    let [(m1, v1, n1), (m2, v2, n2)] = moments(a, b)?;

    let s1 = v1 / n1;
    let s2 = v2 / n2;
    let se = (s1 + s2).sqrt();
    if se == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let t = (m1 - m2) / se;
    let df = (s1 + s2).powi(2) / (s1.powi(2) / (n1 - 1.0) + s2.powi(2) / (n2 - 1.0));
    two_sided_p(t, df)
}

/// Two-sided p-value of Student's t-test with pooled variance.
///
/// # Errors
///
/// Same as [`welch_t_test`].
pub fn student_t_test(a: &[f64], b: &[f64]) -> Outcome {
    let [(m1, v1, n1), (m2, v2, n2)] = moments(a, b)?;

    let df = n1 + n2 - 2.0;
    let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return Err(StatsError::ZeroVariance);
    }

    let t = (m1 - m2) / se;
    two_sided_p(t, df)
}

fn two_sided_p(t: f64, df: f64) -> Outcome {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| StatsError::Distribution(e.to_string()))?;
    Ok((2.0 * dist.sf(t.abs())).min(1.0))
}

/// `"+10.00%"`, or the undefined marker
#[must_use]
pub fn format_delta(delta: &Outcome) -> String {
    match delta {
        Ok(value) => format!("{value:+.2}%"),
        Err(reason) => reason.to_string(),
    }
}

/// p-value in shortest round-trip form, or the undefined marker
#[must_use]
pub fn format_p(p: &Outcome) -> String {
    match p {
        Ok(value) => value.to_string(),
        Err(reason) => reason.to_string(),
    }
}
