//! Metric Record - the test metrics of one job

use serde::{Deserialize, Serialize};

/// One named metric value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricValue {
    /// Metric name (e.g. `recall@10`)
    pub name: String,
    /// Parsed value
    pub value: f64,
}

/// Metric Record maps every configured metric name to its value.
///
/// Records are complete by construction: the parser only builds one after
/// every designated metric was found, so [`get`](Self::get) on a configured
/// metric never returns `None` for a record that came out of the pipeline.
///
/// Entries keep the configured metric order, which is also the report
/// column order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    values: Vec<MetricValue>,
}

impl MetricRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs, preserving their order.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(name, value)| MetricValue {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Append a metric, replacing an earlier value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if let Some(existing) = self.values.iter_mut().find(|m| m.name == name) {
            existing.value = value;
        } else {
            self.values.push(MetricValue { name, value });
        }
    }

    /// Get the value of a metric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|m| m.name == name).map(|m| m.value)
    }

    /// Iterate metrics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricValue> {
        self.values.iter()
    }

    /// Number of metrics held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the record holds no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
