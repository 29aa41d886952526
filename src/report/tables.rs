//! Report table schemas
//!
//! Column order is part of the output contract:
//!
//! | table | columns |
//! |---|---|
//! | aggregated | `dataset, config_id, num_seeds, <m>_mean…, <m>_std…, <m>_mean_pm…` |
//! | long format | `dataset, method, <m>…` |
//! | significance | `dataset, metric, delta_percent, p_welch, p_student` |
//! | top-K | `dataset, <m>…, job, log_file` |

use std::fmt;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::experiment::{round4, GroupSummary, JobRecord};
use crate::significance::{format_delta, format_p, ComparisonResult};
use crate::Result;

/// Row label of the long-format table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Published reference values
    Paper,
    /// The baseline configuration reproduced across seeds
    Restored,
    /// The best non-baseline configuration
    Adapter,
}

impl Method {
    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Restored => "restored",
            Self::Adapter => "adapter",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the long-format table; `cells` follow the metric order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRow {
    /// Dataset
    pub dataset: String,
    /// Row label
    pub method: Method,
    /// Configuration id behind the row (`None` for paper rows)
    pub config_id: Option<String>,
    /// Formatted metric cells
    pub cells: Vec<String>,
}

fn utf8(name: &str) -> Field {
    Field::new(name, DataType::Utf8, false)
}

fn float(name: &str) -> Field {
    Field::new(name, DataType::Float64, false)
}

fn strings<I, S>(values: I) -> ArrayRef
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Arc::new(StringArray::from_iter_values(values))
}

fn floats<I: IntoIterator<Item = f64>>(values: I) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

/// Aggregated-results table.
///
/// Means are rounded to 4 decimals; standard deviations are kept at full
/// precision. A metric missing from a summary is written as NaN.
///
/// # Errors
/// Returns error if the batch cannot be assembled
pub fn aggregated_batch(summaries: &[GroupSummary], metrics: &[String]) -> Result<RecordBatch> {
    let mut fields = vec![
        utf8("dataset"),
        utf8("config_id"),
        Field::new("num_seeds", DataType::UInt64, false),
    ];
    fields.extend(metrics.iter().map(|m| float(&format!("{m}_mean"))));
    fields.extend(metrics.iter().map(|m| float(&format!("{m}_std"))));
    fields.extend(metrics.iter().map(|m| utf8(&format!("{m}_mean_pm"))));

    let mut columns: Vec<ArrayRef> = vec![
        strings(summaries.iter().map(|s| &s.dataset)),
        strings(summaries.iter().map(|s| &s.config_id)),
        Arc::new(UInt64Array::from_iter_values(
            summaries.iter().map(|s| s.num_seeds as u64),
        )),
    ];
    for metric in metrics {
        columns.push(floats(summaries.iter().map(|s| {
            s.stat(metric).map_or(f64::NAN, |st| round4(st.mean))
        })));
    }
    for metric in metrics {
        columns.push(floats(
            summaries
                .iter()
                .map(|s| s.stat(metric).map_or(f64::NAN, |st| st.std)),
        ));
    }
    for metric in metrics {
        columns.push(strings(summaries.iter().map(|s| {
            s.stat(metric).map_or_else(String::new, |st| st.mean_pm())
        })));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Long-format paper/restored/adapter table.
///
/// # Errors
/// Returns error if the batch cannot be assembled (row width ≠ metric count)
pub fn long_format_batch(rows: &[LongRow], metrics: &[String]) -> Result<RecordBatch> {
    let mut fields = vec![utf8("dataset"), utf8("method")];
    fields.extend(metrics.iter().map(|m| utf8(m)));

    let mut columns: Vec<ArrayRef> = vec![
        strings(rows.iter().map(|r| &r.dataset)),
        strings(rows.iter().map(|r| r.method.label())),
    ];
    for i in 0..metrics.len() {
        columns.push(strings(
            rows.iter()
                .map(|r| r.cells.get(i).map_or("", String::as_str)),
        ));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Significance table. Undefined values carry their marker text.
///
/// # Errors
/// Returns error if the batch cannot be assembled
pub fn significance_batch(results: &[ComparisonResult]) -> Result<RecordBatch> {
    let fields = vec![
        utf8("dataset"),
        utf8("metric"),
        utf8("delta_percent"),
        utf8("p_welch"),
        utf8("p_student"),
    ];
    let columns: Vec<ArrayRef> = vec![
        strings(results.iter().map(|r| &r.dataset)),
        strings(results.iter().map(|r| &r.metric)),
        strings(results.iter().map(|r| format_delta(&r.delta_percent))),
        strings(results.iter().map(|r| format_p(&r.p_welch))),
        strings(results.iter().map(|r| format_p(&r.p_student))),
    ];

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Top-K table: raw metric values of each selected job.
///
/// # Errors
/// Returns error if the batch cannot be assembled
pub fn topk_batch(selected: &[&JobRecord], metrics: &[String]) -> Result<RecordBatch> {
    let mut fields = vec![utf8("dataset")];
    fields.extend(metrics.iter().map(|m| float(m)));
    fields.push(utf8("job"));
    fields.push(utf8("log_file"));

    let mut columns: Vec<ArrayRef> = vec![strings(selected.iter().map(|r| r.dataset()))];
    for metric in metrics {
        columns.push(floats(
            selected
                .iter()
                .map(|r| r.metric(metric).unwrap_or(f64::NAN)),
        ));
    }
    columns.push(strings(selected.iter().map(|r| r.job_key())));
    columns.push(strings(selected.iter().map(|r| r.log_file())));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
