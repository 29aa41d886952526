//! Human-readable console summaries, one per table

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::experiment::{GroupSummary, JobRecord};
use crate::significance::{format_delta, format_p, ComparisonResult};

use super::tables::LongRow;

/// Aggregated groups, one paragraph each.
///
/// # Errors
/// Returns error if the sink fails
pub fn print_aggregated<W: Write>(
    out: &mut W,
    summaries: &[GroupSummary],
    metrics: &[String],
) -> io::Result<()> {
    writeln!(out, "\nAggregated TEST results (mean ± std)\n")?;
    if summaries.is_empty() {
        writeln!(out, "No results: no job produced a complete set of test metrics.")?;
        return Ok(());
    }

    for summary in summaries {
        writeln!(
            out,
            "Dataset: {}, Config {}, Seeds: {}",
            summary.dataset, summary.config_id, summary.num_seeds
        )?;
        for metric in metrics {
            if let Some(stat) = summary.stat(metric) {
                writeln!(out, "  {metric}: {}", stat.mean_pm())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Top-K records per dataset.
///
/// # Errors
/// Returns error if the sink fails
pub fn print_topk<W: Write>(
    out: &mut W,
    selected: &BTreeMap<String, Vec<&JobRecord>>,
    metrics: &[String],
    ranked_by: &str,
    k: usize,
) -> io::Result<()> {
    writeln!(
        out,
        "\nTop-{k} configurations per dataset (by TEST {ranked_by})\n"
    )?;
    if selected.is_empty() {
        writeln!(out, "No results: no job produced a complete set of test metrics.")?;
        return Ok(());
    }

    for (dataset, records) in selected {
        writeln!(out, "Dataset: {dataset}")?;
        for (rank, record) in records.iter().enumerate() {
            let values: Vec<String> = metrics
                .iter()
                .filter_map(|m| record.metric(m).map(|v| format!("{m}={v:.4}")))
                .collect();
            writeln!(
                out,
                "  #{}: {} ({})",
                rank + 1,
                values.join(", "),
                record.job_key()
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Long-format rows as an aligned table.
///
/// # Errors
/// Returns error if the sink fails
pub fn print_long_format<W: Write>(
    out: &mut W,
    rows: &[LongRow],
    metrics: &[String],
) -> io::Result<()> {
    writeln!(out, "\nResults (paper / restored / adapter)\n")?;
    if rows.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(());
    }

    write!(out, "{:<12} {:<9}", "dataset", "method")?;
    for metric in metrics {
        write!(out, " {metric:<28}")?;
    }
    writeln!(out)?;

    for row in rows {
        write!(out, "{:<12} {:<9}", row.dataset, row.method.label())?;
        for cell in &row.cells {
            write!(out, " {cell:<28}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Significance rows, grouped by dataset.
///
/// # Errors
/// Returns error if the sink fails
pub fn print_significance<W: Write>(out: &mut W, results: &[ComparisonResult]) -> io::Result<()> {
    writeln!(out, "\nSignificance vs restored baseline\n")?;
    if results.is_empty() {
        writeln!(out, "No results: no dataset had both a baseline and a challenger.")?;
        return Ok(());
    }

    let mut current: Option<&str> = None;
    for result in results {
        if current != Some(result.dataset.as_str()) {
            writeln!(
                out,
                "Dataset: {} (config {} vs {})",
                result.dataset, result.challenger_config, result.baseline_config
            )?;
            current = Some(result.dataset.as_str());
        }
        writeln!(
            out,
            "  {:<10} delta {:>9}  p_welch {}  p_student {}",
            result.metric,
            format_delta(&result.delta_percent),
            format_p(&result.p_welch),
            format_p(&result.p_student),
        )?;
    }
    Ok(())
}
