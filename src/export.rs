//! Snapshot export helpers
//!
//! Pure functions that turn a dataset snapshot into portable output: a wide
//! CSV table (one row per geography) and a plain-text summary report. No
//! caching or fetching concerns live here.

use chrono::{DateTime, Utc};

use crate::data::DatasetSnapshot;
use crate::manager::age_display;
use crate::metrics::{self, MetricDef};

/// Summary statistics for one metric across a snapshot's geographies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    /// Number of geographies with a reported value
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Renders a snapshot as a wide CSV table.
///
/// Columns are `geo_id, geo_name, state_abbreviation`, one column per metric
/// id covered by the snapshot, then `fetched_at`. Missing values are empty
/// cells. Fields containing commas, quotes, or newlines are quoted (county
/// display names contain commas).
pub fn to_csv(snapshot: &DatasetSnapshot) -> String {
    let columns = metric_columns(snapshot);
    let fetched_at = snapshot.fetched_at.to_rfc3339();

    let mut header: Vec<String> = vec![
        "geo_id".to_string(),
        "geo_name".to_string(),
        "state_abbreviation".to_string(),
    ];
    header.extend(columns.iter().cloned());
    header.push("fetched_at".to_string());

    let mut out = header.join(",");
    out.push('\n');

    for record in &snapshot.records {
        let mut fields = vec![
            escape_csv(&record.geo_id),
            escape_csv(&record.geo_name),
            escape_csv(&record.state_abbrev),
        ];
        for column in &columns {
            fields.push(match record.value(column) {
                Some(value) => value.to_string(),
                None => String::new(),
            });
        }
        fields.push(fetched_at.clone());
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Summary statistics for one metric over the snapshot's non-null values.
///
/// Returns `None` when no geography reports a value for the metric.
pub fn summarize(snapshot: &DatasetSnapshot, metric_id: &str) -> Option<MetricSummary> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for record in &snapshot.records {
        if let Some(value) = record.value(metric_id) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
    }

    if count == 0 {
        return None;
    }
    Some(MetricSummary {
        count,
        mean: sum / count as f64,
        min,
        max,
    })
}

/// Renders a plain-text report over the snapshot: a header block followed by
/// one section per metric with its description, color scale, and summary
/// statistics in unit-aware formatting.
pub fn report(
    snapshot: &DatasetSnapshot,
    metrics: &[&'static MetricDef],
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "SDOH Metrics Report ({} level)",
        snapshot.level.display_name()
    ));
    lines.push(format!(
        "Generated: {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    lines.push(format!(
        "Data fetched: {} ({})",
        snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC"),
        age_display(snapshot.age(generated_at))
    ));
    lines.push(format!("Geographies: {}", snapshot.records.len()));

    for metric in metrics {
        lines.push(String::new());
        lines.push(format!("{} [{}]", metric.name, metric.id));
        lines.push(format!("  {}", metric.description));
        lines.push(format!(
            "  Scale: {} ({})",
            metric.polarity.color_scale(),
            metric.polarity.label()
        ));
        match summarize(snapshot, metric.id) {
            Some(summary) => {
                lines.push(format!(
                    "  Coverage: {} of {} geographies",
                    summary.count,
                    snapshot.records.len()
                ));
                lines.push(format!(
                    "  Mean: {}",
                    metric.format_value(Some(summary.mean))
                ));
                lines.push(format!(
                    "  Min: {} / Max: {}",
                    metric.format_value(Some(summary.min)),
                    metric.format_value(Some(summary.max))
                ));
            }
            None => {
                lines.push("  No data available in this snapshot".to_string());
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Metric columns for the CSV, in registry order.
///
/// Ids carried by older cache files that are no longer in the registry still
/// get a column, appended after the known ones.
fn metric_columns(snapshot: &DatasetSnapshot) -> Vec<String> {
    let mut columns: Vec<String> = metrics::all_metrics()
        .iter()
        .filter(|metric| snapshot.metric_ids.contains(metric.id))
        .map(|metric| metric.id.to_string())
        .collect();
    for id in &snapshot.metric_ids {
        if metrics::find(id).is_none() {
            columns.push(id.clone());
        }
    }
    columns
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
