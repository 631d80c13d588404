//! SDOH Map CLI - social-determinants-of-health data by state and county
//!
//! Fetches socioeconomic indicators from the Census ACS 1-year profile API,
//! caches them on disk, and serves ranked tables, cache status, and exports
//! from the cache whenever it is fresh enough.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sdohmap::cli::{parse_format_arg, parse_level_arg, Cli, Command, ExportFormat};
use sdohmap::data::{states, GeoRecord, GeographyLevel};
use sdohmap::export;
use sdohmap::manager::{age_display, DataError, DataManager, SnapshotData};
use sdohmap::metrics::{self, MetricDef};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=sdohmap=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut manager = DataManager::new(cli.manager_config());

    match cli.command {
        Command::Metrics => run_metrics(),
        Command::Show {
            metric,
            level,
            state,
            limit,
        } => run_show(&mut manager, &metric, &level, state.as_deref(), limit).await,
        Command::Status => run_status(&mut manager),
        Command::Refresh { level, metrics } => {
            run_refresh(&mut manager, level.as_deref(), &metrics).await
        }
        Command::Export {
            metrics,
            level,
            format,
            output,
        } => run_export(&mut manager, &metrics, &level, &format, &output).await,
    }
}

/// Lists the metric registry. Works offline.
fn run_metrics() -> Result<()> {
    println!("Supported metrics:");
    println!();
    for metric in metrics::all_metrics() {
        println!(
            "  {:<20} {} [{}, {}, {} scale]",
            metric.id,
            metric.name,
            metric.unit.label(),
            metric.polarity.label(),
            metric.polarity.color_scale()
        );
        println!("      {}", metric.description);
    }
    Ok(())
}

/// Prints one metric as a ranked table, fetching if the cache is cold.
async fn run_show(
    manager: &mut DataManager,
    metric_id: &str,
    level: &str,
    state: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let level = parse_level_arg(level)?;
    let metric = metrics::lookup(metric_id)?;
    let state = match state {
        Some(raw) => Some(
            states::state_by_abbrev(raw)
                .ok_or_else(|| anyhow!("Unknown state abbreviation: '{}'", raw))?,
        ),
        None => None,
    };

    let served = fetch_or_explain(manager, level, &[metric.id]).await?;
    if served.stale {
        println!(
            "Warning: the Census API is unreachable; showing cached data from {}.",
            served.age_display(Utc::now())
        );
        println!();
    }

    let mut records: Vec<&GeoRecord> = match state {
        Some(state) => served.snapshot.records_for_state(state.abbrev),
        None => served.snapshot.records.iter().collect(),
    };
    records.sort_by(|a, b| rank_order(a.value(metric.id), b.value(metric.id)));
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    println!(
        "{} ({}) - {} level, data fetched {}",
        metric.name,
        metric.id,
        served.snapshot.level.display_name(),
        served.snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!();
    for (rank, record) in records.iter().enumerate() {
        println!(
            "{:>4}. {:<44} {:<4} {:>12}",
            rank + 1,
            record.geo_name,
            record.state_abbrev,
            metric.format_value(record.value(metric.id))
        );
    }
    if records.is_empty() {
        println!("  (no rows)");
    }

    if level == GeographyLevel::County {
        println!();
        println!("Note: ACS 1-year estimates cover counties with 65,000+ residents.");
    }
    Ok(())
}

/// Reports what is cached for each geography level.
fn run_status(manager: &mut DataManager) -> Result<()> {
    for level in [GeographyLevel::State, GeographyLevel::County] {
        println!("{} level:", level.display_name());
        match manager.metadata(level) {
            Some(meta) => {
                let ids: Vec<&str> = meta.metric_ids.iter().map(String::as_str).collect();
                println!(
                    "  {} geographies, fetched {} ({}), {}",
                    meta.records,
                    meta.fetched_at.format("%Y-%m-%d %H:%M UTC"),
                    age_display(Utc::now() - meta.fetched_at),
                    if meta.stale { "stale" } else { "fresh" }
                );
                println!("  Metrics: {}", ids.join(", "));
            }
            None => {
                println!("  Nothing cached yet");
            }
        }
    }
    Ok(())
}

/// Refetches from the remote source, bypassing the freshness check.
async fn run_refresh(
    manager: &mut DataManager,
    level: Option<&str>,
    metric_ids: &[String],
) -> Result<()> {
    let levels = match level {
        Some(raw) => vec![parse_level_arg(raw)?],
        None => vec![GeographyLevel::State, GeographyLevel::County],
    };
    let ids: Vec<&str> = metric_ids.iter().map(String::as_str).collect();

    for level in levels {
        let served = manager
            .refresh(level, &ids)
            .await
            .with_context(|| format!("failed to refresh {} data", level.label()))?;
        println!(
            "Refreshed {} level: {} geographies, {} metrics, fetched {}",
            level.label(),
            served.snapshot.records.len(),
            served.snapshot.metric_ids.len(),
            served.snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}

/// Writes a snapshot as CSV or a plain-text report.
async fn run_export(
    manager: &mut DataManager,
    metric_ids: &[String],
    level: &str,
    format: &str,
    output: &Path,
) -> Result<()> {
    let level = parse_level_arg(level)?;
    let format = parse_format_arg(format)?;
    let defs: Vec<&'static MetricDef> = if metric_ids.is_empty() {
        metrics::all_metrics().iter().collect()
    } else {
        metric_ids
            .iter()
            .map(|id| metrics::lookup(id))
            .collect::<Result<_, _>>()?
    };
    let ids: Vec<&str> = defs.iter().map(|m| m.id).collect();

    let served = fetch_or_explain(manager, level, &ids).await?;
    if served.stale {
        // Stale note goes to stderr so piped CSV output stays clean
        eprintln!(
            "Warning: the Census API is unreachable; exporting cached data from {}.",
            served.age_display(Utc::now())
        );
    }

    let content = match format {
        ExportFormat::Csv => export::to_csv(&served.snapshot),
        ExportFormat::Report => export::report(&served.snapshot, &defs, Utc::now()),
    };

    if output == Path::new("-") {
        print!("{}", content);
    } else {
        fs::write(output, &content)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("Wrote {}", output.display());
    }
    Ok(())
}

/// Runs a manager get, translating the no-data failure into a message that
/// distinguishes "source unreachable" from "nothing cached yet".
async fn fetch_or_explain(
    manager: &mut DataManager,
    level: GeographyLevel,
    ids: &[&str],
) -> Result<SnapshotData> {
    manager.get(level, ids).await.map_err(|e| match e {
        DataError::RemoteUnavailable(source) => anyhow!(
            "No {} data available: nothing cached yet and the Census API could not be reached ({})",
            level.label(),
            source
        ),
        other => anyhow!(other),
    })
}

/// Descending by value; geographies with no reported value sort last.
fn rank_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
