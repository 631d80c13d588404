//! Command-line interface parsing for the SDOH map data tool
//!
//! This module handles parsing of CLI arguments using clap. Global options
//! select the cache directory and freshness window shared by every command;
//! the handlers themselves live in the binary.

use std::path::PathBuf;

use chrono::Duration;
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::GeographyLevel;
use crate::manager::ManagerConfig;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified geography level is not recognized
    #[error("Invalid level: '{0}'. Valid levels: state, county")]
    InvalidLevel(String),

    /// The specified export format is not recognized
    #[error("Invalid format: '{0}'. Valid formats: csv, report")]
    InvalidFormat(String),
}

/// SDOH Map CLI - cached social-determinants data from the Census ACS
#[derive(Parser, Debug)]
#[command(name = "sdohmap")]
#[command(about = "Social-determinants-of-health data by state and county, cached locally")]
#[command(version)]
pub struct Cli {
    /// Directory holding the cache files
    #[arg(long, global = true, value_name = "PATH", default_value = ".")]
    pub cache_dir: PathBuf,

    /// Days before a cached snapshot counts as stale
    #[arg(long, global = true, value_name = "DAYS", default_value_t = 7)]
    pub ttl_days: i64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the supported metrics
    Metrics,

    /// Display one metric as a ranked table, fetching if the cache is cold
    Show {
        /// Metric id (run `metrics` for the list)
        metric: String,

        /// Geography granularity: state or county
        #[arg(long, value_name = "LEVEL", default_value = "state")]
        level: String,

        /// Restrict county rows to one state (postal abbreviation)
        #[arg(long, value_name = "ABBREV")]
        state: Option<String>,

        /// Maximum number of rows to print
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Report what is cached for each geography level
    Status,

    /// Refetch from the remote source now, bypassing the freshness check
    Refresh {
        /// Geography granularity; refreshes both levels when omitted
        #[arg(long, value_name = "LEVEL")]
        level: Option<String>,

        /// Metric ids to refresh (default: the full registry)
        metrics: Vec<String>,
    },

    /// Write a snapshot as CSV or a plain-text summary report
    Export {
        /// Metric ids to include (default: the full registry)
        metrics: Vec<String>,

        /// Geography granularity: state or county
        #[arg(long, value_name = "LEVEL", default_value = "state")]
        level: String,

        /// Output format: csv or report
        #[arg(long, value_name = "FORMAT", default_value = "csv")]
        format: String,

        /// Output file; '-' writes to stdout
        #[arg(long, value_name = "PATH", default_value = "-")]
        output: PathBuf,
    },
}

impl Cli {
    /// Manager configuration derived from the global options.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            cache_dir: self.cache_dir.clone(),
            ttl: Duration::days(self.ttl_days),
            ..ManagerConfig::default()
        }
    }
}

/// Output format for the export command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Report,
}

impl ExportFormat {
    /// Parses user input into an ExportFormat.
    ///
    /// Matching is case-insensitive. Returns `None` if the input doesn't
    /// match a format.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<ExportFormat> {
        match s.to_lowercase().trim() {
            "csv" => Some(ExportFormat::Csv),
            "report" | "text" | "txt" => Some(ExportFormat::Report),
            _ => None,
        }
    }
}

/// Parses a geography level string argument.
///
/// # Arguments
/// * `s` - The level string from CLI
///
/// # Returns
/// * `Ok(GeographyLevel)` if the string matches a valid level
/// * `Err(CliError::InvalidLevel)` if the string doesn't match
pub fn parse_level_arg(s: &str) -> Result<GeographyLevel, CliError> {
    GeographyLevel::from_str(s).ok_or_else(|| CliError::InvalidLevel(s.to_string()))
}

/// Parses an export format string argument.
pub fn parse_format_arg(s: &str) -> Result<ExportFormat, CliError> {
    ExportFormat::from_str(s).ok_or_else(|| CliError::InvalidFormat(s.to_string()))
}
