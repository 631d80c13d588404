//! Integration tests for CLI argument handling and cache-backed commands
//!
//! Every test here is offline-safe: commands either never touch the network
//! (metrics, status, argument errors) or are served entirely from a cache
//! seeded through the library.

use std::path::Path;
use std::process::Command;

use chrono::Utc;
use tempfile::TempDir;

use sdohmap::cache::CacheStore;
use sdohmap::data::{DatasetSnapshot, GeoRecord, GeographyLevel};

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sdohmap"))
        .args(args)
        .output()
        .expect("Failed to execute sdohmap")
}

/// Seeds a fresh state-level snapshot covering poverty-rate into `dir`.
fn seed_state_cache(dir: &Path) {
    let records = vec![
        GeoRecord {
            geo_id: "06".to_string(),
            geo_name: "California".to_string(),
            state_abbrev: "CA".to_string(),
            values: [("poverty-rate".to_string(), Some(12.2))]
                .into_iter()
                .collect(),
        },
        GeoRecord {
            geo_id: "28".to_string(),
            geo_name: "Mississippi".to_string(),
            state_abbrev: "MS".to_string(),
            values: [("poverty-rate".to_string(), Some(19.4))]
                .into_iter()
                .collect(),
        },
    ];
    let snapshot = DatasetSnapshot {
        level: GeographyLevel::State,
        fetched_at: Utc::now(),
        metric_ids: std::iter::once("poverty-rate".to_string()).collect(),
        records,
    };
    CacheStore::new(dir)
        .write(&snapshot)
        .expect("Failed to seed cache");
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sdohmap"), "Help should mention sdohmap");
    assert!(stdout.contains("show"), "Help should list the show command");
    assert!(
        stdout.contains("refresh"),
        "Help should list the refresh command"
    );
}

#[test]
fn test_metrics_command_works_offline() {
    let output = run_cli(&["metrics"]);
    assert!(output.status.success(), "metrics should not need network");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("median-income"));
    assert!(stdout.contains("poverty-rate"));
    assert!(stdout.contains("Greens"), "Should show the color scale");
}

#[test]
fn test_status_reports_empty_cache() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&["status", "--cache-dir", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("State level:"));
    assert!(stdout.contains("County level:"));
    assert!(
        stdout.matches("Nothing cached yet").count() == 2,
        "Both levels should be empty: {}",
        stdout
    );
}

#[test]
fn test_status_reports_seeded_cache() {
    let dir = TempDir::new().unwrap();
    seed_state_cache(dir.path());

    let output = run_cli(&["status", "--cache-dir", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 geographies"), "stdout: {}", stdout);
    assert!(stdout.contains("poverty-rate"));
    assert!(stdout.contains("fresh"));
    assert!(stdout.contains("Nothing cached yet"), "County still empty");
}

#[test]
fn test_show_serves_seeded_cache_offline() {
    let dir = TempDir::new().unwrap();
    seed_state_cache(dir.path());

    let output = run_cli(&[
        "show",
        "poverty-rate",
        "--cache-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "A fresh cache should serve without network: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Poverty Rate"));
    assert!(stdout.contains("19.4%"));
    // Descending rank: Mississippi (19.4) above California (12.2)
    let ms = stdout.find("Mississippi").expect("Mississippi row missing");
    let ca = stdout.find("California").expect("California row missing");
    assert!(ms < ca, "Rows should be ranked by value: {}", stdout);
}

#[test]
fn test_show_unknown_metric_prints_error_and_exits() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&[
        "show",
        "life-expectancy",
        "--cache-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success(), "Expected unknown metric to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unknown metric") && stderr.contains("life-expectancy"),
        "Should name the bad metric: {}",
        stderr
    );
}

#[test]
fn test_show_invalid_level_prints_error_and_exits() {
    let output = run_cli(&["show", "poverty-rate", "--level", "city"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid level"),
        "Should reject the level before fetching: {}",
        stderr
    );
}

#[test]
fn test_export_csv_to_stdout() {
    let dir = TempDir::new().unwrap();
    seed_state_cache(dir.path());

    let output = run_cli(&[
        "export",
        "poverty-rate",
        "--cache-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let header = stdout.lines().next().unwrap_or_default();
    assert_eq!(
        header,
        "geo_id,geo_name,state_abbreviation,poverty-rate,fetched_at"
    );
    assert!(stdout.contains("28,Mississippi,MS,19.4,"));
}

#[test]
fn test_export_invalid_format_prints_error_and_exits() {
    let output = run_cli(&["export", "--format", "pdf"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid format"),
        "Should reject the format before fetching: {}",
        stderr
    );
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use chrono::Duration;
    use clap::Parser;
    use std::path::PathBuf;

    use sdohmap::cli::{parse_format_arg, parse_level_arg, Cli, Command, ExportFormat};
    use sdohmap::data::GeographyLevel;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["sdohmap", "metrics"]);
        assert_eq!(cli.cache_dir, PathBuf::from("."));
        assert_eq!(cli.ttl_days, 7);
    }

    #[test]
    fn test_cli_global_options_anywhere() {
        let cli = Cli::parse_from(["sdohmap", "status", "--ttl-days", "14"]);
        assert_eq!(cli.ttl_days, 14);
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_manager_config_uses_ttl_days() {
        let cli = Cli::parse_from(["sdohmap", "--ttl-days", "2", "status"]);
        assert_eq!(cli.manager_config().ttl, Duration::days(2));
    }

    #[test]
    fn test_parse_level_arg_accepts_both_levels() {
        assert_eq!(parse_level_arg("state").unwrap(), GeographyLevel::State);
        assert_eq!(parse_level_arg("county").unwrap(), GeographyLevel::County);
    }

    #[test]
    fn test_parse_level_arg_invalid_returns_error() {
        assert!(parse_level_arg("planet").is_err());
    }

    #[test]
    fn test_parse_format_arg_accepts_csv_and_report() {
        assert_eq!(parse_format_arg("csv").unwrap(), ExportFormat::Csv);
        assert_eq!(parse_format_arg("report").unwrap(), ExportFormat::Report);
    }

    #[test]
    fn test_parse_format_arg_invalid_returns_error() {
        assert!(parse_format_arg("pdf").is_err());
    }
}
