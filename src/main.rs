//! Availability checker binary

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uptime_checker::alert::EXIT_OPERATIONAL_ERROR;
use uptime_checker::{Config, RunReport, UptimeChecker};

#[derive(Parser, Debug)]
#[command(name = "uptime_checker", version, about = "Periodic multi-service availability checker")]
struct Cli {
    /// Path to the key=url targets file
    #[arg(long, env = "TARGETS_PATH")]
    targets: Option<PathBuf>,

    /// Directory holding per-target history logs
    #[arg(long, env = "HISTORY_DIR")]
    history_dir: Option<PathBuf>,

    /// Re-run every N seconds instead of exiting after one pass
    #[arg(long, env = "CHECK_INTERVAL_SECONDS")]
    interval: Option<u64>,

    /// Write the JSON run report to this path
    #[arg(long, env = "REPORT_PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_tracing();

    info!("Starting availability checker v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env();
    if let Some(targets) = cli.targets {
        config.targets_path = targets;
    }
    if let Some(history_dir) = cli.history_dir {
        config.history_dir = history_dir;
    }
    if let Some(seconds) = cli.interval {
        config.check_interval = std::time::Duration::from_secs(seconds);
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        std::process::exit(EXIT_OPERATIONAL_ERROR);
    }

    info!(
        "Checker configuration - Targets: {}, History: {}, Attempts: {}, Retention: {}",
        config.targets_path.display(),
        config.history_dir.display(),
        config.max_attempts,
        config.retention
    );

    let watch = !config.check_interval.is_zero();

    let checker = match UptimeChecker::new(config) {
        Ok(checker) => checker,
        Err(e) => {
            error!("Failed to create checker: {}", e);
            std::process::exit(EXIT_OPERATIONAL_ERROR);
        }
    };

    if watch {
        if let Err(e) = checker.watch().await {
            error!("Checker failed: {}", e);
            std::process::exit(EXIT_OPERATIONAL_ERROR);
        }
        return;
    }

    let report = match checker.run_once().await {
        Ok(report) => report,
        Err(e) => {
            error!("Run failed: {}", e);
            std::process::exit(EXIT_OPERATIONAL_ERROR);
        }
    };

    print_summary(&report);

    if let Some(path) = cli.report {
        if let Err(e) = write_report(&report, &path) {
            error!("Failed to write report to {}: {}", path.display(), e);
            std::process::exit(EXIT_OPERATIONAL_ERROR);
        }
        info!("Wrote run report to {}", path.display());
    }

    std::process::exit(report.exit_code());
}

/// Print the per-target summary table
fn print_summary(report: &RunReport) {
    let key_width = report
        .targets
        .iter()
        .map(|t| t.key.len())
        .max()
        .unwrap_or(0)
        .max("KEY".len());

    println!("{:<key_width$}  {:<7}  {:>8}  URL", "KEY", "STATUS", "UPTIME");
    for target in &report.targets {
        let uptime = match target.uptime_percent {
            Some(percent) => format!("{:.2}%", percent),
            None => "no data".to_string(),
        };
        println!(
            "{:<key_width$}  {:<7}  {:>8}  {}",
            target.key, target.status, uptime, target.url
        );
    }

    println!();
    if report.down.is_empty() {
        println!("Verdict: {}", report.verdict);
    } else {
        println!("Verdict: {} (down: {})", report.verdict, report.down.join(", "));
    }
}

/// Serialize the run report for webhook/notification collaborators
fn write_report(report: &RunReport, path: &Path) -> uptime_checker::Result<()> {
    let payload = serde_json::to_string_pretty(report)?;
    std::fs::write(path, payload)?;
    Ok(())
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
