//! JSON report writer.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sweep_common::config::ScanConfig;
use sweep_common::models::{FailureCounts, ProbeOutcome, ScanReport};
use tracing::info;

/// What the user asked for, echoed back in the report.
pub struct ScanRequest<'a> {
    pub target_input: &'a str,
    pub ports_input: &'a str,
    pub config: &'a ScanConfig,
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub scan_start: DateTime<Utc>,
    pub scan_end: DateTime<Utc>,
    pub duration_seconds: f64,
    pub config: JsonConfig<'a>,
    pub summary: JsonSummary,
    pub findings: &'a [ProbeOutcome],
}

#[derive(Debug, Serialize)]
pub struct JsonConfig<'a> {
    pub target_input: &'a str,
    pub ports_input: &'a str,
    pub target_count: usize,
    pub ports_count: usize,
    pub total_scans: usize,
    pub threads: usize,
    pub timeout: f64,
    pub banner_grab: bool,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub open_ports_found: usize,
    pub closed_or_filtered: usize,
    pub failures: FailureCounts,
    pub cancelled: bool,
}

impl<'a> JsonReport<'a> {
    pub fn new(report: &'a ScanReport, request: &ScanRequest<'a>) -> Self {
        let stats = &report.stats;
        Self {
            scan_start: stats.start_time,
            scan_end: stats.end_time,
            duration_seconds: round_millis(stats.elapsed.as_secs_f64()),
            config: JsonConfig {
                target_input: request.target_input,
                ports_input: request.ports_input,
                target_count: stats.targets,
                ports_count: stats.ports,
                total_scans: stats.total,
                threads: request.config.workers,
                timeout: request.config.connect_timeout.as_secs_f64(),
                banner_grab: request.config.banner_enabled(),
            },
            summary: JsonSummary {
                open_ports_found: stats.open,
                closed_or_filtered: stats.closed_or_filtered(),
                failures: stats.failures,
                cancelled: report.cancelled,
            },
            findings: &report.open,
        }
    }
}

fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Writes the report to `dest`, or to stdout when `dest` is `-`.
pub fn write_json(report: &ScanReport, request: &ScanRequest<'_>, dest: &Path) -> anyhow::Result<()> {
    let document = serde_json::to_string_pretty(&JsonReport::new(report, request))
        .context("failed to serialize the scan report")?;

    if dest.as_os_str() == "-" {
        println!("{document}");
    } else {
        std::fs::write(dest, document + "\n")
            .with_context(|| format!("failed to write report to {}", dest.display()))?;
        info!("Full JSON report saved → {}", dest.display());
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
