use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use colored::*;
use sweep_common::models::{ProbeOutcome, ScanReport};

use crate::commands::Config;
use crate::sprint;
use crate::terminal::{colors, print};

/// One line per open port, as it is found.
pub fn open_port_line(outcome: &ProbeOutcome) -> String {
    let endpoint = format!("{}:{}", outcome.target, outcome.port);
    let mut line = format!("{} {}", "[OPEN]".green().bold(), endpoint.color(colors::IPV4_ADDR));
    if let Some(banner) = &outcome.banner {
        line.push_str(&format!(" -> {}", banner.color(colors::BANNER)));
    }
    line
}

/// Open ports grouped by host, in address order.
pub fn group_by_host(open: &[ProbeOutcome]) -> BTreeMap<Ipv4Addr, Vec<&ProbeOutcome>> {
    let mut hosts: BTreeMap<Ipv4Addr, Vec<&ProbeOutcome>> = BTreeMap::new();
    for outcome in open {
        hosts.entry(outcome.target).or_default().push(outcome);
    }
    hosts
}

pub fn print_report(report: &ScanReport, cfg: &Config) {
    if report.open.is_empty() {
        print::header("no open ports", cfg.quiet);
        print::no_results("No open ports found");
    } else {
        print::header("open ports", cfg.quiet);
        if cfg.quiet < 2 {
            print_hosts(report);
        }
    }

    print_summary(report, cfg);
}

fn print_hosts(report: &ScanReport) {
    let hosts = group_by_host(&report.open);
    for (idx, (host, outcomes)) in hosts.iter().enumerate() {
        print::tree_head(idx, &host.to_string());
        let details: Vec<(String, ColoredString)> = outcomes
            .iter()
            .map(|outcome| {
                let banner = outcome.banner.as_deref().unwrap_or("-");
                (format!("{}/tcp", outcome.port), banner.color(colors::BANNER))
            })
            .collect();
        print::as_tree_one_level(&details);
        if idx + 1 != hosts.len() {
            sprint!();
        }
    }
}

fn print_summary(report: &ScanReport, cfg: &Config) {
    let stats = &report.stats;

    if cfg.quiet == 0 {
        print::fat_separator();
        print::aligned_line("Duration", format_duration(stats.elapsed).color(colors::ACCENT));
        print::aligned_line("Targets", stats.targets);
        print::aligned_line("Ports checked", stats.ports);
        print::aligned_line("Total scans", format!("{} of {}", stats.completed, stats.total));
        print::aligned_line("Closed/filtered", stats.closed_or_filtered());
        print::aligned_line(
            "Failures",
            format!(
                "{} timeout, {} refused, {} unreachable, {} other",
                stats.failures.timeout,
                stats.failures.refused,
                stats.failures.unreachable,
                stats.failures.unknown
            ),
        );
    }

    let open_ports: ColoredString = format!("{} open ports", stats.open).bold().green();
    let total_time: ColoredString = format_duration(stats.elapsed).bold().yellow();
    let verb = if report.cancelled {
        "Scan Interrupted"
    } else {
        "Scan Complete"
    };
    let output = format!("{verb}: {open_ports} found in {total_time}");

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => print::print(&output),
    }
}

pub fn format_duration(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
