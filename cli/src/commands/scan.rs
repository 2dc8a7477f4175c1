use anyhow::Context;
use tracing::{Instrument, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::commands::{CommandLine, Config};
use crate::export::{self, ScanRequest};
use crate::terminal::{format, print, spinner};
use sweep_core::{CancelToken, Scanner, WorkSet};

/// Conventional exit status for a process killed by SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

pub async fn scan(cmd: &CommandLine, cfg: &Config) -> anyhow::Result<()> {
    let scan_config = cmd.scan_config();
    let scanner = Scanner::new(scan_config.clone());
    listen_for_interrupt(scanner.cancel_token());

    let work: WorkSet = scanner
        .plan(&cmd.target, &cmd.ports)
        .await
        .with_context(|| format!("cannot scan '{}' on ports '{}'", cmd.target, cmd.ports))?;

    if work.targets().is_empty() {
        warn!("No valid targets to scan");
        return Ok(());
    }

    print_plan(&work, cmd, cfg);

    let span = spinner::progress_span(work.len());
    let quiet = cfg.quiet;
    let progress = span.clone();
    let scanner = scanner.on_outcome(move |outcome, _completed| {
        progress.pb_inc(1);
        if outcome.connected && quiet == 0 {
            print::print(&format::open_port_line(outcome));
        }
    });

    let report = scanner.run(work).instrument(span.clone()).await?;
    drop(scanner);
    drop(span);

    if report.cancelled {
        warn!(
            "Interrupted: {} of {} probes completed, results are partial",
            report.stats.completed, report.stats.total
        );
    }

    format::print_report(&report, cfg);

    if let Some(dest) = &cfg.json {
        let request = ScanRequest {
            target_input: &cmd.target,
            ports_input: &cmd.ports,
            config: &scan_config,
        };
        export::write_json(&report, &request, dest)?;
    }
    Ok(())
}

/// First Ctrl-C stops dispatching and keeps partial results, a second one
/// exits right away.
fn listen_for_interrupt(cancel: CancelToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&cancel) {
                Interrupt::Drain => {
                    warn!("Ctrl-C received, waiting for probes in flight (press again to quit)");
                }
                Interrupt::Exit => {
                    warn!("Second Ctrl-C, exiting without a report");
                    std::process::exit(EXIT_INTERRUPTED);
                }
            }
        }
    });
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Stop dispatching, let in-flight probes finish.
    Drain,
    Exit,
}

fn on_interrupt(cancel: &CancelToken) -> Interrupt {
    if cancel.is_cancelled() {
        return Interrupt::Exit;
    }
    cancel.cancel();
    Interrupt::Drain
}

fn print_plan(work: &WorkSet, cmd: &CommandLine, cfg: &Config) {
    print::header("scan plan", cfg.quiet);
    if cfg.quiet > 0 {
        return;
    }

    print::aligned_line(
        "Targets",
        format!("{} ({})", work.targets().len(), print::preview(work.targets(), 5)),
    );
    print::aligned_line(
        "Ports",
        format!("{} ({})", work.ports().len(), print::preview(work.ports(), 10)),
    );
    print::aligned_line("Total scans", work.len());
    print::aligned_line("Threads", cmd.threads);
    print::aligned_line("Timeout", format::format_duration(cmd.timeout));
    print::aligned_line(
        "Banner grab",
        if cmd.scan_config().banner_enabled() { "on" } else { "off" },
    );
    print::fat_separator();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
