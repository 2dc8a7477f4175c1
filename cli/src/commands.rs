pub mod scan;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sweep_common::config::{CidrPolicy, DEFAULT_BANNER_LEN, DEFAULT_WORKERS, ScanConfig};

#[derive(Parser, Debug)]
#[command(name = "sweep", version)]
#[command(about = "A fast concurrent TCP connect port scanner.")]
pub struct CommandLine {
    /// Host, IP, CIDR (10.0.0.0/24), range (10.0.0.1-20) or a comma separated mix
    pub target: String,

    /// Ports to probe, e.g. "22,80,443", "1-1024" or "top"
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Number of concurrent connections
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Connect timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "0.8")]
    pub timeout: Duration,

    /// How long to wait for a service to greet us, 0 disables banner grabbing
    #[arg(long, value_name = "SECS", value_parser = parse_secs, default_value = "0.5")]
    pub banner_timeout: Duration,

    /// Maximum number of banner bytes to read
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_BANNER_LEN)]
    pub banner_len: usize,

    /// Keep network and broadcast addresses when expanding CIDR blocks
    #[arg(long)]
    pub all_addresses: bool,

    /// Write a JSON report to FILE, or to stdout when FILE is omitted or "-"
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "-")]
    pub json: Option<PathBuf>,

    /// Less output; repeat for even less
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

/// Presentation settings that never reach the scanning engine.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub quiet: u8,
    pub json: Option<PathBuf>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            quiet: self.quiet,
            json: self.json.clone(),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        let cidr_policy = if self.all_addresses {
            CidrPolicy::All
        } else {
            CidrPolicy::HostsOnly
        };

        ScanConfig::default()
            .with_workers(self.threads)
            .with_connect_timeout(self.timeout)
            .with_banner_timeout(self.banner_timeout)
            .with_banner_len(self.banner_len)
            .with_cidr_policy(cidr_policy)
    }
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("'{s}': {e}"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
