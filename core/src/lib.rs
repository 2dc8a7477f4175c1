//! # Sweep Core
//!
//! The concurrent TCP connect scanning engine.
//!
//! A scan is planned into a [`WorkSet`] (targets × ports), pushed through a
//! fixed-size worker pool, probed with a [`Prober`], and folded into a
//! [`ScanReport`](sweep_common::models::ScanReport) by the result collector.
//!
//! ```no_run
//! # async fn demo() -> Result<(), sweep_core::ScanError> {
//! use sweep_common::ScanConfig;
//!
//! let report = sweep_core::scan("127.0.0.1", "22,80,443", &ScanConfig::default()).await?;
//! for (target, port) in report.open_ports() {
//!     println!("{target}:{port} is open");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod network;
pub mod scanner;
pub mod workset;

pub use error::ScanError;
pub use network::tcp::TcpProber;
pub use scanner::{CancelToken, Prober, Scanner, scan};
pub use workset::WorkSet;
