//! # Sweep Common
//!
//! Shared building blocks for the scanner crates.
//!
//! * **[`config`]**: the tunables of a scan (pool size, timeouts, banner limits).
//! * **[`error`]**: errors raised while turning user input into scan work.
//! * **[`models`]**: work items, probe outcomes and the final report.
//! * **[`network`]**: target and port specification parsing, plus name resolution.

pub mod config;
pub mod error;
pub mod models;
pub mod network;

pub use config::{CidrPolicy, ScanConfig};
pub use error::SpecError;
