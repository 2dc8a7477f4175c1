//! # Scan Models
//!
//! Value types that flow through a scan.
//!
//! * [`work::WorkItem`]: one `(target, port)` pair to probe.
//! * [`outcome::ProbeOutcome`]: what a single probe observed.
//! * [`report::ScanReport`]: the frozen result handed to reporting.

pub mod outcome;
pub mod report;
pub mod work;

pub use outcome::{ProbeError, ProbeOutcome};
pub use report::{FailureCounts, ScanReport, ScanStats};
pub use work::WorkItem;
