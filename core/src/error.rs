use sweep_common::SpecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The target or port specification (or the config) was rejected before scanning.
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("result collector is sealed and accepts no more outcomes")]
    CollectorSealed,

    /// A worker task panicked or was aborted.
    #[error("scan worker failed: {0}")]
    Worker(String),
}
