//! Socket-level pieces of a probe.

pub mod banner;
pub mod tcp;
