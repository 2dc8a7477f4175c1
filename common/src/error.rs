use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised before any network activity, caused by bad caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A target or port token could not be parsed.
    #[error("invalid token '{input}': {reason}")]
    Format { input: String, reason: String },

    /// A port number or CIDR prefix lies outside its valid bounds.
    #[error("value out of range '{input}': {reason}")]
    Range { input: String, reason: String },

    /// The scan configuration cannot be used as given.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SpecError {
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn range(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Range {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
