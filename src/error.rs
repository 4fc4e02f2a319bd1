use thiserror::Error;

/// Failure to extract a summary from a single source file.
///
/// Only the offending file is affected; whether the rest of the run continues
/// is the caller's decision (see `AnalyzerConfig::fail_on_malformed`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("malformed source: {reason}")]
    MalformedSource { reason: String },
}

impl ExtractError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ExtractError::MalformedSource {
            reason: reason.into(),
        }
    }
}
