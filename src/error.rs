//! Error types for the template miner.

use thiserror::Error;

/// Errors surfaced by the tokenizer and the miner construction paths.
///
/// Inference itself is infallible: arity mismatches are prevented by the
/// miner's candidate filter and malformed lines never reach the miner.
#[derive(Error, Debug)]
pub enum MinerError {
    /// A raw log line with fewer than the five whitespace-separated fields
    /// required by the syslog layout (month, day, time, host, message).
    #[error("malformed log line: expected at least 5 whitespace-separated fields, found {found}")]
    MalformedLine { found: usize },

    /// A seed template whose stored index does not equal its position in the
    /// seed sequence.
    #[error("seed template at position {position} carries index {index}")]
    SeedIndexMismatch { position: usize, index: usize },

    /// The configured separator pattern failed to compile.
    #[error("invalid separator pattern: {0}")]
    InvalidSeparator(#[from] regex::Error),
}

/// Result type alias for template miner operations.
pub type Result<T> = std::result::Result<T, MinerError>;
