//! Configuration for the miner and the tokenizer.

use serde::{Deserialize, Serialize};

/// Default matching threshold. Higher is stricter and yields more templates.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// Characters the tokenizer replaces with whitespace before splitting.
pub const DEFAULT_STRIP_CHARS: &str = "[]()='\"";

/// Default separator pattern the tokenizer splits the message body on.
pub const DEFAULT_SEPARATOR: &str = r"\s+";

/// Miner tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Minimum similarity score required to match an existing template
    /// instead of creating a new one. Must stay in `(0, 1]`.
    pub threshold: f64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MinerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(f64::EPSILON, 1.0);
        self
    }
}

/// Tokenizer knobs, passed in explicitly rather than read from any global
/// state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Characters replaced with a space in the message body before splitting.
    pub strip_chars: String,
    /// Regex pattern the cleaned message body is split on.
    pub separator: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            strip_chars: DEFAULT_STRIP_CHARS.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl TokenizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strip_chars(mut self, strip_chars: impl Into<String>) -> Self {
        self.strip_chars = strip_chars.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}
