/// Contract traits for the template mining pipeline
///
/// This module provides trait-based abstractions for:
/// - Similarity scoring between a template mask and an observation
/// - Tokenizing raw log lines into word sequences
/// - Template inference (match-or-create)
///
/// This allows you to swap implementations for testing or to plug in an
/// alternative scoring strategy without touching the miner.
use crate::error::Result;
use crate::parser::ParsedLine;
use crate::template::{Template, TemplateToken};

// ============================================================================
// Similarity Scoring Trait
// ============================================================================

/// Trait for scoring how similar an incoming token sequence is to a
/// template's current mask.
///
/// The template applies its cheap gates (anchor token, exact match) before
/// delegating to the scorer, so implementations only see observations that
/// survived those checks.
///
/// Implementations can use:
/// - Word-length cosine similarity gated on position agreement (default)
/// - Token-set overlap or edit-distance aggregates
/// - Mock scorers for testing
pub trait SimilarityScorer: Send + Sync {
    /// Score an observation against a template mask.
    ///
    /// # Arguments
    /// * `words` - The template's masked token pattern
    /// * `word_lengths` - The template's cached per-position token lengths
    /// * `new_words` - The incoming token sequence, same arity as `words`
    ///
    /// # Returns
    /// A score in `[0, 1]`; `1.0` means certain match, `0.0` means rejected.
    fn score(&self, words: &[TemplateToken], word_lengths: &[usize], new_words: &[String]) -> f64;

    /// Get the name/identifier of this scorer (for reporting)
    fn name(&self) -> &str;
}

// ============================================================================
// Line Parser Trait
// ============================================================================

/// Trait for splitting a raw log line into the fixed syslog header fields
/// and an ordered word sequence.
pub trait LineParser: Send + Sync {
    /// Parse a single raw line.
    ///
    /// # Returns
    /// A [`ParsedLine`], or [`crate::error::MinerError::MalformedLine`] if
    /// the line has fewer than five whitespace-separated fields.
    fn parse(&self, line: &str) -> Result<ParsedLine>;
}

// ============================================================================
// Template Inference Trait
// ============================================================================

/// Trait for routing an observation to the best existing template or
/// creating a new one.
pub trait TemplateInference {
    /// Infer the template for one observation. Mutates miner state: either
    /// an existing template is refined or a new one is appended.
    fn infer(&mut self, words: &[String]) -> &Template;

    /// All templates accumulated so far, in creation order.
    fn templates(&self) -> &[Template];

    /// Get the name/identifier of this miner (for reporting)
    fn name(&self) -> &str;
}
