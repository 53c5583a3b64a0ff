//! Similarity scoring between a template mask and an incoming token sequence.
//!
//! The default strategy scores on the *shape* of the message rather than
//! token identity: the cosine similarity of per-position word-length vectors
//! tolerates variable numeric payloads (IDs, timestamps, counters) inside an
//! otherwise fixed message, while a position-agreement gate rejects lines
//! that share almost no literal tokens with the mask.

use crate::template::TemplateToken;
use crate::traits::SimilarityScorer;

/// Minimum number of literal positions that must match exactly before the
/// word-length vectors are compared at all.
pub const MIN_POSITION_AGREEMENT: usize = 3;

/// Cosine similarity between two word-length vectors:
/// `dot(a, b) / (|a| * |b|)`.
///
/// If either vector has zero magnitude (every token empty), the angle is
/// undefined; this returns 0.0 instead of dividing by zero. Both vectors are
/// non-negative, so the result is in `[0, 1]`.
pub fn cosine_similarity(a: &[usize], b: &[usize]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_product = (norm_a * norm_b).sqrt();
    if norm_product < f64::EPSILON {
        return 0.0;
    }

    dot / norm_product
}

/// Default scoring strategy: position-agreement gate plus word-length cosine.
///
/// An observation sharing fewer than [`MIN_POSITION_AGREEMENT`] literal
/// positions with the mask scores 0.0; otherwise the score is the cosine
/// similarity between the template's cached word lengths and the
/// observation's word lengths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionCosine;

impl SimilarityScorer for PositionCosine {
    fn score(&self, words: &[TemplateToken], word_lengths: &[usize], new_words: &[String]) -> f64 {
        let agreeing = words
            .iter()
            .zip(new_words)
            .filter(|(token, word)| token.equals_word(word))
            .count();
        if agreeing < MIN_POSITION_AGREEMENT {
            return 0.0;
        }

        let new_lengths: Vec<usize> = new_words.iter().map(|w| w.len()).collect();
        cosine_similarity(word_lengths, &new_lengths)
    }

    fn name(&self) -> &str {
        "position-cosine"
    }
}
