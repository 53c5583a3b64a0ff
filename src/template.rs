//! Template entity: one cluster's masked token pattern.
//!
//! A template remembers which token positions are still literal and which
//! have been masked out because observed values disagreed, plus a cached
//! vector of token lengths from the most recent observation folded in.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::traits::SimilarityScorer;

/// Per-position token lengths. Syslog messages are short, so the vector
/// usually lives on the stack.
pub type WordLengths = SmallVec<[usize; 16]>;

/// One slot of a template's token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateToken {
    /// A literal token that every observation in the cluster agreed on so far.
    Word(String),
    /// A masked position; accepts any token.
    Wildcard,
}

impl TemplateToken {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, TemplateToken::Wildcard)
    }

    /// True if this slot accepts `word`: wildcards accept anything, literal
    /// slots require exact equality.
    pub fn accepts(&self, word: &str) -> bool {
        match self {
            TemplateToken::Word(w) => w == word,
            TemplateToken::Wildcard => true,
        }
    }

    /// True only for a literal slot exactly equal to `word`. A wildcard
    /// never counts as a real agreement.
    pub fn equals_word(&self, word: &str) -> bool {
        match self {
            TemplateToken::Word(w) => w == word,
            TemplateToken::Wildcard => false,
        }
    }
}

impl fmt::Display for TemplateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateToken::Word(w) => f.write_str(w),
            TemplateToken::Wildcard => f.write_str("*"),
        }
    }
}

/// A masked token pattern representing one inferred log-message shape.
///
/// Invariants:
/// - `words.len() == word_lengths.len()` at all times (fixed arity)
/// - a position that became [`TemplateToken::Wildcard`] never reverts
/// - `counts >= 1` and grows by exactly 1 per [`Template::update`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    index: usize,
    words: Vec<TemplateToken>,
    word_lengths: WordLengths,
    counts: u64,
}

impl Template {
    /// Create a template from a freshly observed token sequence. No position
    /// is masked at creation.
    pub fn new(index: usize, words: &[String]) -> Self {
        let word_lengths = words.iter().map(|w| w.len()).collect();
        Self {
            index,
            words: words.iter().cloned().map(TemplateToken::Word).collect(),
            word_lengths,
            counts: 1,
        }
    }

    /// Create a template from an explicit mask, e.g. a predefined seed with
    /// wildcard positions already in place. Wildcard slots cache length 0.
    pub fn with_mask(index: usize, words: Vec<TemplateToken>) -> Self {
        let word_lengths = words
            .iter()
            .map(|t| match t {
                TemplateToken::Word(w) => w.len(),
                TemplateToken::Wildcard => 0,
            })
            .collect();
        Self {
            index,
            words,
            word_lengths,
            counts: 1,
        }
    }

    /// Creation-time position in the miner's collection; stable for life.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Arity of the token sequences this template can cluster.
    pub fn nwords(&self) -> usize {
        self.words.len()
    }

    /// Number of observations folded into this template, creation included.
    pub fn counts(&self) -> u64 {
        self.counts
    }

    pub fn words(&self) -> &[TemplateToken] {
        &self.words
    }

    pub fn word_lengths(&self) -> &[usize] {
        &self.word_lengths
    }

    /// Score an observation against this template.
    ///
    /// Two cheap gates run first: a concrete first token that differs from
    /// the observation's first token rejects outright (the first field is
    /// typically a process name and anchors the cluster), and an observation
    /// matching every literal position exactly is a certain match. Anything
    /// else is delegated to the injected scorer.
    ///
    /// Callers must filter by arity first; a mismatched observation is a
    /// programming error.
    pub fn similarity_score(&self, new_words: &[String], scorer: &dyn SimilarityScorer) -> f64 {
        assert_eq!(
            new_words.len(),
            self.nwords(),
            "arity mismatch: template {} has {} words",
            self.index,
            self.nwords()
        );

        if let Some(TemplateToken::Word(first)) = self.words.first() {
            if first != &new_words[0] {
                return 0.0;
            }
        }

        if self
            .words
            .iter()
            .zip(new_words)
            .all(|(token, word)| token.accepts(word))
        {
            return 1.0;
        }

        scorer.score(&self.words, &self.word_lengths, new_words)
    }

    /// Fold an observation into this template.
    ///
    /// Every position where the mask and the observation disagree becomes a
    /// wildcard; the cached word lengths are replaced (not averaged) with the
    /// observation's. One-way: no position is ever un-masked.
    pub fn update(&mut self, new_words: &[String]) {
        assert_eq!(
            new_words.len(),
            self.nwords(),
            "arity mismatch: template {} has {} words",
            self.index,
            self.nwords()
        );

        self.counts += 1;
        self.word_lengths = new_words.iter().map(|w| w.len()).collect();
        for (token, word) in self.words.iter_mut().zip(new_words) {
            if !token.equals_word(word) {
                *token = TemplateToken::Wildcard;
            }
        }
    }

    /// Secondary dump line: `index(nwords)(counts):<word_lengths>`.
    pub fn word_lengths_line(&self) -> String {
        format!(
            "{}({})({}):{:?}",
            self.index,
            self.nwords(),
            self.counts,
            self.word_lengths.as_slice()
        )
    }
}

impl fmt::Display for Template {
    /// Renders as `index(nwords)(counts):<tokens>` with wildcards as `*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})({}):", self.index, self.nwords(), self.counts)?;
        for (idx, token) in self.words.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::PositionCosine;

    fn words(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_template_has_no_wildcards() {
        let t = Template::new(0, &words(&["sshd", "session", "opened"]));
        assert_eq!(t.index(), 0);
        assert_eq!(t.nwords(), 3);
        assert_eq!(t.counts(), 1);
        assert!(t.words().iter().all(|w| !w.is_wildcard()));
        assert_eq!(t.word_lengths(), &[4, 7, 6]);
    }

    #[test]
    fn test_render() {
        let mut t = Template::new(2, &words(&["sshd", "session", "opened"]));
        t.update(&words(&["sshd", "session", "closed"]));
        assert_eq!(t.to_string(), "2(3)(2):sshd session *");
        assert_eq!(t.word_lengths_line(), "2(3)(2):[4, 7, 6]");
    }

    #[test]
    fn test_update_masks_disagreeing_positions_and_caches_lengths() {
        let mut t = Template::new(0, &words(&["cron", "job", "started"]));
        t.update(&words(&["cron", "job", "finished"]));
        assert_eq!(t.counts(), 2);
        assert!(t.words()[2].is_wildcard());
        // lengths come from the latest observation, not an average
        assert_eq!(t.word_lengths(), &[4, 3, 8]);
    }

    #[test]
    fn test_masking_is_monotonic() {
        let mut t = Template::new(0, &words(&["cron", "job", "started"]));
        t.update(&words(&["cron", "job", "finished"]));
        // a later observation agreeing with the original token must not
        // un-mask the position
        t.update(&words(&["cron", "job", "started"]));
        assert!(t.words()[2].is_wildcard());
        assert_eq!(t.counts(), 3);
    }

    #[test]
    fn test_anchor_gate_rejects_different_first_token() {
        let t = Template::new(0, &words(&["sshd", "session", "opened"]));
        let score = t.similarity_score(&words(&["cron", "session", "opened"]), &PositionCosine);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_wildcard_anchor_accepts_any_first_token() {
        let t = Template::with_mask(
            0,
            vec![
                TemplateToken::Wildcard,
                TemplateToken::Word("session".to_string()),
                TemplateToken::Word("opened".to_string()),
            ],
        );
        let score = t.similarity_score(&words(&["anything", "session", "opened"]), &PositionCosine);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_exact_match_short_circuit_through_wildcards() {
        let mut t = Template::new(0, &words(&["sshd", "user", "alice", "in"]));
        t.update(&words(&["sshd", "user", "bob", "in"]));
        // wildcard at position 2 accepts a never-seen token
        let score = t.similarity_score(&words(&["sshd", "user", "carol", "in"]), &PositionCosine);
        assert_eq!(score, 1.0);
    }

    #[test]
    #[should_panic(expected = "arity mismatch")]
    fn test_arity_mismatch_is_fatal() {
        let t = Template::new(0, &words(&["sshd", "session", "opened"]));
        t.similarity_score(&words(&["sshd", "session"]), &PositionCosine);
    }
}
