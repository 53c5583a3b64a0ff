//! Incremental template inference: route each observation to the best
//! existing template or create a new one.
//!
//! The miner is deliberately single-owner and synchronous. Each inference
//! reads the template collection and then mutates it (mask refinement or
//! append), and later observations depend on that mutation, so there is no
//! meaningful parallel decomposition. Wrap the whole miner in one exclusive
//! lock if it must be shared.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::MinerConfig;
use crate::error::{MinerError, Result};
use crate::similarity::PositionCosine;
use crate::template::Template;
use crate::traits::{SimilarityScorer, TemplateInference};

/// Owns the append-only, creation-ordered template collection.
///
/// The i-th template always has `index == i`; templates are never deleted or
/// reordered. The final template set is a function of the full ordered
/// history of observations, not of the observation multiset.
pub struct TemplateMiner {
    templates: Vec<Template>,
    // arity -> template indices, each bucket in creation order
    arity_index: FxHashMap<usize, Vec<usize>>,
    threshold: f64,
    scorer: Box<dyn SimilarityScorer>,
}

impl TemplateMiner {
    pub fn new() -> Self {
        Self::with_config(MinerConfig::default())
    }

    pub fn with_config(config: MinerConfig) -> Self {
        Self {
            templates: Vec::new(),
            arity_index: FxHashMap::default(),
            // the config field is public and serde-deserializable, so the
            // threshold may arrive outside (0, 1]
            threshold: config.threshold.clamp(f64::EPSILON, 1.0),
            scorer: Box::new(PositionCosine),
        }
    }

    /// Replace the default scoring strategy.
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Seed the collection with predefined templates. Each seed must sit at
    /// the position equal to its stored index.
    pub fn with_seed_templates(config: MinerConfig, seeds: Vec<Template>) -> Result<Self> {
        let mut miner = Self::with_config(config);
        for (position, template) in seeds.into_iter().enumerate() {
            if template.index() != position {
                return Err(MinerError::SeedIndexMismatch {
                    position,
                    index: template.index(),
                });
            }
            miner.register(template);
        }
        Ok(miner)
    }

    fn register(&mut self, template: Template) {
        self.arity_index
            .entry(template.nwords())
            .or_default()
            .push(template.index());
        self.templates.push(template);
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// All templates in creation order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Infer the template for one observation.
    ///
    /// Candidates are the templates with the observation's arity. Each is
    /// scored; of those at or above the threshold the highest score wins,
    /// with ties broken by the lowest (earliest-created) index. The winner's
    /// mask is refined in place. With no winner, a fresh template is created
    /// from the observation verbatim and appended.
    pub fn infer(&mut self, words: &[String]) -> &Template {
        let arity = words.len();

        let mut best: Option<(usize, f64)> = None;
        if let Some(bucket) = self.arity_index.get(&arity) {
            for &idx in bucket {
                let score = self.templates[idx].similarity_score(words, self.scorer.as_ref());
                if score < self.threshold {
                    continue;
                }
                // bucket is in creation order, so replacing only on a
                // strictly greater score keeps the earliest template on ties
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((idx, score));
                }
            }
        }

        match best {
            Some((idx, score)) => {
                debug!(template = idx, score, "observation matched existing template");
                self.templates[idx].update(words);
                &self.templates[idx]
            }
            None => {
                let template = Template::new(self.templates.len(), words);
                debug!(template = template.index(), arity, "created new template");
                self.register(template);
                let idx = self.templates.len() - 1;
                &self.templates[idx]
            }
        }
    }

    /// Per-template dump, one `index(nwords)(counts):<tokens>` line each.
    pub fn dump_templates(&self) -> String {
        self.templates
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Per-template word-length dump, one
    /// `index(nwords)(counts):<word_lengths>` line each.
    pub fn dump_word_lengths(&self) -> String {
        self.templates
            .iter()
            .map(|t| t.word_lengths_line())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for TemplateMiner {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateInference for TemplateMiner {
    fn infer(&mut self, words: &[String]) -> &Template {
        TemplateMiner::infer(self, words)
    }

    fn templates(&self) -> &[Template] {
        TemplateMiner::templates(self)
    }

    fn name(&self) -> &str {
        "word-length-miner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateToken;

    fn words(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_observation_creates_template_zero() {
        let mut miner = TemplateMiner::new();
        let t = miner.infer(&words(&["sshd", "session", "opened", "for", "root"]));
        assert_eq!(t.index(), 0);
        assert_eq!(t.counts(), 1);
        assert_eq!(miner.templates().len(), 1);
    }

    #[test]
    fn test_indices_are_assigned_in_creation_order() {
        let mut miner = TemplateMiner::new();
        miner.infer(&words(&["a", "b", "c"]));
        miner.infer(&words(&["a", "b", "c", "d"]));
        miner.infer(&words(&["a", "b", "c", "d", "e"]));

        for (position, template) in miner.templates().iter().enumerate() {
            assert_eq!(template.index(), position);
        }
    }

    #[test]
    fn test_below_threshold_score_creates_new_template() {
        let mut miner = TemplateMiner::new();
        miner.infer(&words(&["proc", "on", "a", "b", "longtoken"]));
        // 4 positions agree so the gate passes, but the length vectors
        // [4,2,1,1,9] vs [4,2,1,1,1] give cosine ~0.64, below 0.9
        let t = miner.infer(&words(&["proc", "on", "a", "b", "z"]));
        assert_eq!(t.index(), 1);
        assert_eq!(miner.templates().len(), 2);
    }

    #[test]
    fn test_lower_threshold_accepts_the_same_pair() {
        let mut miner = TemplateMiner::with_config(MinerConfig::new().with_threshold(0.6));
        miner.infer(&words(&["proc", "on", "a", "b", "longtoken"]));
        let t = miner.infer(&words(&["proc", "on", "a", "b", "z"]));
        assert_eq!(t.index(), 0);
        assert_eq!(t.counts(), 2);
    }

    #[test]
    fn test_out_of_range_threshold_is_clamped_at_construction() {
        // struct literals bypass the builder clamp
        let miner = TemplateMiner::with_config(MinerConfig { threshold: 5.0 });
        assert_eq!(miner.threshold(), 1.0);

        let miner = TemplateMiner::with_config(MinerConfig { threshold: -1.0 });
        assert!(miner.threshold() > 0.0);
        assert!(miner.threshold() <= 1.0);
    }

    #[test]
    fn test_seed_templates_are_used_for_matching() {
        let seeds = vec![
            Template::new(0, &words(&["cron", "job", "started", "ok", "now"])),
            Template::new(1, &words(&["sshd", "login", "failed", "for", "root"])),
        ];
        let mut miner = TemplateMiner::with_seed_templates(MinerConfig::default(), seeds).unwrap();
        assert_eq!(miner.templates().len(), 2);

        let t = miner.infer(&words(&["sshd", "login", "failed", "for", "anna"]));
        assert_eq!(t.index(), 1);
        assert_eq!(t.counts(), 2);
        assert!(t.words()[4].is_wildcard());
    }

    #[test]
    fn test_seed_index_mismatch_is_rejected() {
        let seeds = vec![Template::new(3, &words(&["a", "b", "c"]))];
        // .err() rather than .unwrap_err(): the miner itself is not Debug
        let err = TemplateMiner::with_seed_templates(MinerConfig::default(), seeds)
            .err()
            .unwrap();
        match err {
            MinerError::SeedIndexMismatch { position, index } => {
                assert_eq!(position, 0);
                assert_eq!(index, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wildcard_seed_mask_survives_matching() {
        let seed = Template::with_mask(
            0,
            vec![
                TemplateToken::Word("kernel".to_string()),
                TemplateToken::Wildcard,
                TemplateToken::Word("link".to_string()),
                TemplateToken::Word("up".to_string()),
            ],
        );
        let mut miner =
            TemplateMiner::with_seed_templates(MinerConfig::default(), vec![seed]).unwrap();
        let t = miner.infer(&words(&["kernel", "eth0", "link", "up"]));
        assert_eq!(t.index(), 0);
        assert!(t.words()[1].is_wildcard());
    }

    #[test]
    fn test_custom_scorer_is_injectable() {
        struct AlwaysMatch;
        impl SimilarityScorer for AlwaysMatch {
            fn score(
                &self,
                _words: &[TemplateToken],
                _word_lengths: &[usize],
                _new_words: &[String],
            ) -> f64 {
                1.0
            }
            fn name(&self) -> &str {
                "always-match"
            }
        }

        let mut miner = TemplateMiner::new().with_scorer(Box::new(AlwaysMatch));
        miner.infer(&words(&["sshd", "x", "y"]));
        // anchor gate still runs inside the template, so keep the first
        // token equal
        let t = miner.infer(&words(&["sshd", "p", "q"]));
        assert_eq!(t.index(), 0);
        assert_eq!(miner.templates().len(), 1);
    }

    #[test]
    fn test_dumps_render_one_line_per_template() {
        let mut miner = TemplateMiner::new();
        miner.infer(&words(&["sshd", "session", "opened", "for", "root"]));
        miner.infer(&words(&["cron", "job", "done"]));

        let dump = miner.dump_templates();
        assert_eq!(dump, "0(5)(1):sshd session opened for root\n1(3)(1):cron job done");

        let lengths = miner.dump_word_lengths();
        assert_eq!(lengths, "0(5)(1):[4, 7, 6, 3, 4]\n1(3)(1):[4, 3, 4]");
    }
}
