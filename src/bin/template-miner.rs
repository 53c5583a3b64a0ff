/// Streaming syslog template miner
///
/// Reads syslog lines from stdin (or from a file given as the first
/// argument), clusters them into templates, and prints the template dump
/// followed by the word-length dump at end of input.
///
/// Environment overrides:
/// - TEMPLATE_THRESHOLD: matching threshold in (0, 1], default 0.9
/// - TEMPLATE_SEEDS: path to a JSON file of predefined templates
/// - TEMPLATE_DUMP_JSON: path to write the final template set as JSON
use anyhow::{Context, Result};
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{info, warn};

use template_miner::config::MinerConfig;
use template_miner::miner::TemplateMiner;
use template_miner::parser::SyslogLineParser;
use template_miner::template::Template;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = MinerConfig::default();
    if let Ok(raw) = env::var("TEMPLATE_THRESHOLD") {
        let threshold: f64 = raw
            .parse()
            .context("TEMPLATE_THRESHOLD must be a float in (0, 1]")?;
        config = config.with_threshold(threshold);
    }

    let mut miner = match env::var("TEMPLATE_SEEDS") {
        Ok(path) => {
            let file =
                File::open(&path).with_context(|| format!("failed to open seed file {path}"))?;
            let seeds: Vec<Template> = serde_json::from_reader(file)
                .with_context(|| format!("failed to parse seed file {path}"))?;
            info!(seeds = seeds.len(), "seeding miner from {path}");
            TemplateMiner::with_seed_templates(config, seeds)?
        }
        Err(_) => TemplateMiner::with_config(config),
    };

    let reader: Box<dyn BufRead> = match env::args().nth(1) {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("failed to open {path}"))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let parser = SyslogLineParser::new();
    let mut nlines = 0usize;
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        nlines += 1;
        match parser.parse(&line) {
            Ok(parsed) => {
                miner.infer(&parsed.words);
            }
            Err(err) => {
                skipped += 1;
                warn!(line = nlines, error = %err, "skipping unparsable line");
            }
        }
    }

    if !miner.templates().is_empty() {
        println!("{}", miner.dump_templates());
        println!("{}", miner.dump_word_lengths());
    }

    if let Ok(path) = env::var("TEMPLATE_DUMP_JSON") {
        let json = serde_json::to_string_pretty(miner.templates())?;
        std::fs::write(&path, json).with_context(|| format!("failed to write {path}"))?;
        info!("wrote template set to {path}");
    }

    info!(
        lines = nlines,
        skipped,
        templates = miner.templates().len(),
        "done"
    );
    Ok(())
}
