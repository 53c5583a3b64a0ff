//! Syslog line tokenizer.
//!
//! Splits a raw line into the four fixed header fields (month, day, time,
//! host) and the ordered word sequence of the message body. The miner only
//! ever sees the word sequence; the header fields are carried through for
//! callers that want them.

use regex::Regex;

use crate::config::TokenizerConfig;
use crate::error::{MinerError, Result};
use crate::traits::LineParser;

/// One tokenized log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub month: String,
    pub day: String,
    pub time: String,
    pub host: String,
    /// The message body split into tokens; this is what the miner clusters.
    pub words: Vec<String>,
}

/// Whitespace/punctuation tokenizer for classic syslog lines.
pub struct SyslogLineParser {
    strip_chars: Vec<char>,
    separator: Regex,
}

impl SyslogLineParser {
    /// Parser with the default strip set and separator.
    pub fn new() -> Self {
        Self::with_config(&TokenizerConfig::default()).expect("default separator pattern is valid")
    }

    /// Parser with explicit tokenizer configuration. Fails if the separator
    /// pattern does not compile.
    pub fn with_config(config: &TokenizerConfig) -> Result<Self> {
        Ok(Self {
            strip_chars: config.strip_chars.chars().collect(),
            separator: Regex::new(&config.separator)?,
        })
    }

    /// Split off the first four whitespace-separated fields and tokenize the
    /// remainder. Lines with fewer than five fields are malformed.
    pub fn parse(&self, line: &str) -> Result<ParsedLine> {
        let mut rest = line.trim_start();
        let mut header = [""; 4];
        for slot in header.iter_mut() {
            let end = rest
                .find(char::is_whitespace)
                .ok_or_else(|| malformed(line))?;
            *slot = &rest[..end];
            rest = rest[end..].trim_start();
        }
        if rest.is_empty() {
            return Err(malformed(line));
        }

        let cleaned: String = rest
            .chars()
            .map(|c| if self.strip_chars.contains(&c) { ' ' } else { c })
            .collect();
        let words = self
            .separator
            .split(cleaned.trim())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        Ok(ParsedLine {
            month: header[0].to_string(),
            day: header[1].to_string(),
            time: header[2].to_string(),
            host: header[3].to_string(),
            words,
        })
    }
}

fn malformed(line: &str) -> MinerError {
    MinerError::MalformedLine {
        found: line.split_whitespace().count(),
    }
}

impl Default for SyslogLineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser for SyslogLineParser {
    fn parse(&self, line: &str) -> Result<ParsedLine> {
        SyslogLineParser::parse(self, line)
    }
}
