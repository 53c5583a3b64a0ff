// Core modules
pub mod miner;
pub mod similarity;
pub mod template;

// Tokenizer collaborator
pub mod parser;

// Supporting modules
pub mod config;
pub mod error;
pub mod traits;
