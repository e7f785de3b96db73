use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GannotError {
    #[error("invalid gene identifier: {0}")]
    InvalidGeneId(String),

    #[error("no valid gene identifiers in input batch")]
    EmptyBatch,

    #[error("batch of {supplied} identifiers exceeds the limit of {limit}")]
    BatchTooLarge { supplied: usize, limit: usize },

    #[error("transport retries exhausted for {url} after {attempts} attempts")]
    TransportExhausted { url: String, attempts: u32 },

    #[error("failed to build HTTP client: {0}")]
    HttpInit(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read identifier file at {0}")]
    InputRead(PathBuf),
}
