//! Stage-level errors. None of these abort a run; each stage turns them
//! into its degraded result.

use paperlens_llm::ModelError;
use thiserror::Error;

/// Failure to recover a record from model text.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No JSON object found in model output")]
    NoJsonObject,

    #[error("Invalid JSON in model output: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Model output does not match the record schema: {0}")]
    Schema(#[source] serde_json::Error),
}

/// Failure of a single model-backed stage.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to serialize partial records: {0}")]
    Serialize(#[from] serde_json::Error),
}
