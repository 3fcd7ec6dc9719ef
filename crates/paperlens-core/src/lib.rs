//! PaperLens Core: error taxonomy and process-wide configuration.

pub mod config;
pub mod error;

pub use config::{ChunkingConfig, PaperLensConfig};
pub use error::{Error, Result};
