//! PaperLens Extract: chunk extraction, merge, dedup and summary over a model.
//!
//! Model-backed stages degrade instead of failing. Only PDF decoding and the
//! no-text check can abort a run.

pub mod chunk;
pub mod dedup;
pub mod error;
pub mod export;
pub mod json;
pub mod merge;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod summary;
pub mod types;

pub use chunk::ChunkExtractor;
pub use error::{ParseError, StageError};
pub use merge::{naive_merge, MergeStrategy, Merged, Merger};
pub use pipeline::ExtractionPipeline;
pub use record::{DatasetItem, EvidenceItem, ExtractionRecord, HeadingItem};
pub use summary::Summarizer;
pub use types::*;
