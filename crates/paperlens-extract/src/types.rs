//! Pipeline options, progress events and the run report.

use paperlens_core::ChunkingConfig;
use serde::Serialize;

use crate::merge::MergeStrategy;
use crate::record::ExtractionRecord;
use crate::summary::{DEFAULT_SUMMARY_MAX_CHARS, DEFAULT_SUMMARY_PAGES};

/// Tunable limits of one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub chunking: ChunkingConfig,
    /// Leading pages fed to the summary.
    pub summary_pages: usize,
    /// Character cap on the summary input.
    pub summary_max_chars: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            summary_pages: DEFAULT_SUMMARY_PAGES,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

impl From<ChunkingConfig> for PipelineOptions {
    fn from(chunking: ChunkingConfig) -> Self {
        Self {
            chunking,
            ..Self::default()
        }
    }
}

/// Observable progress of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Progress {
    /// 1-based `index` of `total` chunks.
    ChunkStarted {
        index: usize,
        total: usize,
        start_page: u32,
        end_page: u32,
    },
    Merging,
    Summarizing,
    Done,
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Progress::ChunkStarted {
                index,
                total,
                start_page,
                end_page,
            } => write!(
                f,
                "Processing chunk {}/{} (pages {}-{})",
                index, total, start_page, end_page
            ),
            Progress::Merging => write!(f, "Merging results..."),
            Progress::Summarizing => write!(f, "Generating paper summary..."),
            Progress::Done => write!(f, "Done"),
        }
    }
}

/// What happened during a run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    #[serde(rename = "runId")]
    pub run_id: String,
    /// SHA-256 of the PDF bytes, when the run started from bytes.
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
    #[serde(rename = "pageCount")]
    pub page_count: usize,
    #[serde(rename = "chunkCount")]
    pub chunk_count: usize,
    #[serde(rename = "failedChunks")]
    pub failed_chunks: usize,
    #[serde(rename = "mergeStrategy")]
    pub merge_strategy: MergeStrategy,
    #[serde(rename = "duplicatesRemoved")]
    pub duplicates_removed: usize,
    #[serde(rename = "startedAt")]
    pub started_at: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub record: ExtractionRecord,
    pub summary: String,
    pub report: ExtractionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = PipelineOptions::default();
        assert_eq!(opts.chunking.max_chars, 12_000);
        assert_eq!(opts.chunking.max_pages_per_chunk, 5);
        assert_eq!(opts.summary_pages, 5);
        assert_eq!(opts.summary_max_chars, 15_000);
    }

    #[test]
    fn test_progress_display() {
        let p = Progress::ChunkStarted {
            index: 2,
            total: 3,
            start_page: 6,
            end_page: 10,
        };
        assert_eq!(p.to_string(), "Processing chunk 2/3 (pages 6-10)");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["stage"], "chunk_started");
        assert_eq!(json["end_page"], 10);
    }
}
