//! Extraction pipeline execution.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use paperlens_core::{Error, Result};
use paperlens_ingest::{document_fingerprint, extract_pages, has_text, Page, PageChunker};
use paperlens_llm::LanguageModel;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunk::ChunkExtractor;
use crate::dedup;
use crate::merge::{Merged, Merger};
use crate::summary::Summarizer;
use crate::types::*;

/// Runs one document through chunk extraction, merge, dedup and summary.
///
/// Chunks are processed sequentially, in page order. Only PDF decoding and
/// the no-text check are fatal; every model-backed stage degrades instead.
pub struct ExtractionPipeline {
    model: Arc<dyn LanguageModel>,
    options: PipelineOptions,
}

impl ExtractionPipeline {
    pub fn new(model: Arc<dyn LanguageModel>, options: PipelineOptions) -> Self {
        Self { model, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Extract page text from PDF bytes (on the blocking pool) and run.
    pub async fn process_pdf(
        &self,
        bytes: Vec<u8>,
        title_hint: Option<&str>,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<PipelineOutput> {
        let document_id = document_fingerprint(&bytes);

        let pages = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| Error::Internal(format!("text extraction task failed: {}", e)))??;

        if !has_text(&pages) {
            return Err(Error::NoText);
        }

        info!("PDF {} decoded: {} pages", &document_id[..12], pages.len());
        Ok(self
            .execute(&pages, Some(document_id), title_hint, progress)
            .await)
    }

    /// Run over already-extracted pages.
    pub async fn run(
        &self,
        pages: &[Page],
        title_hint: Option<&str>,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> PipelineOutput {
        self.execute(pages, None, title_hint, progress).await
    }

    async fn execute(
        &self,
        pages: &[Page],
        document_id: Option<String>,
        title_hint: Option<&str>,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> PipelineOutput {
        let start = Instant::now();
        let started_at = Utc::now().to_rfc3339();
        let run_id = Uuid::new_v4().to_string();
        let model = self.model.as_ref();

        // Stage 1: Chunk pages
        let chunks = PageChunker::from_config(&self.options.chunking).chunk(pages);
        info!(
            "Starting extraction run {} ({} pages, {} chunks, model {})",
            run_id,
            pages.len(),
            chunks.len(),
            model.name()
        );

        // Stage 2: Extract each chunk
        let extractor = ChunkExtractor::new(model);
        let mut partials = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let event = Progress::ChunkStarted {
                index: i + 1,
                total: chunks.len(),
                start_page: chunk.start_page,
                end_page: chunk.end_page,
            };
            debug!("{}", event);
            progress(event);
            partials.push(extractor.extract(chunk).await);
        }
        let failed_chunks = partials.iter().filter(|p| p.is_failed()).count();

        // Stage 3: Merge partials
        progress(Progress::Merging);
        let Merged {
            mut record,
            strategy,
        } = Merger::new(model).merge(&partials).await;

        // Stage 4: Page bounds, dedup, title hint
        let out_of_range = record.retain_pages_within(1, pages.len() as u32);
        if out_of_range > 0 {
            debug!("Dropped {} merged items citing nonexistent pages", out_of_range);
        }
        let duplicates_removed = dedup::deduplicate(&mut record);
        dedup::apply_title_hint(&mut record, title_hint);

        // Stage 5: Summary
        progress(Progress::Summarizing);
        let summary = Summarizer::new(model)
            .with_limits(self.options.summary_pages, self.options.summary_max_chars)
            .summarize(pages)
            .await;

        progress(Progress::Done);

        let report = ExtractionReport {
            run_id,
            document_id,
            page_count: pages.len(),
            chunk_count: chunks.len(),
            failed_chunks,
            merge_strategy: strategy,
            duplicates_removed,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: chunks={}, failed={}, merge={:?}, deduped={}, duration={}ms",
            report.chunk_count,
            report.failed_chunks,
            report.merge_strategy,
            report.duplicates_removed,
            report.duration_ms
        );

        PipelineOutput {
            record,
            summary,
            report,
        }
    }
}
