//! Per-chunk extraction.

use paperlens_ingest::Chunk;
use paperlens_llm::LanguageModel;
use tracing::{debug, warn};

use crate::error::StageError;
use crate::json::parse_record;
use crate::prompts;
use crate::record::ExtractionRecord;

/// Turns one chunk into a partial record. Never fails: any model or parse
/// error yields an empty placeholder carrying the error text.
pub struct ChunkExtractor<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> ChunkExtractor<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    pub async fn extract(&self, chunk: &Chunk) -> ExtractionRecord {
        match self.try_extract(chunk).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Extraction failed for pages {}-{}: {}",
                    chunk.start_page, chunk.end_page, e
                );
                ExtractionRecord::failed(e.to_string())
            }
        }
    }

    async fn try_extract(&self, chunk: &Chunk) -> Result<ExtractionRecord, StageError> {
        let prompt = prompts::chunk_prompt(chunk);
        debug!(
            "Pages {}-{}: prompt of {} chars",
            chunk.start_page,
            chunk.end_page,
            prompt.chars().count()
        );
        let response = self.model.complete(&prompt).await?;
        let mut record = parse_record(&response)?;
        record.error = None;

        let dropped = record.retain_pages_within(chunk.start_page, chunk.end_page);
        if dropped > 0 {
            debug!(
                "Dropped {} items citing pages outside {}-{}",
                dropped, chunk.start_page, chunk.end_page
            );
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_llm::StubModel;

    fn chunk(start: u32, end: u32) -> Chunk {
        Chunk {
            start_page: start,
            end_page: end,
            text: "Paper text".into(),
        }
    }

    #[tokio::test]
    async fn test_extracts_partial() {
        let model = StubModel::constant(
            "```json\n{\"title\": \"Deep Nets\", \"datasets\": [{\"name\": \"MNIST\", \"page\": 2, \"quote\": \"MNIST digits\"}]}\n```",
        );
        let record = ChunkExtractor::new(&model).extract(&chunk(1, 5)).await;
        assert!(!record.is_failed());
        assert_eq!(record.title.as_deref(), Some("Deep Nets"));
        assert_eq!(record.datasets.len(), 1);
        assert!(model.prompts()[0].contains("CHUNK PAGES: 1 - 5"));
    }

    #[tokio::test]
    async fn test_out_of_range_items_dropped() {
        let model = StubModel::constant(
            r#"{"methods": [
                {"heading": "Inside", "explanation": "", "page": 7, "quote": "q"},
                {"heading": "Outside", "explanation": "", "page": 2, "quote": "q"},
                {"heading": "Unpaged", "explanation": "", "quote": "q"}
            ]}"#,
        );
        let record = ChunkExtractor::new(&model).extract(&chunk(6, 10)).await;
        assert_eq!(record.methods.len(), 1);
        assert_eq!(record.methods[0].heading, "Inside");
    }

    #[tokio::test]
    async fn test_malformed_item_does_not_fail_chunk() {
        let model = StubModel::constant(
            r#"{"title": "Deep Nets", "datasets": ["MNIST"], "methods": [{"heading": "Dropout", "page": 2}]}"#,
        );
        let record = ChunkExtractor::new(&model).extract(&chunk(1, 5)).await;
        assert!(!record.is_failed());
        assert_eq!(record.title.as_deref(), Some("Deep Nets"));
        assert!(record.datasets.is_empty());
        assert_eq!(record.methods.len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_yields_placeholder() {
        let model = StubModel::failing();
        let record = ChunkExtractor::new(&model).extract(&chunk(1, 5)).await;
        assert!(record.is_failed());
        assert!(record.error.as_deref().unwrap().contains("connection refused"));
        assert_eq!(record.title, None);
        assert_eq!(record.item_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_output_yields_placeholder() {
        let model = StubModel::constant("Sorry, I cannot help with that.");
        let record = ChunkExtractor::new(&model).extract(&chunk(1, 5)).await;
        assert_eq!(
            record.error.as_deref(),
            Some("No JSON object found in model output")
        );
    }

    #[tokio::test]
    async fn test_echoed_error_marker_is_cleared() {
        let model = StubModel::constant(r#"{"title": "T", "_error": "copied"}"#);
        let record = ChunkExtractor::new(&model).extract(&chunk(1, 1)).await;
        assert!(!record.is_failed());
    }
}
