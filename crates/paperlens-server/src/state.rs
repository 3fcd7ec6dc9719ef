//! Shared application state.

use std::sync::Arc;

use paperlens_core::{PaperLensConfig, Result};
use paperlens_extract::{ExtractionPipeline, PipelineOptions};
use paperlens_ingest::http_client;
use paperlens_llm::{LLMConfig, LanguageModel};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: PaperLensConfig,
    pub llm_config: LLMConfig,
    pub pipeline: ExtractionPipeline,
    /// Client for PDF downloads.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(
        config: PaperLensConfig,
        llm_config: LLMConfig,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        let http = http_client(config.fetch_timeout_secs)?;
        let pipeline = ExtractionPipeline::new(model, PipelineOptions::from(config.chunking));
        Ok(Self {
            config,
            llm_config,
            pipeline,
            http,
        })
    }
}
