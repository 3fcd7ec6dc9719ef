//! Reducing partial records into one.
//!
//! The model merge is tried first; any failure falls through to a naive
//! aggregation that cannot fail.

use paperlens_llm::LanguageModel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::StageError;
use crate::json::parse_record;
use crate::prompts;
use crate::record::ExtractionRecord;

/// How the merged record was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    ModelMerge,
    NaiveMerge,
}

#[derive(Debug, Clone)]
pub struct Merged {
    pub record: ExtractionRecord,
    pub strategy: MergeStrategy,
}

pub struct Merger<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> Merger<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    pub async fn merge(&self, partials: &[ExtractionRecord]) -> Merged {
        if partials.is_empty() {
            return Merged {
                record: ExtractionRecord::default(),
                strategy: MergeStrategy::NaiveMerge,
            };
        }

        match self.model_merge(partials).await {
            Ok(record) => {
                info!("Merged {} partials with {}", partials.len(), self.model.name());
                Merged {
                    record,
                    strategy: MergeStrategy::ModelMerge,
                }
            }
            Err(e) => {
                warn!("Merger failed: {}. Using fallback merge.", e);
                Merged {
                    record: naive_merge(partials),
                    strategy: MergeStrategy::NaiveMerge,
                }
            }
        }
    }

    async fn model_merge(&self, partials: &[ExtractionRecord]) -> Result<ExtractionRecord, StageError> {
        let partials_json = serde_json::to_string(partials)?;
        let response = self
            .model
            .complete(&prompts::reducer_prompt(&partials_json))
            .await?;
        let mut record = parse_record(&response)?;
        record.error = None;
        Ok(record)
    }
}

/// Concatenate every list in partial order; each scalar takes the first
/// non-empty value. Whitespace-only strings count as empty.
pub fn naive_merge(partials: &[ExtractionRecord]) -> ExtractionRecord {
    let mut merged = ExtractionRecord::default();

    for p in partials {
        if merged.title.is_none() {
            merged.title = non_blank(&p.title);
        }
        if merged.venue.is_none() {
            merged.venue = non_blank(&p.venue);
        }
        if merged.year.is_none() {
            merged.year = p.year.filter(|y| *y != 0);
        }

        merged.datasets.extend(p.datasets.iter().cloned());
        merged.limitations_addressed.extend(p.limitations_addressed.iter().cloned());
        merged.contributions.extend(p.contributions.iter().cloned());
        merged.methods.extend(p.methods.iter().cloned());
        merged.paper_limitations.extend(p.paper_limitations.iter().cloned());
        merged.evidence.extend(p.evidence.iter().cloned());
    }

    merged
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}
