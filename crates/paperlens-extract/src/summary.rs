//! Free-text paper summary from the opening pages.

use paperlens_ingest::{Page, PAGE_SEPARATOR};
use paperlens_llm::LanguageModel;
use tracing::warn;

use crate::prompts;

pub const DEFAULT_SUMMARY_PAGES: usize = 5;
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 15_000;

/// Appended when the summary input is cut.
pub const TRUNCATION_MARKER: &str = "...";

/// Text of the first `max_pages` pages, cut to `max_chars` characters.
pub fn summary_input(pages: &[Page], max_pages: usize, max_chars: usize) -> String {
    let joined = pages
        .iter()
        .take(max_pages)
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);

    if joined.chars().count() > max_chars {
        let mut cut: String = joined.chars().take(max_chars).collect();
        cut.push_str(TRUNCATION_MARKER);
        cut
    } else {
        joined
    }
}

pub struct Summarizer<'a> {
    model: &'a dyn LanguageModel,
    max_pages: usize,
    max_chars: usize,
}

impl<'a> Summarizer<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self {
            model,
            max_pages: DEFAULT_SUMMARY_PAGES,
            max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }

    pub fn with_limits(mut self, max_pages: usize, max_chars: usize) -> Self {
        self.max_pages = max_pages;
        self.max_chars = max_chars;
        self
    }

    /// The model's summary, or a failure message in its place.
    pub async fn summarize(&self, pages: &[Page]) -> String {
        let input = summary_input(pages, self.max_pages, self.max_chars);
        match self.model.complete(&prompts::summary_prompt(&input)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                format!("Summary generation failed: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_llm::StubModel;

    fn pages(n: u32, len: usize) -> Vec<Page> {
        (1..=n)
            .map(|i| Page::new(i, "x".repeat(len)))
            .collect()
    }

    #[test]
    fn test_first_pages_only() {
        let pages: Vec<Page> = (1..=7).map(|i| Page::new(i, format!("page {}", i))).collect();
        let input = summary_input(&pages, 5, 15_000);
        assert_eq!(input, "page 1\n\npage 2\n\npage 3\n\npage 4\n\npage 5");
    }

    #[test]
    fn test_truncation() {
        let input = summary_input(&pages(5, 4000), 5, 15_000);
        assert_eq!(input.chars().count(), 15_003);
        assert!(input.ends_with("x..."));
    }

    #[test]
    fn test_exact_limit_not_marked() {
        let input = summary_input(&pages(1, 15_000), 5, 15_000);
        assert_eq!(input.len(), 15_000);
        assert!(!input.ends_with("..."));
    }

    #[test]
    fn test_truncation_counts_chars() {
        let pages = vec![Page::new(1, "é".repeat(20))];
        let input = summary_input(&pages, 5, 10);
        assert_eq!(input, format!("{}...", "é".repeat(10)));
    }

    #[tokio::test]
    async fn test_summary_text_returned() {
        let model = StubModel::constant("**Abstract/Overview** A study.");
        let pages = vec![Page::new(1, "Intro")];
        let summary = Summarizer::new(&model).summarize(&pages).await;
        assert_eq!(summary, "**Abstract/Overview** A study.");
        assert!(model.prompts()[0].contains("---\nIntro\n---"));
    }

    #[tokio::test]
    async fn test_failure_becomes_message() {
        let model = StubModel::failing();
        let summary = Summarizer::new(&model)
            .summarize(&[Page::new(1, "Intro")])
            .await;
        assert!(summary.starts_with("Summary generation failed: "));
        assert!(summary.contains("connection refused"));
    }
}
