//! `paperlens extract`: one document from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use paperlens_core::PaperLensConfig;
use paperlens_extract::export::{render_text, write_artifacts};
use paperlens_extract::{ExtractionPipeline, PipelineOptions, Progress};
use paperlens_ingest::{http_client, PdfSource};
use paperlens_llm::LanguageModel;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractArgs {
    pub source: PdfSource,
    pub title: Option<String>,
    pub out_dir: PathBuf,
}

impl ExtractArgs {
    /// Parse the arguments following `extract`.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut source = None;
        let mut title = None;
        let mut out_dir = PathBuf::from(".");

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--title" | "-t" => {
                    let value = iter.next().ok_or("--title needs a value")?;
                    title = Some(value.clone()).filter(|t| !t.trim().is_empty());
                }
                "--out" | "-o" => {
                    let value = iter.next().ok_or("--out needs a directory")?;
                    out_dir = PathBuf::from(value);
                }
                flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
                positional => {
                    if source.is_some() {
                        return Err(format!("unexpected argument {}", positional));
                    }
                    source = Some(PdfSource::from_arg(positional));
                }
            }
        }

        Ok(Self {
            source: source.ok_or("missing <file-or-url>")?,
            title,
            out_dir,
        })
    }
}

/// Run the pipeline, print the record and summary, write both artifacts.
pub async fn run_extract(
    args: ExtractArgs,
    config: &PaperLensConfig,
    model: Arc<dyn LanguageModel>,
) -> anyhow::Result<()> {
    let client = http_client(config.fetch_timeout_secs)?;
    let bytes = args.source.load(&client).await?;

    let pipeline = ExtractionPipeline::new(model, PipelineOptions::from(config.chunking));
    let mut print_progress = |p: Progress| eprintln!("{}", p);
    let output = pipeline
        .process_pdf(bytes, args.title.as_deref(), &mut print_progress)
        .await?;

    println!("{}", render_text(&output.record));
    println!("Summary\n{}", output.summary);

    let [json_path, summary_path] = write_artifacts(&args.out_dir, &output.record, &output.summary)?;
    info!(
        "Wrote {} and {} ({} chunks, {} failed, {}ms)",
        json_path.display(),
        summary_path.display(),
        output.report.chunk_count,
        output.report.failed_chunks,
        output.report.duration_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperlens_extract::export::{EXTRACTION_FILE_NAME, SUMMARY_FILE_NAME};
    use paperlens_ingest::pdf::fixtures::text_pdf;
    use paperlens_llm::StubModel;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_path_with_options() {
        let parsed =
            ExtractArgs::parse(&args(&["paper.pdf", "--title", "My Paper", "--out", "results"]))
                .unwrap();
        assert_eq!(parsed.source, PdfSource::Path(PathBuf::from("paper.pdf")));
        assert_eq!(parsed.title.as_deref(), Some("My Paper"));
        assert_eq!(parsed.out_dir, PathBuf::from("results"));
    }

    #[test]
    fn test_parse_url() {
        let parsed = ExtractArgs::parse(&args(&["https://arxiv.org/pdf/1706.03762"])).unwrap();
        assert_eq!(
            parsed.source,
            PdfSource::Url("https://arxiv.org/pdf/1706.03762".into())
        );
        assert_eq!(parsed.title, None);
        assert_eq!(parsed.out_dir, PathBuf::from("."));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ExtractArgs::parse(&args(&[])).is_err());
        assert!(ExtractArgs::parse(&args(&["a.pdf", "b.pdf"])).is_err());
        assert!(ExtractArgs::parse(&args(&["a.pdf", "--title"])).is_err());
        assert!(ExtractArgs::parse(&args(&["a.pdf", "--verbose"])).is_err());
    }

    #[tokio::test]
    async fn test_run_extract_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("paper.pdf");
        std::fs::write(&pdf_path, text_pdf(&[&["A tiny paper"]])).unwrap();
        let out_dir = dir.path().join("out");

        let model = Arc::new(StubModel::new(|prompt| {
            if prompt.contains("academic summarizer") {
                Ok("Tiny summary.".into())
            } else {
                Ok(r#"{"title": "A Tiny Paper"}"#.into())
            }
        }));
        let parsed = ExtractArgs {
            source: PdfSource::Path(pdf_path),
            title: None,
            out_dir: out_dir.clone(),
        };

        run_extract(parsed, &PaperLensConfig::default(), model)
            .await
            .unwrap();

        let json = std::fs::read_to_string(out_dir.join(EXTRACTION_FILE_NAME)).unwrap();
        assert!(json.contains("\"title\": \"A Tiny Paper\""));
        let summary = std::fs::read_to_string(out_dir.join(SUMMARY_FILE_NAME)).unwrap();
        assert!(summary.ends_with("Tiny summary."));
    }
}
