//! Extraction route.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use paperlens_core::Error;
use paperlens_extract::export::{export_json, summary_document};
use paperlens_extract::{ExtractionRecord, ExtractionReport, Progress};
use paperlens_ingest::PdfSource;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/extract", post(extract))
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub report: ExtractionReport,
    pub extraction: ExtractionRecord,
    pub summary: String,
    pub downloads: Downloads,
}

/// Ready-to-save artifact contents, keyed by file name.
#[derive(Debug, Serialize)]
pub struct Downloads {
    #[serde(rename = "paper_extraction.json")]
    pub extraction_json: String,
    #[serde(rename = "paper_summary.txt")]
    pub summary_txt: String,
}

/// Fields of the upload form.
#[derive(Debug, Default)]
struct ExtractForm {
    file: Option<Vec<u8>>,
    url: Option<String>,
    title: Option<String>,
}

impl ExtractForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, Error> {
        let malformed = |e: axum::extract::multipart::MultipartError| {
            Error::InvalidInput(format!("malformed form data: {}", e))
        };

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let bytes = field.bytes().await.map_err(malformed)?;
                    if !bytes.is_empty() {
                        form.file = Some(bytes.to_vec());
                    }
                }
                "url" => form.url = Some(field.text().await.map_err(malformed)?),
                "title" => {
                    let title = field.text().await.map_err(malformed)?;
                    form.title = Some(title.trim().to_string()).filter(|t| !t.is_empty());
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

/// POST /api/extract: run the pipeline on one uploaded or linked PDF.
async fn extract(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let form = ExtractForm::read(&mut multipart).await?;
    let source = PdfSource::select(form.file, form.url)?;
    let bytes = source.load(&state.http).await?;

    let mut log_progress = |p: Progress| info!("{}", p);
    let output = state
        .pipeline
        .process_pdf(bytes, form.title.as_deref(), &mut log_progress)
        .await?;

    let downloads = Downloads {
        extraction_json: export_json(&output.record)?,
        summary_txt: summary_document(&output.summary),
    };

    Ok(Json(ExtractResponse {
        report: output.report,
        extraction: output.record,
        summary: output.summary,
        downloads,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use paperlens_ingest::pdf::fixtures::text_pdf;
    use paperlens_llm::StubModel;

    use crate::routes::test_support::{app, body_json, multipart, post_form};

    fn paper_model() -> StubModel {
        StubModel::new(|prompt| {
            if prompt.contains("CHUNK PAGES") {
                Ok(r#"{"venue": "NAACL", "datasets": [{"name": "GLUE", "page": 1, "quote": "GLUE benchmark"}]}"#.into())
            } else if prompt.contains("Partials:") {
                Ok(r#"{"venue": "NAACL", "year": 2019, "datasets": [{"name": "GLUE", "page": 1, "quote": "GLUE benchmark"}]}"#.into())
            } else {
                Ok("Bidirectional pretraining summary.".into())
            }
        })
    }

    #[tokio::test]
    async fn test_extract_upload() {
        let pdf = text_pdf(&[&["BERT: Pre-training of Deep Bidirectional Transformers", "GLUE benchmark"]]);
        let body = multipart(&[
            ("file", Some("bert.pdf"), pdf.as_slice()),
            ("title", None, &b"BERT"[..]),
        ]);

        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["extraction"]["title"], "BERT");
        assert_eq!(json["extraction"]["year"], 2019);
        assert_eq!(json["extraction"]["datasets"][0]["name"], "GLUE");
        assert_eq!(json["summary"], "Bidirectional pretraining summary.");
        assert_eq!(json["report"]["chunkCount"], 1);
        assert_eq!(json["report"]["mergeStrategy"], "model_merge");

        let extraction_file = json["downloads"]["paper_extraction.json"].as_str().unwrap();
        assert!(extraction_file.contains("\"venue\": \"NAACL\""));
        let summary_file = json["downloads"]["paper_summary.txt"].as_str().unwrap();
        assert!(summary_file.starts_with("PAPER SUMMARY\n=================================================="));
    }

    #[tokio::test]
    async fn test_upload_wins_over_url() {
        let pdf = text_pdf(&[&["Some paper text"]]);
        let body = multipart(&[
            ("file", Some("paper.pdf"), pdf.as_slice()),
            ("url", None, &b"http://127.0.0.1:1/never-fetched.pdf"[..]),
        ]);
        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_input() {
        let body = multipart(&[("title", None, &b"Only a title"[..])]);
        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("PDF"));
    }

    #[tokio::test]
    async fn test_not_a_pdf() {
        let body = multipart(&[("file", Some("notes.pdf"), &b"plain text, not a PDF"[..])]);
        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_scanned_pdf_has_no_text() {
        let pdf = text_pdf(&[&[], &[]]);
        let model = paper_model();
        let body = multipart(&[("file", Some("scan.pdf"), pdf.as_slice())]);
        let response = post_form(app(model), body).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("No extractable text found"));
    }

    #[tokio::test]
    async fn test_url_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/paper.pdf")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/paper.pdf", server.url());
        let body = multipart(&[("url", None, url.as_bytes())]);
        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("HTTP 404"));
    }

    #[tokio::test]
    async fn test_url_source() {
        let mut server = mockito::Server::new_async().await;
        let pdf = text_pdf(&[&["Remote paper about GLUE"]]);
        server
            .mock("GET", "/remote.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(pdf)
            .create_async()
            .await;

        let url = format!("{}/remote.pdf", server.url());
        let body = multipart(&[("url", None, url.as_bytes())]);
        let response = post_form(app(paper_model()), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["report"]["pageCount"], 1);
        assert_eq!(json["extraction"]["title"], serde_json::Value::Null);
    }
}
