//! HTTP route handlers.

pub mod extract;
pub mod page;
pub mod status;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use paperlens_ingest::MAX_PDF_BYTES;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(page::routes())
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(extract::routes())
        .merge(status::routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, Response};
    use paperlens_core::PaperLensConfig;
    use paperlens_llm::{LLMConfig, StubModel};
    use tower::ServiceExt;

    use crate::state::AppState;

    pub const BOUNDARY: &str = "paperlens-test-boundary";

    pub fn app(model: StubModel) -> axum::Router {
        let llm_config = LLMConfig::from_lookup(|key| {
            (key == "GOOGLE_API_KEY").then(|| "secret-key".to_string())
        });
        let state = AppState::new(PaperLensConfig::default(), llm_config, Arc::new(model)).unwrap();
        super::build_router(Arc::new(state))
    }

    /// `(name, filename, content)` parts encoded as multipart/form-data.
    pub fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                        name, f
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    pub async fn post_form(app: axum::Router, body: Vec<u8>) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/api/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    pub async fn get(app: axum::Router, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
