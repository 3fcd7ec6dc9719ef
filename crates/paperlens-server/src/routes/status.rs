//! Status route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status: active model and chunking limits. Keys are never exposed.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.llm_config.to_status(),
        "chunking": state.config.chunking,
        "fetchTimeoutSecs": state.config.fetch_timeout_secs,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use paperlens_llm::StubModel;

    use crate::routes::test_support::{app, body_json, get};

    #[tokio::test]
    async fn test_status() {
        let response = get(app(StubModel::constant("{}")), "/api/status").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"]["activeProvider"], "gemini");
        assert_eq!(json["model"]["geminiConfigured"], true);
        assert_eq!(json["chunking"]["maxChars"], 12_000);
        assert_eq!(json["chunking"]["maxPagesPerChunk"], 5);
        assert!(!json.to_string().contains("secret-key"));
    }
}
