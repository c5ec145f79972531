pub mod phrases;
pub mod processor;

use axum::{
    body::Bytes, extract::rejection::BytesRejection, response::Html, routing::get, routing::post,
    Json, Router,
};

use processor::Processor;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatRequest {
    /// Bodies that are missing, not JSON, or lack `message` read as an empty message.
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::warn!("Unreadable chat body, treating as empty: {e}");
            Self::default()
        })
    }
}

pub fn app(processor: Processor) -> Router {
    Router::new().route("/", get(index)).route(
        "/chat",
        post(move |body: Result<Bytes, BytesRejection>| {
            message_handler(body, processor.clone())
        }),
    )
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn message_handler(
    body: Result<Bytes, BytesRejection>,
    processor: Processor,
) -> Json<ChatResponse> {
    let request = match body {
        Ok(body) => ChatRequest::from_body(&body),
        Err(e) => {
            tracing::warn!("Rejected chat body, treating as empty: {e}");
            ChatRequest::default()
        }
    };
    tracing::info!("Processing request: {:?}", &request);

    Json(processor.process_request(request).await)
}
