mod error;
pub mod markdown;

pub use error::CompletionError;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::instrument;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "mistralai/mistral-small-3.2-24b-instruct:free";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const SYSTEM_PROMPT: &str = "You are a knowledgeable and friendly Insurance AI Agent. \
Provide clear, concise, and helpful answers about insurance policies, claims, coverage, and financial protection. \
Use structured formatting when helpful, and avoid jargon unless explained.";

pub const MISSING_CREDENTIAL_REPLY: &str =
    "The Insurance AI Agent is not configured: no API key was provided.";
pub const APOLOGY_REPLY: &str =
    "Sorry, the Insurance AI Agent couldn't respond. Please check your internet connection.";

#[derive(Serialize, Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_owned(),
            content: content.to_owned(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: &str, temperature: f32, message: &str) -> Self {
        Self {
            model: model.to_owned(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", message),
            ],
            temperature,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Text of the first choice, if the provider sent one.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            api_key: None,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for the hosted chat-completion endpoint.
///
/// One request per call, no retries. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let api_key = config
            .api_key
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty());

        Ok(Self {
            http,
            url: config.api_url,
            api_key,
            model: config.model,
            temperature: config.temperature,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Asks the completion API about `message` and always comes back with text
    /// that can be shown to the user.
    pub async fn generate_reply(&self, message: &str) -> String {
        match self.request_completion(message).await {
            Ok(content) => content,
            Err(CompletionError::MissingCredential) => MISSING_CREDENTIAL_REPLY.to_owned(),
            Err(_) => APOLOGY_REPLY.to_owned(),
        }
    }

    #[instrument(skip_all, fields(model = %self.model, elapsed_time, status))]
    pub async fn request_completion(&self, message: &str) -> Result<String, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("No API key configured, skipping completion request");
            return Err(CompletionError::MissingCredential);
        };

        let span = tracing::Span::current();
        let start_time = Instant::now();
        let result = self.send_completion(api_key, message).await;
        span.record("elapsed_time", start_time.elapsed().as_secs_f32());

        match result {
            Ok(content) => {
                tracing::info!("SUCCESS");
                Ok(markdown::bold_to_html(&content))
            }
            Err(e) => {
                tracing::error!("Completion request failed: {e}");
                Err(e)
            }
        }
    }

    async fn send_completion(
        &self,
        api_key: &str,
        message: &str,
    ) -> Result<String, CompletionError> {
        let payload = CompletionRequest::new(&self.model, self.temperature, message);
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(CompletionError::Transport)?;

        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let completion: CompletionResponse =
            response.json().await.map_err(CompletionError::Decode)?;
        completion.into_content().ok_or(CompletionError::EmptyChoices)
    }
}
