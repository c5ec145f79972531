//! Completion client against a mocked chat-completion endpoint.

use completion_client::{
    Client, ClientConfig, CompletionError, APOLOGY_REPLY, MISSING_CREDENTIAL_REPLY,
};
use mockito::Matcher;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Captures INFO and above for the current thread until the guard drops.
fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

fn client_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> Client {
    Client::new(ClientConfig {
        api_url: format!("{}{}", server.url(), COMPLETIONS_PATH),
        api_key: api_key.map(str::to_owned),
        timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    })
    .expect("client builds")
}

#[tokio::test]
async fn returns_first_choice_with_bold_rewritten() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": completion_client::DEFAULT_MODEL,
            "messages": [
                {"role": "system", "content": completion_client::SYSTEM_PROMPT},
                {"role": "user", "content": "what is my deductible"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[
                {"message":{"role":"assistant","content":"**Hello** world"}},
                {"message":{"role":"assistant","content":"ignored"}}
            ]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server, Some("test-key"));
    let reply = client.generate_reply("what is my deductible").await;

    assert_eq!(reply, "<strong>Hello</strong> world");
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_key_skips_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", COMPLETIONS_PATH)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, None);
    assert_eq!(
        client.generate_reply("is my claim approved").await,
        MISSING_CREDENTIAL_REPLY
    );
    assert!(matches!(
        client.request_completion("is my claim approved").await,
        Err(CompletionError::MissingCredential)
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_becomes_apology() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(502)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = client_for(&server, Some("test-key"));
    match client.request_completion("coverage question").await {
        Err(CompletionError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(
        client.generate_reply("coverage question").await,
        APOLOGY_REPLY
    );
}

#[tokio::test]
async fn malformed_body_becomes_apology() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json at all")
        .create_async()
        .await;

    let client = client_for(&server, Some("test-key"));
    assert!(matches!(
        client.request_completion("premium").await,
        Err(CompletionError::Decode(_))
    ));
    assert_eq!(client.generate_reply("premium").await, APOLOGY_REPLY);
}

#[tokio::test]
async fn empty_choices_becomes_apology() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server, Some("test-key"));
    assert!(matches!(
        client.request_completion("premium").await,
        Err(CompletionError::EmptyChoices)
    ));
    assert_eq!(client.generate_reply("premium").await, APOLOGY_REPLY);
}

#[tokio::test]
async fn unreachable_endpoint_becomes_apology() {
    let client = Client::new(ClientConfig {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        api_url: "http://127.0.0.1:9/api/v1/chat/completions".into(),
        api_key: Some("test-key".into()),
        timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    })
    .expect("client builds");

    assert_eq!(client.generate_reply("life insurance").await, APOLOGY_REPLY);
}

#[tokio::test]
async fn failed_request_logs_error_with_latency_and_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", COMPLETIONS_PATH)
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server, Some("test-key"));
    let (logs, _guard) = capture_logs();
    assert_eq!(client.generate_reply("claim status").await, APOLOGY_REPLY);

    let logs = logs.contents();
    assert!(logs.contains("Completion request failed"), "{logs}");
    assert!(logs.contains("elapsed_time="), "{logs}");
    assert!(logs.contains("status=503"), "{logs}");
    assert!(!logs.contains("SUCCESS"), "{logs}");
}
