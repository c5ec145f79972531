use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tokio::net::TcpListener;

use chat_router::{app, phrases::PhraseTables, processor::Processor};
use completion_client::{Client, ClientConfig};

#[derive(Parser, Debug)]
#[clap(about = "Insurance chat endpoint backed by a hosted completion API")]
struct Args {
    #[clap(short, long, env = "CHAT_ADDRESS", default_value = "127.0.0.1:5000")]
    address: String,
    #[clap(long, env = "API_URL", default_value = completion_client::DEFAULT_API_URL)]
    api_url: String,
    #[clap(short, long, env = "API_MODEL", default_value = completion_client::DEFAULT_MODEL)]
    model: String,
    #[clap(short, long, env = "API_TEMPERATURE", default_value_t = completion_client::DEFAULT_TEMPERATURE)]
    temperature: f32,
    #[clap(long, env = "API_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,
    #[clap(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env loaded: {e}");
    }

    let args = Args::parse();
    tracing::info!(
        "Starting chat router on [{}] using model [{}] at [{}]",
        args.address,
        args.model,
        args.api_url
    );

    let client = Client::new(ClientConfig {
        api_url: args.api_url,
        api_key: args.api_key,
        model: args.model,
        temperature: args.temperature,
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    if !client.has_credential() {
        tracing::warn!("API_KEY is not set, on-topic questions will not reach the completion API");
    }

    let proc = Processor::new(PhraseTables::default(), client);
    let app = app(proc);

    tracing::info!("Listening on {}", &args.address);
    let listener = TcpListener::bind(&args.address)
        .await
        .with_context(|| format!("failed to bind {}", args.address))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("Server shutdown");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
