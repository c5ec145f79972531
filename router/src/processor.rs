use crate::phrases::{PhraseTables, Route};
use crate::{ChatRequest, ChatResponse};
use completion_client::Client;

use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

pub const EMPTY_MESSAGE_REPLY: &str = "Please enter a message.";
pub const OFF_TOPIC_REPLY: &str = "I'm here to help with insurance-related questions only.";

#[derive(Clone, Debug)]
pub struct Processor {
    tables: Arc<PhraseTables>,
    client: Client,
}

impl Processor {
    pub fn new(tables: PhraseTables, client: Client) -> Self {
        Self {
            tables: Arc::new(tables),
            client,
        }
    }

    #[instrument(skip_all, fields(route, elapsed_time))]
    pub async fn process_request(&self, request: ChatRequest) -> ChatResponse {
        let span = tracing::Span::current();
        let start_time = Instant::now();

        let route = self.tables.classify(&request.message);
        span.record("route", route.name());

        let reply = match route {
            Route::OnTopic => self.client.generate_reply(request.message.trim()).await,
            Route::Empty => EMPTY_MESSAGE_REPLY.to_owned(),
            Route::Basic(reply) => reply.to_owned(),
            Route::OffTopic => OFF_TOPIC_REPLY.to_owned(),
        };
        span.record("elapsed_time", start_time.elapsed().as_secs_f32());

        // On-topic outcomes are logged by the client inside its own span.
        match route {
            Route::Empty => tracing::info!("Empty message, asked for input"),
            Route::Basic(_) => tracing::info!("Answered with canned reply"),
            Route::OffTopic => tracing::info!("Refused off-topic message"),
            Route::OnTopic => {}
        }
        ChatResponse { reply }
    }
}
