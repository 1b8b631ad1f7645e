// src/llm/openai.rs
// OpenAI-compatible chat completions client

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{Span, debug, info, instrument};
use uuid::Uuid;

use super::http_client::LlmHttpClient;
use super::logging::{log_completion, log_usage};
use super::provider::{
    ChunkStream, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Message,
    NormalizedUsage, Provider, StreamChunk,
};
use super::sse::sse_data_stream;
use crate::error::{AnalyzerError, Result};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    http: LlmHttpClient,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url
                .unwrap_or_else(|| Provider::OpenAi.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            http: LlmHttpClient::new(timeout),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_body(&self, request: &CompletionRequest, stream: bool) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
            stop: &request.stop,
            stream,
            stream_options: stream.then_some(StreamOptions { include_usage: true }),
        };
        Ok(serde_json::to_string(&body)?)
    }

    fn map_finish_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Tracks a streamed completion; OpenAI sends usage in its own event after `finish_reason`
#[derive(Debug, Default)]
struct StreamState {
    usage: Option<NormalizedUsage>,
    finished: bool,
    closed: bool,
}

impl StreamState {
    /// Chunk for one event; the final chunk is held back until usage arrives
    fn on_event(&mut self, event: StreamEvent) -> Option<StreamChunk> {
        if let Some(u) = event.usage {
            self.usage = Some(NormalizedUsage::new(u.prompt_tokens, u.completion_tokens));
        }
        let choice = event.choices.into_iter().next();
        if choice.as_ref().is_some_and(|c| c.finish_reason.is_some()) {
            self.finished = true;
        }
        let content = choice.and_then(|c| c.delta.content).unwrap_or_default();

        if self.finished && self.usage.is_some() {
            self.closed = true;
            return Some(StreamChunk {
                content,
                done: true,
                usage: self.usage,
            });
        }
        (!content.is_empty()).then(|| StreamChunk {
            content,
            done: false,
            usage: None,
        })
    }

    /// Final chunk at `[DONE]` or end of body, unless one was already sent
    fn on_end(&mut self) -> Option<StreamChunk> {
        if self.closed {
            return None;
        }
        self.closed = true;
        Some(StreamChunk {
            content: String::new(),
            done: true,
            usage: self.usage,
        })
    }
}

/// Turn `data:` payloads into chunks, ending with exactly one `done` chunk
fn chunk_stream<S>(payloads: S) -> impl futures::Stream<Item = Result<StreamChunk>> + Send + 'static
where
    S: futures::Stream<Item = Result<String>> + Send + 'static,
{
    async_stream::stream! {
        let mut payloads = Box::pin(payloads);
        let mut state = StreamState::default();

        while let Some(item) = payloads.next().await {
            let data = match item {
                Ok(data) => data,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            if data.trim() == "[DONE]" {
                break;
            }
            match serde_json::from_str::<StreamEvent>(&data) {
                Ok(event) => {
                    if let Some(chunk) = state.on_event(event) {
                        yield Ok(chunk);
                    }
                }
                Err(e) => {
                    yield Err(AnalyzerError::from(e));
                    return;
                }
            }
            if state.closed {
                return;
            }
        }

        if let Some(chunk) = state.on_end() {
            yield Ok(chunk);
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    #[instrument(skip(self, request), fields(request_id, model = %self.model, message_count = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", &request_id);

        let body = self.build_body(&request, false)?;
        debug!(request_id = %request_id, json_mode = request.json_mode, "Sending chat completion");

        let url = self.endpoint();
        let text = self
            .http
            .post_for_text(&request_id, body, |client, body| {
                client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .header("Content-Type", "application/json")
                    .body(body)
            })
            .await?;

        let response: ChatResponse = serde_json::from_str(&text)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AnalyzerError::Provider("OpenAI response contained no choices".into()))?;

        let usage = response
            .usage
            .map(|u| NormalizedUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        let finish_reason = Self::map_finish_reason(choice.finish_reason.as_deref());
        let content = choice.message.content.unwrap_or_default();

        log_usage(&request_id, "OpenAI", &usage);
        log_completion(
            &request_id,
            "OpenAI",
            start_time.elapsed().as_millis() as u64,
            content.len(),
            finish_reason,
        );

        Ok(CompletionResponse {
            content,
            usage,
            model: if response.model.is_empty() { self.model.clone() } else { response.model },
            finish_reason,
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<ChunkStream> {
        let request_id = Uuid::new_v4().to_string();
        let body = self.build_body(&request, true)?;
        let url = self.endpoint();

        info!(request_id = %request_id, model = %self.model, "Starting streamed chat completion");
        let response = self
            .http
            .post_for_response(&request_id, body, |client, body| {
                client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .header("Content-Type", "application/json")
                    .header("Accept", "text/event-stream")
                    .body(body)
            })
            .await?;

        Ok(Box::pin(chunk_stream(sse_data_stream(response.bytes_stream()))))
    }

    fn provider_type(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
