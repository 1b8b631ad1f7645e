// src/llm/anthropic.rs
// Anthropic Messages API client

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
    NormalizedUsage, Provider, Role, StreamChunk,
};
use super::sse::sse_data_stream;
use crate::error::{AnalyzerError, Result};

const ANTHROPIC_VERSION: &str = "2023-06-01";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<&'a Message>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop_sequences: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Streaming events; anything not listed is ignored
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    MessageStart { message: StartMessage },
    ContentBlockDelta { delta: TextDelta },
    MessageDelta { #[serde(default)] usage: Usage },
    MessageStop,
    Error { error: ApiError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct StartMessage {
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    http: LlmHttpClient,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String, base_url: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url
                .unwrap_or_else(|| Provider::Anthropic.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            http: LlmHttpClient::new(timeout),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    /// System prompt goes in its own field; the rest stay as the conversation
    fn build_body(&self, request: &CompletionRequest, stream: bool) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_prompt(),
            messages: request.messages.iter().filter(|m| m.role != Role::System).collect(),
            stop_sequences: &request.stop,
            stream,
        };
        Ok(serde_json::to_string(&body)?)
    }

    fn map_finish_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Stop,
        }
    }

    /// Fold one streamed event into an optional chunk, accumulating token counts
    fn stream_chunk(event: StreamEvent, input: &mut u32, output: &mut u32) -> Result<Option<StreamChunk>> {
        match event {
            StreamEvent::MessageStart { message } => {
                *input = message.usage.input_tokens;
                Ok(None)
            }
            StreamEvent::ContentBlockDelta { delta } => Ok(delta.text.map(|text| StreamChunk {
                content: text,
                done: false,
                usage: None,
            })),
            StreamEvent::MessageDelta { usage } => {
                *output = usage.output_tokens;
                Ok(None)
            }
            StreamEvent::MessageStop => Ok(Some(StreamChunk {
                content: String::new(),
                done: true,
                usage: Some(NormalizedUsage::new(*input, *output)),
            })),
            StreamEvent::Error { error } => Err(AnalyzerError::Provider(error.message)),
            StreamEvent::Other => Ok(None),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    #[instrument(skip(self, request), fields(request_id, model = %self.model, message_count = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        Span::current().record("request_id", &request_id);

        if request.json_mode {
            debug!(request_id = %request_id, "JSON mode relies on prompt instructions for this provider");
        }
        let body = self.build_body(&request, false)?;

        let url = self.endpoint();
        let text = self
            .http
            .post_for_text(&request_id, body, |client, body| {
                client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .header("Content-Type", "application/json")
                    .body(body)
            })
            .await?;

        let response: MessagesResponse = serde_json::from_str(&text)?;
        let content = response
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .unwrap_or_default();
        let usage = NormalizedUsage::new(response.usage.input_tokens, response.usage.output_tokens);
        let finish_reason = Self::map_finish_reason(response.stop_reason.as_deref());

        log_usage(&request_id, "Anthropic", &usage);
        log_completion(
            &request_id,
            "Anthropic",
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

        info!(request_id = %request_id, model = %self.model, "Starting streamed message");
        let response = self
            .http
            .post_for_response(&request_id, body, |client, body| {
                client
                    .post(&url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .header("Content-Type", "application/json")
                    .header("Accept", "text/event-stream")
                    .body(body)
            })
            .await?;

        let (mut input, mut output) = (0u32, 0u32);
        let stream = sse_data_stream(response.bytes_stream()).filter_map(move |item| {
            let chunk = item.and_then(|data| {
                let event: StreamEvent = serde_json::from_str(&data)?;
                Self::stream_chunk(event, &mut input, &mut output)
            });
            async move { chunk.transpose() }
        });

        Ok(Box::pin(stream))
    }

    fn provider_type(&self) -> Provider {
        Provider::Anthropic
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}
