// src/llm/mod.rs
// Completion backends: provider trait, HTTP clients, and factory

pub mod anthropic;
pub mod factory;
pub mod http_client;
pub mod logging;
pub mod openai;
pub mod provider;
pub mod sse;

pub use anthropic::AnthropicClient;
pub use factory::{ProviderFactory, ProviderSettings};
pub use http_client::{LlmHttpClient, RetryPolicy};
pub use openai::OpenAiClient;
pub use provider::{
    ChunkStream, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Message,
    NormalizedUsage, Provider, Role, StreamChunk,
};
