// src/llm/logging.rs
// Logging helpers shared by the provider clients

use super::provider::{FinishReason, NormalizedUsage};
use tracing::{info, warn};

/// Log usage statistics for a completion call.
pub fn log_usage(request_id: &str, provider: &str, usage: &NormalizedUsage) {
    info!(
        request_id = %request_id,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "{} usage stats", provider
    );
}

/// Log completion summary; truncated outputs are surfaced as warnings.
pub fn log_completion(
    request_id: &str,
    provider: &str,
    duration_ms: u64,
    content_len: usize,
    finish_reason: FinishReason,
) {
    if finish_reason == FinishReason::Length {
        warn!(
            request_id = %request_id,
            duration_ms = duration_ms,
            content_len = content_len,
            "{} completion hit the token limit; output may be truncated", provider
        );
        return;
    }
    info!(
        request_id = %request_id,
        duration_ms = duration_ms,
        content_len = content_len,
        finish_reason = ?finish_reason,
        "{} completion finished", provider
    );
}
