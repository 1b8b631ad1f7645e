// src/streaming.rs
// Wire framing for analysis events and incremental JSON extraction

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

use crate::analyzer::AnalysisStreamEvent;
use crate::llm::sse::frame_data;
use crate::parser::balanced_block;

/// One `data: <json>\n\n` frame
pub fn to_sse_frame(event: &AnalysisStreamEvent) -> String {
    match serde_json::to_string(event) {
        Ok(json) => format!("data: {}\n\n", json),
        Err(e) => {
            warn!(error = %e, kind = event.kind(), "Failed to serialize stream event");
            String::new()
        }
    }
}

/// Parse one frame back into an event; `None` for comments or foreign payloads
pub fn parse_sse_frame(frame: &str) -> Option<AnalysisStreamEvent> {
    let data = frame_data(frame.trim_end_matches('\n'))?;
    serde_json::from_str(&data).ok()
}

/// Map an event stream onto SSE frames
pub fn sse_frames<S>(events: S) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = AnalysisStreamEvent> + Send,
{
    events
        .map(|event| to_sse_frame(&event))
        .filter(|frame| futures::future::ready(!frame.is_empty()))
}

/// One NDJSON line per event
pub fn to_ndjson_line(event: &AnalysisStreamEvent) -> String {
    match serde_json::to_string(event) {
        Ok(json) => format!("{}\n", json),
        Err(e) => {
            warn!(error = %e, kind = event.kind(), "Failed to serialize stream event");
            String::new()
        }
    }
}

/// Accumulates streamed model text and yields the first complete JSON value
#[derive(Debug, Default, Clone)]
pub struct JsonStreamBuffer {
    buffer: String,
}

impl JsonStreamBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    /// Extract the first balanced JSON value, keeping whatever follows it.
    ///
    /// Returns `None` while the value is incomplete. A balanced block that is not
    /// valid JSON is discarded so the next call can make progress.
    pub fn try_parse(&mut self) -> Option<Value> {
        let (start, end) = balanced_block(&self.buffer)?;
        let parsed = serde_json::from_str(&self.buffer[start..end]);
        self.buffer.drain(..end);
        match parsed {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "Discarding malformed JSON block from stream");
                None
            }
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
