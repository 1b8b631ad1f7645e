// src/llm/sse.rs
// Decode a provider's server-sent event body into `data:` payloads

use futures::{Stream, StreamExt};
use std::pin::Pin;
use tracing::warn;

use crate::error::{AnalyzerError, Result};

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decode a whole frame; only complete frames are decoded so multi-byte characters stay intact
fn decode_frame(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace("\r\n", "\n")
}

/// Split the next complete frame (terminated by a blank line) off the byte buffer
fn take_frame(buffer: &mut Vec<u8>) -> Option<String> {
    let (pos, sep_len) = [&b"\r\n\r\n"[..], &b"\n\n"[..]]
        .iter()
        .filter_map(|sep| find_bytes(buffer.as_slice(), sep).map(|pos| (pos, sep.len())))
        .min_by_key(|(pos, _)| *pos)?;
    let frame = decode_frame(&buffer[..pos]);
    buffer.drain(..pos + sep_len);
    Some(frame)
}

/// Joined `data:` lines of one frame; comments and `event:` lines are skipped
pub fn frame_data(frame: &str) -> Option<String> {
    let data: Vec<&str> = frame
        .lines()
        .filter(|line| !line.starts_with(':'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

type ByteStream<B> = Pin<Box<dyn Stream<Item = std::result::Result<B, reqwest::Error>> + Send>>;

/// Turn a raw byte stream into a stream of event payloads, buffering partial frames
pub fn sse_data_stream<S, B>(bytes: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let inner: ByteStream<B> = Box::pin(bytes);

    futures::stream::unfold(
        (inner, Vec::<u8>::new(), false),
        |(mut inner, mut buffer, mut finished)| async move {
            loop {
                if let Some(frame) = take_frame(&mut buffer) {
                    match frame_data(&frame) {
                        Some(data) => return Some((Ok(data), (inner, buffer, finished))),
                        None => continue,
                    }
                }

                if finished {
                    let frame = decode_frame(&std::mem::take(&mut buffer));
                    if !frame.trim().is_empty() {
                        if let Some(data) = frame_data(&frame) {
                            return Some((Ok(data), (inner, buffer, finished)));
                        }
                        warn!(remaining = %frame, "Stream ended with unparsed data in buffer");
                    }
                    return None;
                }

                match inner.next().await {
                    Some(Ok(bytes)) => {
                        buffer.extend_from_slice(bytes.as_ref());
                    }
                    Some(Err(e)) => {
                        finished = true;
                        return Some((
                            Err(AnalyzerError::Provider(format!("Stream error: {}", e))),
                            (inner, buffer, finished),
                        ));
                    }
                    None => finished = true,
                }
            }
        },
    )
}
