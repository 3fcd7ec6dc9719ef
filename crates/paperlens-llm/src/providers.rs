//! External LLM provider streaming implementations.
//!
//! Each provider streams tokens via SSE from its API. OpenAI and Groq share
//! one format; Anthropic and Gemini each have their own. Only the request
//! body and the per-line decoding differ, the SSE framing is shared.

use std::pin::Pin;

use futures::Stream;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, error};

use crate::model::ModelError;
use crate::types::{ChatMessage, LLMProvider};

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(ModelError),
}

/// Decoded meaning of one `data:` payload.
#[derive(Debug, PartialEq)]
pub enum Delta {
    Token(String),
    Done,
    Error(String),
    Skip,
}

/// Parameters shared by every provider request.
#[derive(Debug, Clone)]
pub struct StreamRequest<'a> {
    pub base_url: &'a str,
    pub model: &'a str,
    pub api_key: &'a str,
    pub temperature: f64,
    pub max_tokens: usize,
}

/// Stream tokens from the appropriate provider.
pub fn stream_llm(
    client: &Client,
    provider: LLMProvider,
    messages: Vec<ChatMessage>,
    req: StreamRequest<'_>,
) -> BoxedStream {
    let base = req.base_url.trim_end_matches('/');
    match provider {
        LLMProvider::OpenAI | LLMProvider::Groq => {
            let msgs: Vec<Value> = messages
                .iter()
                .map(|m| json!({"role": m.role, "content": m.content}))
                .collect();
            let body = json!({
                "model": req.model,
                "messages": msgs,
                "temperature": req.temperature,
                "max_tokens": req.max_tokens,
                "stream": true,
            });
            let request = client
                .post(format!("{}/chat/completions", base))
                .header("Authorization", format!("Bearer {}", req.api_key))
                .header("Content-Type", "application/json")
                .json(&body);
            debug!("Streaming from {} with model {}", provider, req.model);
            Box::pin(sse_stream(request, decode_openai_data))
        }
        LLMProvider::Anthropic => {
            let request = client
                .post(format!("{}/messages", base))
                .header("x-api-key", req.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&anthropic_body(&messages, &req));
            debug!("Streaming from Anthropic with model {}", req.model);
            Box::pin(sse_stream(request, decode_anthropic_data))
        }
        LLMProvider::Gemini => {
            let request = client
                .post(format!(
                    "{}/models/{}:streamGenerateContent?alt=sse",
                    base, req.model
                ))
                .header("x-goog-api-key", req.api_key)
                .header("Content-Type", "application/json")
                .json(&gemini_body(&messages, &req));
            debug!("Streaming from Gemini with model {}", req.model);
            Box::pin(sse_stream(request, decode_gemini_data))
        }
    }
}

fn anthropic_body(messages: &[ChatMessage], req: &StreamRequest<'_>) -> Value {
    // Separate system message from conversation
    let system_msg: Option<&str> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str());
    let conv_msgs: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({"role": m.role, "content": m.content}))
        .collect();

    let mut body = json!({
        "model": req.model,
        "messages": conv_msgs,
        "temperature": req.temperature,
        "max_tokens": req.max_tokens,
        "stream": true,
    });
    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }
    body
}

fn gemini_body(messages: &[ChatMessage], req: &StreamRequest<'_>) -> Value {
    let system_msg: Option<&str> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.as_str());
    let contents: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| {
            let role = if m.role == "assistant" { "model" } else { "user" };
            json!({"role": role, "parts": [{"text": m.content}]})
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": req.temperature,
            "maxOutputTokens": req.max_tokens,
        },
    });
    if let Some(sys) = system_msg {
        body["systemInstruction"] = json!({"parts": [{"text": sys}]});
    }
    body
}

/// Send the request and turn its SSE body into a token stream.
fn sse_stream(
    request: RequestBuilder,
    decode: fn(&str) -> Delta,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(ModelError::Request(e.to_string()));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(ModelError::Api { status, body });
            return;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = LineBuffer::default();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(ModelError::Stream(e.to_string()));
                    return;
                }
            };

            buffer.push(&bytes);

            while let Some(line) = buffer.next_line() {
                let Some(data) = sse_data(&line) else { continue };
                match decode(data) {
                    Delta::Token(text) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    Delta::Done => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    Delta::Error(msg) => {
                        error!("Provider error: {}", msg);
                        yield StreamChunk::Error(ModelError::Provider(msg));
                        return;
                    }
                    Delta::Skip => {}
                }
            }
        }

        // A final line may arrive without a trailing newline.
        let rest = buffer.finish();
        if let Some(data) = sse_data(&rest) {
            if let Delta::Token(text) = decode(data) {
                token_count += 1;
                yield StreamChunk::Token(text);
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

/// Byte buffer that hands out complete lines. Text is decoded per line, so a
/// code point split across network chunks is reassembled first.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.bytes.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.bytes.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Whatever follows the last newline.
    fn finish(self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }
}

/// Payload of a `data:` line; comments, blanks and `event:` lines are skipped.
fn sse_data(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:").map(str::trim_start)
}

/// OpenAI-compatible chat completion chunk.
pub fn decode_openai_data(data: &str) -> Delta {
    if data.trim() == "[DONE]" {
        return Delta::Done;
    }
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return Delta::Skip;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return Delta::Error(msg.to_string());
    }
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => Delta::Token(content.to_string()),
        _ => Delta::Skip,
    }
}

/// Anthropic Messages API event.
pub fn decode_anthropic_data(data: &str) -> Delta {
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return Delta::Skip;
    };
    match parsed["type"].as_str() {
        Some("content_block_delta") => match parsed["delta"]["text"].as_str() {
            Some(text) if !text.is_empty() => Delta::Token(text.to_string()),
            _ => Delta::Skip,
        },
        Some("message_stop") => Delta::Done,
        Some("error") => Delta::Error(
            parsed["error"]["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        ),
        _ => Delta::Skip,
    }
}

/// Gemini `GenerateContentResponse` chunk.
pub fn decode_gemini_data(data: &str) -> Delta {
    let Ok(parsed) = serde_json::from_str::<Value>(data) else {
        return Delta::Skip;
    };
    if let Some(msg) = parsed["error"]["message"].as_str() {
        return Delta::Error(msg.to_string());
    }
    let text: String = parsed["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .concat()
        })
        .unwrap_or_default();
    if text.is_empty() {
        Delta::Skip
    } else {
        Delta::Token(text)
    }
}
