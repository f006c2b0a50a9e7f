use crate::error::RelayError;
use crate::io_struct::{CompletionChunk, Message};
use crate::server::RelayConfig;
use async_stream::try_stream;
use futures::Stream;
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::Serialize;
use std::pin::Pin;

const API_VERSION: &str = "2024-02-01";

/// Lazy, non-restartable sequence of completion chunks. Consumers pull one
/// chunk at a time; dropping the stream closes the upstream connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk, RelayError>> + Send>>;

/// Client for the Azure OpenAI chat-completions deployment. Built once at
/// startup and shared read-only across requests; each call opens an
/// independent streaming request.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
}

#[derive(Serialize)]
struct ChatCompletionsBody<'a> {
    messages: &'a [Message],
    stream: bool,
}

enum SseEvent {
    Chunk(CompletionChunk),
    Done,
}

/// Drain complete `data:` lines out of the byte buffer, leaving any partial
/// trailing line in place for the next network frame.
fn drain_events(buffer: &mut Vec<u8>) -> Result<Vec<SseEvent>, RelayError> {
    let mut events = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line_bytes: Vec<u8> = buffer.drain(..=pos).collect();
        let line = std::str::from_utf8(&line_bytes)
            .map_err(|e| RelayError::InvalidEventData(format!("non-UTF-8 event line: {e}")))?;
        let Some(data) = line.trim_end_matches(['\r', '\n']).strip_prefix("data:") else {
            continue;
        };
        let data = data.trim_start();
        if data.is_empty() {
            continue;
        }
        if data == "[DONE]" {
            events.push(SseEvent::Done);
            break;
        }
        let chunk = serde_json::from_str(data)
            .map_err(|e| RelayError::InvalidEventData(format!("{e}: {data}")))?;
        events.push(SseEvent::Chunk(chunk));
    }
    Ok(events)
}

impl UpstreamClient {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, API_VERSION
        )
    }

    /// Open a streaming completion call. Initiation failures are classified
    /// before any chunk is produced; after that, chunks arrive in upstream
    /// emission order until `[DONE]`, end of body, or a mid-stream error.
    pub async fn stream_chat_completions(
        &self,
        messages: &[Message],
    ) -> Result<ChunkStream, RelayError> {
        let body = ChatCompletionsBody {
            messages,
            stream: true,
        };
        let resp = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::UpstreamUnavailable(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RelayError::UpstreamAuthFailed(status));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RelayError::UpstreamRejected { status, body });
        }

        let mut bytes = resp.bytes_stream();
        Ok(Box::pin(try_stream! {
            let mut buffer = Vec::new();
            'read: while let Some(frame) = bytes.next().await {
                let frame = frame.map_err(|e| RelayError::Stream(e.to_string()))?;
                buffer.extend_from_slice(&frame);
                for event in drain_events(&mut buffer)? {
                    match event {
                        SseEvent::Chunk(chunk) => yield chunk,
                        SseEvent::Done => break 'read,
                    }
                }
            }
        }))
    }
}
