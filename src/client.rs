//! The OmniLLM client facade.
//!
//! [`Client`] composes the transport, retry controller and SSE decoder
//! into the public operations: blocking and streaming chat on each of the
//! three surfaces, the files/batches/tokenize/usage/analytics endpoints,
//! and the `complete`/`chat` conveniences.

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::batch::{BatchList, BatchObject, CreateBatchRequest};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::files::{DeletedFile, FileList, FileObject, FileUpload};
use crate::normalize;
use crate::pricing::{self, CostEstimate};
use crate::sse::frame_stream;
use crate::surface::Surface;
use crate::transport::{RequestEnvelope, Transport};
use crate::types::{
    ChatChunk, ChatMessage, ChatRequest, ChatResponse, MessageRequest, MessageResponse,
    MessageStreamEvent, TokenizeResponse, UsageReport,
};
use crate::types::AnalyticsReport;

/// Model used by the `complete`/`chat` conveniences.
pub const DEFAULT_MODEL: &str = "omni-large";

/// Temperature used by the `complete`/`chat` conveniences.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Max output tokens used by the conveniences and by cost estimation
/// when a request leaves `max_tokens` unset.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A lazy stream of decoded chat chunks.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatChunk>> + Send>>;

/// A lazy stream of Anthropic-style message events.
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<MessageStreamEvent>> + Send>>;

/// A lazy stream of plain text deltas.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Client for the OmniLLM gateway.
///
/// Cheap to clone-by-reference: configuration is shared read-only, and
/// each call owns its own request envelope and (for streaming) its own
/// decode buffer, so a single client may serve concurrent calls.
pub struct Client {
    config: Arc<ClientConfig>,
    transport: Transport,
}

impl Client {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Self {
        let config = Arc::new(config);
        Self {
            transport: Transport::new(config.clone()),
            config,
        }
    }

    /// Create a client from the `OMNILLM_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the variable is unset or
    /// empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    /// The client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ── Unified surface ─────────────────────────────────────────────

    /// Execute a chat completion on the unified surface.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_on(Surface::Unified, request).await
    }

    /// Stream a chat completion on the unified surface.
    pub async fn chat_completion_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        self.chat_stream_on(Surface::Unified, request).await
    }

    // ── OpenAI-compatible surface ───────────────────────────────────

    /// Execute a chat completion on the OpenAI-compatible surface.
    pub async fn openai_chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_on(Surface::OpenAi, request).await
    }

    /// Stream a chat completion on the OpenAI-compatible surface.
    pub async fn openai_chat_completion_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<ChatStream> {
        self.chat_stream_on(Surface::OpenAi, request).await
    }

    // ── Anthropic-compatible surface ────────────────────────────────

    /// Execute a message request on the Anthropic-compatible surface.
    pub async fn anthropic_message(&self, request: &MessageRequest) -> Result<MessageResponse> {
        let body = canonical_body(request)?;
        debug!(surface = Surface::Anthropic.name(), model = %request.model, "sending message request");
        let response = self
            .transport
            .execute(|| Ok(chat_envelope(Surface::Anthropic, body.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Stream a message request on the Anthropic-compatible surface.
    pub async fn anthropic_message_stream(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageStream> {
        let frames = self.raw_frame_stream(Surface::Anthropic, canonical_body(request)?).await?;
        Ok(Box::pin(frames.map(|frame| {
            frame.and_then(|value| {
                serde_json::from_value::<MessageStreamEvent>(value).map_err(|e| {
                    ClientError::InvalidResponse(format!("failed to parse stream event: {e}"))
                })
            })
        })))
    }

    // ── Convenience operations ──────────────────────────────────────

    /// One-shot completion of a single user prompt.
    ///
    /// Wraps the unified surface with the default model, temperature and
    /// max output tokens, and returns the first choice's content.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }

    /// One-shot chat over a prepared message list; returns the first
    /// choice's content.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = default_request(messages);
        let response = self.chat_completion(&request).await?;
        response
            .first_text()
            .map(str::to_owned)
            .ok_or_else(|| ClientError::InvalidResponse("response contained no choices".into()))
    }

    /// Streaming variant of [`Client::complete`]: yields only non-empty
    /// text deltas, in arrival order.
    pub async fn complete_stream(&self, prompt: &str) -> Result<TextStream> {
        self.chat_stream(vec![ChatMessage::user(prompt)]).await
    }

    /// Streaming variant of [`Client::chat`]: yields only non-empty text
    /// deltas, in arrival order. Chunks without a content delta (role
    /// headers, tool-call fragments, finish markers) are skipped.
    pub async fn chat_stream(&self, messages: Vec<ChatMessage>) -> Result<TextStream> {
        let request = default_request(messages);
        let chunks = self.chat_completion_stream(&request).await?;
        Ok(Box::pin(chunks.filter_map(|chunk| async move {
            match chunk {
                Ok(chunk) => chunk.delta_text().map(|t| Ok(t.to_owned())),
                Err(e) => Some(Err(e)),
            }
        })))
    }

    // ── Files ───────────────────────────────────────────────────────

    /// Upload a file, either as a JSON `{filename, content}` envelope or
    /// as a multipart form.
    pub async fn upload_file(&self, upload: &FileUpload) -> Result<FileObject> {
        let response = self
            .transport
            .execute(|| {
                Ok(match upload {
                    FileUpload::Inline { filename, content } => {
                        RequestEnvelope::new(Method::POST, "/files")
                            .json(json!({"filename": filename, "content": content}))
                    }
                    FileUpload::Multipart { filename, bytes } => {
                        let part = Part::bytes(bytes.clone()).file_name(filename.clone());
                        RequestEnvelope::new(Method::POST, "/files")
                            .multipart(Form::new().part("file", part))
                    }
                })
            })
            .await?;
        self.parse_json(response).await
    }

    /// List stored files.
    pub async fn list_files(&self) -> Result<FileList> {
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::GET, "/files")))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch one file's metadata.
    pub async fn get_file(&self, file_id: &str) -> Result<FileObject> {
        let path = format!("/files/{file_id}");
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::GET, path.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Download a file's raw content.
    pub async fn file_content(&self, file_id: &str) -> Result<Bytes> {
        let path = format!("/files/{file_id}/content");
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::GET, path.clone())))
            .await?;
        self.read_bytes(response).await
    }

    /// Delete a stored file.
    pub async fn delete_file(&self, file_id: &str) -> Result<DeletedFile> {
        let path = format!("/files/{file_id}");
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::DELETE, path.clone())))
            .await?;
        self.parse_json(response).await
    }

    // ── Batches ─────────────────────────────────────────────────────

    /// Create a batch job on the given surface.
    pub async fn create_batch(
        &self,
        surface: Surface,
        request: &CreateBatchRequest,
    ) -> Result<BatchObject> {
        let body = serde_json::to_value(request)?;
        let response = self
            .transport
            .execute(|| {
                Ok(surface_envelope(surface, Method::POST, surface.batches_path())
                    .json(body.clone()))
            })
            .await?;
        self.parse_json(response).await
    }

    /// List batch jobs on the given surface.
    pub async fn list_batches(&self, surface: Surface) -> Result<BatchList> {
        let response = self
            .transport
            .execute(|| Ok(surface_envelope(surface, Method::GET, surface.batches_path())))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch one batch job.
    pub async fn get_batch(&self, surface: Surface, batch_id: &str) -> Result<BatchObject> {
        let path = format!("{}/{batch_id}", surface.batches_path());
        let response = self
            .transport
            .execute(|| Ok(surface_envelope(surface, Method::GET, path.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Cancel a batch job.
    pub async fn cancel_batch(&self, surface: Surface, batch_id: &str) -> Result<BatchObject> {
        let path = format!("{}/{batch_id}/cancel", surface.batches_path());
        let response = self
            .transport
            .execute(|| Ok(surface_envelope(surface, Method::POST, path.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch a completed batch's results.
    pub async fn batch_results(&self, surface: Surface, batch_id: &str) -> Result<Value> {
        let path = format!("{}/{batch_id}/results", surface.batches_path());
        let response = self
            .transport
            .execute(|| Ok(surface_envelope(surface, Method::GET, path.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Export a batch's raw results (JSONL bytes).
    pub async fn export_batch(&self, surface: Surface, batch_id: &str) -> Result<Bytes> {
        let path = format!("{}/{batch_id}/export", surface.batches_path());
        let response = self
            .transport
            .execute(|| Ok(surface_envelope(surface, Method::GET, path.clone())))
            .await?;
        self.read_bytes(response).await
    }

    // ── Tokenize / reporting ────────────────────────────────────────

    /// Count tokens for `text` under `model`'s tokenizer.
    pub async fn tokenize(&self, model: &str, text: &str) -> Result<TokenizeResponse> {
        let body = json!({"model": model, "text": text});
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::POST, "/tokenize").json(body.clone())))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch the account's aggregate usage report.
    pub async fn usage(&self) -> Result<UsageReport> {
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::GET, "/usage")))
            .await?;
        self.parse_json(response).await
    }

    /// Fetch the account's structured analytics report.
    pub async fn analytics(&self) -> Result<AnalyticsReport> {
        let response = self
            .transport
            .execute(|| Ok(RequestEnvelope::new(Method::GET, "/analytics")))
            .await?;
        self.parse_json(response).await
    }

    /// Estimate the cost of a request before sending it.
    ///
    /// The input side is measured with one tokenize call; the output side
    /// assumes the request's `max_tokens` (default when unset) will be
    /// fully consumed. This is an estimate, not a measurement of what the
    /// request will actually cost.
    pub async fn estimate_cost(&self, request: &ChatRequest) -> Result<CostEstimate> {
        let text = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let tokenized = self.tokenize(&request.model, &text).await?;
        let output_tokens = request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        Ok(pricing::estimate(
            &request.model,
            tokenized.token_count,
            output_tokens,
        ))
    }

    // ── Shared plumbing ─────────────────────────────────────────────

    /// Read and deserialize a success response body.
    ///
    /// The transport's timeout covers only the exchange up to the
    /// response headers; the body read gets the same bound here so a
    /// stalled body surfaces as [`ClientError::Timeout`] instead of
    /// hanging the call.
    async fn parse_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let parsed = tokio::time::timeout(self.config.timeout, response.json::<T>())
            .await
            .map_err(|_| ClientError::Timeout)?;
        parsed.map_err(|e| ClientError::InvalidResponse(format!("failed to parse response: {e}")))
    }

    /// Read a raw success response body, bounded by the configured
    /// timeout.
    async fn read_bytes(&self, response: reqwest::Response) -> Result<Bytes> {
        tokio::time::timeout(self.config.timeout, response.bytes())
            .await
            .map_err(|_| ClientError::Timeout)?
            .map_err(Into::into)
    }

    async fn chat_on(&self, surface: Surface, request: &ChatRequest) -> Result<ChatResponse> {
        let body = canonical_body(request)?;
        debug!(
            surface = surface.name(),
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );
        let response = self
            .transport
            .execute(|| Ok(chat_envelope(surface, body.clone())))
            .await?;
        self.parse_json(response).await
    }

    async fn chat_stream_on(&self, surface: Surface, request: &ChatRequest) -> Result<ChatStream> {
        let body = canonical_body(request)?;
        debug!(
            surface = surface.name(),
            model = %request.model,
            messages = request.messages.len(),
            "sending streaming chat completion request"
        );
        let frames = self.raw_frame_stream(surface, body).await?;
        Ok(Box::pin(frames.map(|frame| {
            frame.and_then(|value| {
                serde_json::from_value::<ChatChunk>(value).map_err(|e| {
                    ClientError::InvalidResponse(format!("failed to parse stream chunk: {e}"))
                })
            })
        })))
    }

    /// Issue a streaming request and hand the response body to the SSE
    /// decoder. `stream: true` is forced onto the body here so callers
    /// cannot accidentally request a blocking response on this path.
    async fn raw_frame_stream(
        &self,
        surface: Surface,
        mut body: Value,
    ) -> Result<impl Stream<Item = Result<Value>> + Send + use<>> {
        body["stream"] = Value::Bool(true);
        let response = self
            .transport
            .execute(|| {
                Ok(chat_envelope(surface, body.clone()).header("Accept", "text/event-stream"))
            })
            .await?;
        Ok(frame_stream(Box::pin(response.bytes_stream())))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish()
    }
}

/// Serialize a request and fold camelCase field alternates into their
/// wire spelling.
fn canonical_body<T: Serialize>(request: &T) -> Result<Value> {
    let mut body = serde_json::to_value(request)?;
    normalize::canonicalize(&mut body);
    Ok(body)
}

/// Build the envelope for a chat/messages call on `surface`.
fn chat_envelope(surface: Surface, body: Value) -> RequestEnvelope {
    surface_envelope(surface, Method::POST, surface.chat_path()).json(body)
}

/// Build an envelope with `surface`'s auth mode and fixed headers.
fn surface_envelope(surface: Surface, method: Method, path: impl Into<String>) -> RequestEnvelope {
    let mut envelope = RequestEnvelope::new(method, path).auth(surface.auth());
    for (name, value) in surface.extra_headers() {
        envelope = envelope.header(name, *value);
    }
    envelope
}

/// The request shape used by the convenience operations.
fn default_request(messages: Vec<ChatMessage>) -> ChatRequest {
    let mut request = ChatRequest::new(DEFAULT_MODEL, messages);
    request.temperature = Some(DEFAULT_TEMPERATURE);
    request.max_tokens = Some(DEFAULT_MAX_TOKENS);
    request
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_fills_defaults() {
        let request = default_request(vec![ChatMessage::user("hi")]);
        assert_eq!(request.model, DEFAULT_MODEL);
        assert_eq!(request.temperature, Some(DEFAULT_TEMPERATURE));
        assert_eq!(request.max_tokens, Some(DEFAULT_MAX_TOKENS));
        assert!(request.stream.is_none());
    }

    #[test]
    fn canonical_body_folds_aliases() {
        let mut request = ChatRequest::new("omni-large", vec![ChatMessage::user("hi")]);
        request.extra.insert("maxTokens".into(), json!(256));
        let body = canonical_body(&request).unwrap();
        assert_eq!(body["max_tokens"], 256);
        assert!(body.get("maxTokens").is_none());
    }

    #[test]
    fn canonical_body_wire_form_wins() {
        let mut request = ChatRequest::new("omni-large", vec![ChatMessage::user("hi")]);
        request.max_tokens = Some(100);
        request.extra.insert("maxTokens".into(), json!(999));
        let body = canonical_body(&request).unwrap();
        assert_eq!(body["max_tokens"], 100);
        assert!(body.get("maxTokens").is_none());
    }

    #[test]
    fn chat_envelope_carries_surface_auth() {
        let envelope = chat_envelope(Surface::OpenAi, json!({}));
        assert_eq!(envelope.auth, crate::surface::AuthMode::Bearer);
        assert_eq!(envelope.path, "/openai/chat/completions");
    }

    #[test]
    fn anthropic_envelope_has_version_header() {
        let envelope = chat_envelope(Surface::Anthropic, json!({}));
        assert!(
            envelope
                .headers
                .iter()
                .any(|(k, v)| *k == "anthropic-version" && v == "2023-06-01")
        );
    }

    #[test]
    fn client_debug_masks_key() {
        let client = Client::new(ClientConfig::new("sk-secret").unwrap());
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
    }
}
