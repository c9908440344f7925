//! Request and response types for the chat surfaces.
//!
//! The unified and OpenAI-compatible surfaces share the OpenAI chat
//! completion shapes; the Anthropic-compatible surface has its own
//! message shapes. Unknown or vendor-specific options ride along in the
//! flattened `extra` maps and are canonicalized (camelCase alternates
//! folded to snake_case) just before transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The role of the message author ("system", "user", "assistant", "tool").
    pub role: String,

    /// The content of the message.
    pub content: String,

    /// For tool-result messages, the ID of the tool call this answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Tool calls requested by the assistant in this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatMessage {
    /// Create a message with a role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,

    /// The type of tool call. Currently always "function".
    #[serde(rename = "type")]
    pub call_type: String,

    /// The function to invoke.
    pub function: FunctionCall,
}

/// A function invocation within a tool call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// The name of the function to call.
    pub name: String,

    /// The arguments as a JSON string.
    pub arguments: String,
}

/// A chat completion request for the unified or OpenAI-compatible surface.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model identifier (e.g. "omni-large", "gpt-4o").
    pub model: String,

    /// The conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    /// Tool definitions available to the model.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,

    /// Tool-choice directive ("auto", "none", or a specific tool).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,

    /// Whether to stream the response. Set by the streaming operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Additional options passed through to the wire. Accepts camelCase
    /// alternates for a fixed set of fields; see the crate docs.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ChatRequest {
    /// Create a minimal chat request with a model and messages.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            tools: Vec::new(),
            tool_choice: None,
            stream: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// A chat completion response (unified and OpenAI-compatible surfaces).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    pub id: String,

    /// The list of completion choices.
    pub choices: Vec<Choice>,

    /// Token usage statistics, if available.
    pub usage: Option<Usage>,

    /// The model that generated the response.
    pub model: String,
}

impl ChatResponse {
    /// The first choice's message content, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// A single completion choice within a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Choice {
    /// The index of this choice in the list.
    pub index: i32,

    /// The assistant's response message.
    pub message: ChatMessage,

    /// Why generation stopped ("stop", "tool_calls", "length").
    pub finish_reason: Option<String>,
}

/// Token usage statistics for a completion.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Usage {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Number of tokens in the generated completion.
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,
}

// ── Streaming chunk shapes ──────────────────────────────────────────────

/// One decoded streaming chunk from the unified or OpenAI-compatible
/// surface.
///
/// Every field is optional or defaulted: gateways differ in which fields
/// appear in which chunk, and a permissive shape keeps the deliberate
/// drop-malformed-frames policy confined to the SSE layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChatChunk {
    /// Completion identifier, when sent.
    #[serde(default)]
    pub id: Option<String>,

    /// Model identifier, when sent.
    #[serde(default)]
    pub model: Option<String>,

    /// The chunk's choices (usually one).
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,

    /// Usage statistics; some gateways attach them to the final chunk.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatChunk {
    /// The first choice's content delta, if this chunk carries one.
    pub fn delta_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// A single choice within a streaming chunk.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChunkChoice {
    /// Index of this choice.
    #[serde(default)]
    pub index: i32,

    /// The partial-content delta.
    #[serde(default)]
    pub delta: ChunkDelta,

    /// Present only on the final content chunk.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The delta payload within a streaming choice.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ChunkDelta {
    /// Role, typically only on the first chunk.
    #[serde(default)]
    pub role: Option<String>,

    /// Partial text content.
    #[serde(default)]
    pub content: Option<String>,

    /// Partial tool calls.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// A tool call fragment within a streaming delta.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ToolCallDelta {
    /// Index of this tool call in the tool_calls array.
    #[serde(default)]
    pub index: usize,

    /// Tool call ID, only on the first fragment.
    #[serde(default)]
    pub id: Option<String>,

    /// Function name and argument fragments.
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

/// Function details within a tool call fragment.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FunctionDelta {
    /// Function name, only on the first fragment.
    #[serde(default)]
    pub name: Option<String>,

    /// Partial arguments fragment.
    #[serde(default)]
    pub arguments: Option<String>,
}

// ── Anthropic-compatible surface ────────────────────────────────────────

/// A message request for the Anthropic-compatible surface.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// The model identifier (e.g. "claude-sonnet-4-5").
    pub model: String,

    /// The conversation messages.
    pub messages: Vec<AnthropicMessage>,

    /// Maximum number of tokens to generate (required on this surface).
    pub max_tokens: u32,

    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Whether to stream the response. Set by the streaming operations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Additional options passed through to the wire.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl MessageRequest {
    /// Create a minimal message request.
    pub fn new(model: impl Into<String>, messages: Vec<AnthropicMessage>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens,
            system: None,
            temperature: None,
            stream: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// A message on the Anthropic-compatible surface. Content is either a
/// plain string or an array of content blocks; it is carried as raw JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnthropicMessage {
    /// "user" or "assistant".
    pub role: String,

    /// String or content-block array.
    pub content: Value,
}

impl AnthropicMessage {
    /// Create a user message with plain text content.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: Value::String(content.into()),
        }
    }

    /// Create an assistant message with plain text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: Value::String(content.into()),
        }
    }
}

/// A message response from the Anthropic-compatible surface.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Unique identifier for this message.
    pub id: String,

    /// The model that generated the response.
    pub model: String,

    /// Always "assistant".
    pub role: String,

    /// The generated content blocks.
    pub content: Vec<ContentBlock>,

    /// Why generation stopped ("end_turn", "max_tokens", ...).
    #[serde(default)]
    pub stop_reason: Option<String>,

    /// Token usage statistics.
    #[serde(default)]
    pub usage: Option<AnthropicUsage>,
}

/// One content block in an Anthropic-style response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ContentBlock {
    /// Block type ("text", "tool_use", ...).
    #[serde(rename = "type")]
    pub block_type: String,

    /// Text content, for "text" blocks.
    #[serde(default)]
    pub text: Option<String>,
}

/// Token usage on the Anthropic-compatible surface.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AnthropicUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub input_tokens: u32,

    /// Tokens in the generated output.
    #[serde(default)]
    pub output_tokens: u32,
}

/// One decoded streaming event from the Anthropic-compatible surface.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct MessageStreamEvent {
    /// Event type ("message_start", "content_block_delta", ...).
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Content block index, on block events.
    #[serde(default)]
    pub index: Option<u32>,

    /// The delta payload, on delta events.
    #[serde(default)]
    pub delta: Option<AnthropicDelta>,
}

impl MessageStreamEvent {
    /// The text delta carried by this event, if any.
    pub fn delta_text(&self) -> Option<&str> {
        self.delta
            .as_ref()
            .and_then(|d| d.text.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// The delta payload within an Anthropic streaming event.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AnthropicDelta {
    /// Delta type ("text_delta", ...).
    #[serde(rename = "type", default)]
    pub delta_type: Option<String>,

    /// Partial text content.
    #[serde(default)]
    pub text: Option<String>,
}

// ── Tokenize / reporting ────────────────────────────────────────────────

/// Response of the tokenize endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenizeResponse {
    /// The model whose tokenizer was used.
    pub model: String,

    /// Number of tokens in the submitted text.
    pub token_count: u32,
}

/// Aggregate usage report for the account.
#[derive(Debug, Clone, Deserialize)]
pub struct UsageReport {
    /// Total requests in the reporting window.
    #[serde(default)]
    pub total_requests: u64,

    /// Total tokens consumed in the reporting window.
    #[serde(default)]
    pub total_tokens: u64,

    /// Additional gateway-defined aggregates.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Structured analytics report (per-model, per-day breakdowns).
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsReport {
    /// Breakdown rows as sent by the gateway.
    #[serde(default)]
    pub data: Vec<Value>,

    /// Additional gateway-defined fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
