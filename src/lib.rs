//! Client library for the OmniLLM gateway.
//!
//! The gateway fronts multiple LLM vendors behind one API. This crate
//! covers all of it: blocking and streaming chat on the unified,
//! OpenAI-compatible and Anthropic-compatible surfaces, files, batches,
//! tokenization, usage and analytics reporting, and static cost
//! estimation. Every request runs through the same retry controller and
//! error classifier, so callers see one error taxonomy regardless of
//! surface.
//!
//! # Architecture
//!
//! - [`Client`] is the facade: every operation is a method on it
//! - [`ClientConfig`] holds the key, base URL, timeout and retry policy
//! - [`ClientError`] is the classified error taxonomy; its
//!   [`ErrorKind`] drives the retry decision
//! - [`Surface`] selects which chat surface a call targets
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use omnillm::{Client, ChatMessage, ChatRequest};
//!
//! let client = Client::from_env()?;
//!
//! // One-shot convenience:
//! let answer = client.complete("What is Rust?").await?;
//!
//! // Full request control:
//! let request = ChatRequest::new("omni-large", vec![
//!     ChatMessage::system("You are a helpful assistant."),
//!     ChatMessage::user("What is Rust?"),
//! ]);
//! let response = client.chat_completion(&request).await?;
//! println!("{}", response.first_text().unwrap_or_default());
//! ```
//!
//! # Streaming
//!
//! ```rust,ignore
//! use futures_util::StreamExt;
//!
//! let mut deltas = client.complete_stream("Tell me a story.").await?;
//! while let Some(delta) = deltas.next().await {
//!     print!("{}", delta?);
//! }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod pricing;
pub mod retry;
pub mod sse;
pub mod surface;
pub mod types;

mod normalize;
mod transport;

pub use batch::{BatchList, BatchObject, BatchRequestCounts, CreateBatchRequest};
pub use client::{Client, ChatStream, MessageStream, TextStream, DEFAULT_MODEL};
pub use config::{ClientConfig, API_KEY_ENV, DEFAULT_BASE_URL};
pub use error::{ClientError, ErrorKind, Result};
pub use files::{DeletedFile, FileList, FileObject, FileUpload};
pub use pricing::{CostEstimate, ModelPricing};
pub use retry::RetryConfig;
pub use sse::SseDecoder;
pub use surface::{AuthMode, Surface};
pub use types::{
    AnalyticsReport, AnthropicMessage, ChatChunk, ChatMessage, ChatRequest, ChatResponse,
    MessageRequest, MessageResponse, MessageStreamEvent, TokenizeResponse, ToolCall, Usage,
    UsageReport,
};
