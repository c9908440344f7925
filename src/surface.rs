//! Provider surface descriptors.
//!
//! The gateway exposes three chat surfaces that differ only in path,
//! authentication style and wire conventions. Rather than three copies of
//! the request path, a [`Surface`] value parameterizes the shared
//! transport, retry and decoding logic.

/// How a request authenticates with the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// `x-api-key: <key>` header. Used by the unified surface and all
    /// auxiliary endpoints (files, batches, tokenize, usage, analytics).
    ApiKey,
    /// `Authorization: Bearer <key>` header. Used by the
    /// OpenAI-compatible surface.
    Bearer,
}

/// The fixed provider-version header sent on the Anthropic surface.
pub const ANTHROPIC_VERSION: (&str, &str) = ("anthropic-version", "2023-06-01");

/// One of the gateway's chat-completion surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The unified surface: one request shape regardless of vendor.
    Unified,
    /// The OpenAI-compatible surface.
    OpenAi,
    /// The Anthropic-compatible surface.
    Anthropic,
}

impl Surface {
    /// Path of the chat/messages endpoint for this surface.
    pub fn chat_path(self) -> &'static str {
        match self {
            Surface::Unified => "/chat/completions",
            Surface::OpenAi => "/openai/chat/completions",
            Surface::Anthropic => "/anthropic/messages",
        }
    }

    /// Path of the batch endpoint for this surface.
    pub fn batches_path(self) -> &'static str {
        match self {
            Surface::Unified => "/batches",
            Surface::OpenAi => "/openai/batches",
            Surface::Anthropic => "/anthropic/batches",
        }
    }

    /// Authentication mode for this surface.
    pub fn auth(self) -> AuthMode {
        match self {
            Surface::Unified | Surface::Anthropic => AuthMode::ApiKey,
            Surface::OpenAi => AuthMode::Bearer,
        }
    }

    /// Extra headers this surface requires on every request.
    pub fn extra_headers(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Surface::Anthropic => &[ANTHROPIC_VERSION],
            _ => &[],
        }
    }

    /// Short name, used in log fields.
    pub fn name(self) -> &'static str {
        match self {
            Surface::Unified => "unified",
            Surface::OpenAi => "openai",
            Surface::Anthropic => "anthropic",
        }
    }
}
