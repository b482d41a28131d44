//! Chat-completion access and reply rendering.

pub mod client;
pub mod render;

pub use client::ChatClient;
pub use render::{escape_html, markdown_to_html, strip_code_fences};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ModeProfile;
use crate::error::Result;

/// One message of a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single completion request with its latency/size budget.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>, profile: &ModeProfile) -> Self {
        Self {
            messages,
            temperature: profile.temperature,
            max_tokens: profile.max_tokens,
            timeout: profile.timeout(),
        }
    }
}

/// Anything that can turn a chat request into reply text.
///
/// Implementations make exactly one attempt; callers own the fallback.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}
