use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{ChatMessage, ChatModel, ChatRequest};
use crate::error::{KgError, Result};

/// Request structure for OpenAI-compatible chat completion APIs
#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Response structure from the chat completion API
#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| KgError::Llm("Empty completion in response".to_string()))
    }
}

/// Chat completion client (DeepSeek / OpenAI wire format)
///
/// Single attempt per call; the timeout comes from each request.
pub struct ChatClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Arguments
    ///
    /// * `api_url` - Full chat completions endpoint URL
    /// * `api_key` - Bearer token
    /// * `model` - Model name (e.g., "deepseek-chat")
    pub fn new(api_url: String, api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| KgError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ChatModel for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let start = Instant::now();
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KgError::Llm(format!("Request timed out after {:?}", request.timeout))
                } else {
                    KgError::Llm(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(KgError::Llm(format!("Chat API error {}: {}", status, body)));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| KgError::Llm(format!("Failed to parse response: {}", e)))?;

        log::debug!("Chat completion took {:?}", start.elapsed());
        result.into_content()
    }
}
