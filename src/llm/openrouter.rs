//! OpenAI-compatible chat-completions client (OpenRouter by default)

use crate::config::SummarizerConfig;
use crate::llm::{LlmError, Summarizer};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROMPT_PREFIX: &str = "Please summarize the following text in 2-3 sentences:\n\n";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenRouterSummarizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    prompt_chars: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl OpenRouterSummarizer {
    pub fn new(
        config: &SummarizerConfig,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model,
            max_tokens: config.max_tokens,
            prompt_chars: config.prompt_chars,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the user prompt from the first `prompt-chars` characters of text
    pub fn build_prompt(&self, text: &str) -> String {
        let prefix: String = text.chars().take(self.prompt_chars).collect();
        format!("{}{}", PROMPT_PREFIX, prefix)
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key.trim()))
                .map_err(|_| LlmError::InvalidApiKey)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Summarizer for OpenRouterSummarizer {
    async fn summarize(&self, text: &str) -> Result<Option<String>, LlmError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let prompt = self.build_prompt(text);
        let body = ChatRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        Ok(summary)
    }
}
