//! Language-model menu parser
//!
//! Turns the cached page HTML into structured items for one weekday using
//! any OpenAI-compatible chat-completions endpoint.

use lunchmenu_model::{MenuItem, Weekday};
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You extract lunch menus from restaurant web pages. \
Answer with a JSON object of the form \
{\"items\": [{\"name\": string, \"description\": string or null, \"price\": string or null, \"diets\": [string]}]}. \
Only include dishes served on the requested weekday. Keep dish names and descriptions in the \
language of the page. Copy prices exactly as written. Put dietary markers such as L, G, M or VEG \
into `diets`. If the page has no menu for that day, answer {\"items\": []}.";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Model response contained no content")]
    EmptyResponse,

    #[error("Model returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model returned JSON without an item list")]
    MissingItems,
}

/// Converts menu HTML into the items served on one weekday
#[async_trait::async_trait]
pub trait MenuParser: Send + Sync {
    async fn parse(&self, html: &str, weekday: Weekday) -> Result<Vec<MenuItem>, ParseError>;
}

/// Chat-completions backed parser
pub struct OpenAiMenuParser {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiMenuParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiMenuParser")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAiMenuParser {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let client = Client::builder().timeout(Duration::from_secs(120)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemsPayload {
    Wrapped { items: Vec<MenuItem> },
    Bare(Vec<MenuItem>),
}

#[async_trait::async_trait]
impl MenuParser for OpenAiMenuParser {
    async fn parse(&self, html: &str, weekday: Weekday) -> Result<Vec<MenuItem>, ParseError> {
        info!("🤖 Parsing {} menu with {}", weekday, self.model);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Weekday: {}\n\nPage HTML:\n{}", weekday, html),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(self.chat_completions_url())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParseError::Status { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ParseError::EmptyResponse)?;

        let items = parse_items(&content)?;
        debug!("Model returned {} items for {}", items.len(), weekday);
        Ok(items)
    }
}

/// Decode the model's answer: `{"items": [...]}` or a bare array,
/// optionally wrapped in a Markdown code fence
fn parse_items(content: &str) -> Result<Vec<MenuItem>, ParseError> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fence(content))?;
    if !(value.is_array() || value.get("items").is_some()) {
        return Err(ParseError::MissingItems);
    }

    match serde_json::from_value(value)? {
        ItemsPayload::Wrapped { items } | ItemsPayload::Bare(items) => Ok(items),
    }
}

/// Models sometimes wrap the JSON in a markdown fence. The language tag
/// may be in any case and the closing fence may be missing.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
