use async_trait::async_trait;
use eyre::{Result, bail};
use log::debug;
use serde::Serialize;

use crate::context::{ChatProvider, ChatSession};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Part {
    text: String,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: "user",
            parts: vec![Part { text: text.to_string() }],
        }
    }

    fn model(text: &str) -> Self {
        Self {
            role: "model",
            parts: vec![Part { text: text.to_string() }],
        }
    }
}

/// Opens chat sessions against the Gemini `generateContent` API
pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: API_BASE.to_string(),
        }
    }

    fn open(&self, api_key: &str, model: &str) -> Result<GeminiChat> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            bail!("API key is empty");
        }
        if model.trim().is_empty() {
            bail!("model name is empty");
        }

        debug!("Opening Gemini chat with model {model}");
        Ok(GeminiChat {
            client: self.client.clone(),
            endpoint: format!("{}/models/{model}:generateContent", self.base_url),
            api_key: api_key.to_string(),
            history: Vec::new(),
        })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn create_session(&self, api_key: &str, model: &str) -> Result<Box<dyn ChatSession>> {
        Ok(Box::new(self.open(api_key, model)?))
    }
}

/// A stateful Gemini conversation. The whole history is sent on every turn,
/// so callers only ever pass the new message.
pub struct GeminiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    history: Vec<Content>,
}

impl GeminiChat {
    async fn generate(&self) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body(&self.history))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {}", extract_error_message(&body));
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json)
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send(&mut self, text: &str) -> Result<String> {
        self.history.push(Content::user(text));
        debug!("Sending turn {} to {}", self.history.len(), self.endpoint);

        match self.generate().await {
            Ok(reply) => {
                self.history.push(Content::model(&reply));
                Ok(reply)
            }
            Err(e) => {
                // Keep user/model turns alternating
                self.history.pop();
                Err(e)
            }
        }
    }
}

fn request_body(history: &[Content]) -> serde_json::Value {
    serde_json::json!({ "contents": history })
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    let text: String = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text")?.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        bail!("prompt blocked by Gemini: {reason}");
    }
    bail!("unexpected Gemini API response format");
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("error")?.get("message")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}
