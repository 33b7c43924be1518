//! Gemini Assistant
//!
//! Assistant backed by the Google Generative Language REST API
//! (`models/{model}:generateContent`). The session table keeps each
//! conversation's `contents` array so follow-up turns carry the chat so far.
//!
//! A blocked prompt is not an HTTP error: the API answers 200 with
//! `promptFeedback.blockReason` and no candidates. Those are turned into the
//! reply's error text, listing the safety ratings that triggered the block.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{Assistant, SessionTable};
use crate::messages::{ConversationId, Message, Role};

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn from_message(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant(_) => "model",
        };
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: message.content.clone(),
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SafetyRating {
    category: String,
    probability: String,
    #[serde(default)]
    blocked: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

/// Extract the reply text, or the error text for a blocked/empty response
fn reply_text(response: GenerateResponse) -> Result<String, String> {
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            if reason == "SAFETY" && !feedback.safety_ratings.is_empty() {
                let ratings: Vec<String> = feedback
                    .safety_ratings
                    .iter()
                    .map(|r| format!("{}: {}, block: {}", r.category, r.probability, r.blocked))
                    .collect();
                return Err(ratings.join("; "));
            }
            return Err(format!("block: {reason}"));
        }
    }

    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .ok_or_else(|| "gemini: response had no candidates".to_string())?;

    Ok(content.parts.into_iter().map(|p| p.text).collect())
}

/// Gemini REST client
pub struct GeminiAssistant {
    api_key: String,
    model: String,
    http_client: reqwest::Client,
    sessions: SessionTable<Vec<Content>>,
}

impl GeminiAssistant {
    /// Create a client for `model` using `api_key`
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            api_key: api_key.into(),
            model: model.into(),
            http_client,
            sessions: SessionTable::new(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{API_BASE}/models/{}:generateContent", self.model)
    }

    async fn generate(&self, contents: &[Content]) -> anyhow::Result<GenerateResponse> {
        let response = self
            .http_client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&serde_json::json!({ "contents": contents }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini returned {status}: {body}");
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn talk(&self, id: ConversationId, history: &[Message], message: &Message) -> Message {
        let mut contents = self.sessions.get_or_insert_with(id, || {
            history.iter().map(Content::from_message).collect()
        });
        let user_turn = Content::from_message(message);
        contents.push(user_turn.clone());

        tracing::debug!(conversation = %id, model = %self.model, "Sending generateContent");

        let response = match self.generate(&contents).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(conversation = %id, error = %e, "Gemini request failed");
                return Message::failed(id, self.name(), format!("gemini: {e}"));
            }
        };

        match reply_text(response) {
            Ok(text) => {
                let reply = Content {
                    role: "model".to_string(),
                    parts: vec![Part { text: text.clone() }],
                };
                self.sessions.update(&id, |c| {
                    c.push(user_turn);
                    c.push(reply);
                });
                Message::assistant(id, self.name(), text)
            }
            Err(reason) => {
                tracing::warn!(conversation = %id, reason = %reason, "Gemini refused prompt");
                Message::failed(id, self.name(), reason)
            }
        }
    }

    fn forget(&self, id: &ConversationId) {
        self.sessions.evict(id);
    }
}
