//! Ollama Assistant
//!
//! Assistant backed by a local Ollama server.
//!
//! # Ollama API
//!
//! - `/api/chat` - Chat completions with message history
//! - `/api/tags` - List available models (used for health checks)
//!
//! Requests are sent non-streaming: one request, one reply. The session table
//! holds each conversation's chat transcript, seeded from stored history the
//! first time the conversation talks in this process.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::traits::{Assistant, SessionTable};
use crate::messages::{ConversationId, Message, Role};

/// Default Ollama host
pub const DEFAULT_HOST: &str = "localhost";
/// Default Ollama port
pub const DEFAULT_PORT: u16 = 11434;
/// Default chat model
pub const DEFAULT_MODEL: &str = "llama3.2";

/// One entry of an Ollama chat transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatTurn {
    fn from_message(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant(_) => "assistant",
        };
        Self {
            role: role.to_string(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatTurn>,
    error: Option<String>,
}

/// Ollama chat client
pub struct OllamaAssistant {
    host: String,
    port: u16,
    model: String,
    http_client: reqwest::Client,
    sessions: SessionTable<Vec<ChatTurn>>,
}

impl OllamaAssistant {
    /// Create a client for `model` on `host:port`
    pub fn new(host: impl Into<String>, port: u16, model: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            host: host.into(),
            port,
            model: model.into(),
            http_client,
            sessions: SessionTable::new(),
        }
    }

    /// Model used for replies
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url())
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url())
    }

    fn request_body(&self, transcript: &[ChatTurn]) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": transcript,
            "stream": false,
        })
    }

    async fn chat(&self, transcript: &[ChatTurn]) -> anyhow::Result<String> {
        let response = self
            .http_client
            .post(self.chat_url())
            .json(&self.request_body(transcript))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {status}: {body}");
        }

        let data: ChatResponse = response.json().await?;
        if let Some(error) = data.error {
            anyhow::bail!("Ollama error: {error}");
        }
        Ok(data.message.map(|m| m.content).unwrap_or_default())
    }
}

impl Default for OllamaAssistant {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, DEFAULT_MODEL)
    }
}

#[async_trait]
impl Assistant for OllamaAssistant {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn talk(&self, id: ConversationId, history: &[Message], message: &Message) -> Message {
        let mut transcript = self.sessions.get_or_insert_with(id, || {
            history.iter().map(ChatTurn::from_message).collect()
        });
        let user_turn = ChatTurn::from_message(message);
        transcript.push(user_turn.clone());

        tracing::debug!(
            conversation = %id,
            model = %self.model,
            turns = transcript.len(),
            "Sending chat request"
        );

        match self.chat(&transcript).await {
            Ok(content) => {
                let reply = ChatTurn {
                    role: "assistant".to_string(),
                    content: content.clone(),
                };
                self.sessions.update(&id, |t| {
                    t.push(user_turn);
                    t.push(reply);
                });
                Message::assistant(id, self.name(), content)
            }
            Err(e) => {
                tracing::warn!(conversation = %id, error = %e, "Chat request failed");
                Message::failed(id, self.name(), format!("ollama: {e}"))
            }
        }
    }

    fn forget(&self, id: &ConversationId) {
        self.sessions.evict(id);
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(self.tags_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }
}
