//! Assistant Backends
//!
//! Conversational providers behind the [`Assistant`] trait.
//!
//! # Available Backends
//!
//! - **Ollama**: Local LLM server (default)
//! - **Gemini**: Google Generative Language API
//! - **Mock**: Scripted offline replies for tests and demos
//!
//! # Usage
//!
//! ```ignore
//! use parley_core::backend::{Assistant, OllamaAssistant};
//!
//! let assistant = OllamaAssistant::new("localhost", 11434, "llama3.2");
//! let reply = assistant.talk(id, &history, &message).await;
//! ```

mod gemini;
mod mock;
mod ollama;
mod traits;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use gemini::GeminiAssistant;
pub use mock::MockAssistant;
pub use ollama::{ChatTurn, OllamaAssistant};
pub use traits::{Assistant, SessionTable};

use crate::config::{Config, ConfigError};

/// Which assistant backend to construct
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Google Gemini REST API
    Gemini,
    /// Offline scripted replies
    Mock,
}

impl BackendKind {
    /// Model used when none is configured
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => ollama::DEFAULT_MODEL,
            Self::Gemini => gemini::DEFAULT_MODEL,
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            other => Err(format!(
                "unknown backend '{other}' (expected ollama, gemini or mock)"
            )),
        }
    }
}

/// Construct the configured assistant
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] when the Gemini backend is selected
/// without an API key.
pub fn build_assistant(config: &Config) -> Result<Arc<dyn Assistant>, ConfigError> {
    let model = config.model().to_string();
    tracing::info!(backend = %config.backend, model = %model, "Building assistant");

    let assistant: Arc<dyn Assistant> = match config.backend {
        BackendKind::Ollama => Arc::new(OllamaAssistant::new(
            config.ollama_host.clone(),
            config.ollama_port,
            model,
        )),
        BackendKind::Gemini => {
            let key = config.gemini_api_key.clone().ok_or_else(|| {
                ConfigError::ValidationError(
                    "gemini backend requires GEMINI_API_KEY or [backend] gemini_api_key".into(),
                )
            })?;
            Arc::new(GeminiAssistant::new(key, model))
        }
        BackendKind::Mock => Arc::new(MockAssistant::new()),
    };
    Ok(assistant)
}
