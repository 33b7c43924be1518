//! Parley Core - Headless Conversation Session Engine
//!
//! This crate holds everything about conversations that does not depend on a
//! terminal: the data model, persistence, message rendering, assistant
//! backends and the session orchestrator that ties them together. The TUI
//! crate drives it; tests drive it headlessly.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Interface (parley-tui)                     │
//! │   View Manager      Navigation State Machine      Input box    │
//! └───────────────┬───────────────────────────────▲───────────────┘
//!                 │ create / list / get /          │ rendered bytes
//!                 │ rename / delete / talk         │ (io::Write sink)
//! ┌───────────────▼───────────────────────────────┴───────────────┐
//! │                      SessionOrchestrator                        │
//! │   ┌──────────────────┐  ┌──────────────┐  ┌─────────────────┐  │
//! │   │ ConversationStore│  │   Renderer   │  │    Assistant    │  │
//! │   │ (SQLite / memory)│  │  (syntect)   │  │ (Ollama/Gemini) │  │
//! │   └──────────────────┘  └──────────────┘  └─────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SessionOrchestrator`]: conversation CRUD and the talk operation
//! - [`Conversation`] / [`Message`]: the persisted records
//! - [`ConversationStore`]: durable whole-record storage
//! - [`Renderer`]: message to ANSI bytes
//! - [`Assistant`]: the conversational backend
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use parley_core::{
//!     backend::MockAssistant, render::PlainRenderer, store::MemoryStore,
//!     SessionOrchestrator,
//! };
//!
//! let orchestrator = SessionOrchestrator::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(PlainRenderer),
//!     Arc::new(MockAssistant::new().with_reply("4")),
//! );
//!
//! let conversation = orchestrator.create_conversation()?;
//! let mut sink: Vec<u8> = Vec::new();
//! orchestrator.talk(conversation.id, &mut sink, "2+2?").await?;
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod orchestrator;
pub mod render;
pub mod store;

pub use backend::{build_assistant, Assistant, BackendKind};
pub use config::{Config, ConfigError, ConfigOverrides, ConfigSource};
pub use error::{SessionError, SessionResult, StoreError};
pub use messages::{ContentType, Conversation, ConversationId, Message, Role, DEFAULT_TITLE};
pub use orchestrator::{SessionOrchestrator, TalkReservation};
pub use render::{HighlightRenderer, PlainRenderer, Renderer};
pub use store::{ConversationStore, MemoryStore, SqliteStore};
