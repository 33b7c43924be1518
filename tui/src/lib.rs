//! Parley TUI - Terminal interface for parley
//!
//! Full-screen multi-conversation chat on top of [`parley_core`]. The core
//! owns conversations; this crate owns what is on screen.
//!
//! # Architecture
//!
//! - **App**: event loop, layout, key routing
//! - **Views**: one scrollable surface per opened conversation
//! - **Navigation**: conversation list and its modal flows
//! - **Bridge**: list actions to orchestrator calls
//! - **Widgets**: ANSI decoding and the scrollable text block

pub mod app;
pub mod bridge;
pub mod events;
pub mod input;
pub mod navigation;
pub mod theme;
pub mod views;
pub mod widgets;

pub use app::{build_orchestrator, App, Focus};
pub use bridge::SessionBridge;
pub use events::UiEvent;
pub use navigation::{HistoryHandler, HistoryPanel, NavState};
pub use views::{Surface, SurfaceWriter, ViewManager};
