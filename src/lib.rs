//! Streaming chat client for Groq's hosted models.
//!
//! The core (transcript, completion driver, chat session) has no UI
//! dependency; the Dioxus front end in `ui` and `views` is compiled when the
//! `dioxus` feature is on (the default `web` and `desktop` features enable it).

pub mod ai;
pub mod config;
pub mod driver;
pub mod error;
pub mod session;
pub mod transcript;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;

pub use ai::{CompletionBackend, CompletionRequest, GroqBackend, ScriptedBackend, ScriptedReply};
pub use config::{AppConfig, Credential, GenerationConfig, ModelId};
pub use driver::{CompletionDriver, DriverState, StreamedReply};
pub use error::{ChatError, CompletionError, ConfigError, FALLBACK_REPLY};
pub use session::{
    ChatSession, PendingTurn, RenderUpdate, ResolvedTurn, TurnOutcome, TurnResolution,
};
pub use transcript::Transcript;
pub use types::{Role, Turn};
