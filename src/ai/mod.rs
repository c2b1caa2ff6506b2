/// Remote completion backends.
///
/// A backend turns one [`CompletionRequest`] into a one-shot stream of text
/// fragments. The driver only talks to the [`CompletionBackend`] trait, so
/// tests can swap the Groq HTTP client for a [`ScriptedBackend`].
///
/// # Architecture
///
/// - `groq` - OpenAI-compatible chat completions over HTTP, parsed as SSE
/// - `sse` - incremental Server-Sent Events decoder and chunk parser
/// - `scripted` - canned replies for deterministic tests
mod groq;
mod scripted;
mod sse;

use crate::config::{Credential, GenerationConfig, ModelId};
use crate::error::CompletionError;
use crate::types::Turn;
use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;

pub use groq::GroqBackend;
pub use scripted::{ScriptedBackend, ScriptedReply};
pub use sse::{ChunkEvent, SseDecoder, parse_chunk_data};

/// Finite, non-restartable sequence of reply fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>>>>;

/// Body of a streamed chat completions call. The credential travels in the
/// `Authorization` header, never in the body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: ModelId,
    pub messages: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
    #[serde(skip)]
    pub credential: Credential,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Turn>, config: &GenerationConfig) -> Self {
        Self {
            model: config.model,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            stream: true,
            credential: config.credential.clone(),
        }
    }
}

#[async_trait(?Send)]
pub trait CompletionBackend {
    /// Sends the request and hands back the reply stream once the remote has
    /// accepted it. Rejections (bad key, unknown model, transport errors)
    /// surface here rather than as the first stream item.
    async fn open_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream, CompletionError>;
}
