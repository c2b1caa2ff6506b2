//! Completion driver: one transcript snapshot in, one streamed reply out.

use crate::ai::{CompletionBackend, CompletionRequest, FragmentStream};
use crate::config::GenerationConfig;
use crate::error::CompletionError;
use crate::types::Turn;
use futures::StreamExt;
use std::rc::Rc;

/// Lifecycle of a single driver invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

impl DriverState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DriverState::Completed | DriverState::Failed)
    }
}

#[derive(Clone)]
pub struct CompletionDriver {
    backend: Rc<dyn CompletionBackend>,
}

impl CompletionDriver {
    pub fn new(backend: impl CompletionBackend + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
        }
    }

    /// Shares a backend the caller keeps a handle to (tests inspect the
    /// scripted backend after the fact).
    pub fn with_shared(backend: Rc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Prepares a reply without touching the network. Nothing is sent until
    /// the first call to [`StreamedReply::next_partial`].
    pub fn begin(&self, transcript: &[Turn], config: &GenerationConfig) -> StreamedReply {
        StreamedReply {
            backend: Rc::clone(&self.backend),
            request: CompletionRequest::new(transcript.to_vec(), config),
            fragments: None,
            text: String::new(),
            state: DriverState::Idle,
        }
    }

    /// Runs a reply to its end, calling `on_partial` with the accumulated
    /// text after every fragment.
    pub async fn run(
        &self,
        transcript: &[Turn],
        config: &GenerationConfig,
        mut on_partial: impl FnMut(&str),
    ) -> Result<String, CompletionError> {
        let mut reply = self.begin(transcript, config);
        while let Some(update) = reply.next_partial().await {
            on_partial(update?);
        }
        Ok(reply.into_text())
    }
}

/// Accumulator for one in-flight completion.
pub struct StreamedReply {
    backend: Rc<dyn CompletionBackend>,
    request: CompletionRequest,
    fragments: Option<FragmentStream>,
    text: String,
    state: DriverState,
}

impl StreamedReply {
    /// Advances the reply by one fragment and returns the text accumulated so
    /// far. `None` once the stream has ended; an `Err` is yielded exactly once
    /// and moves the reply to [`DriverState::Failed`].
    pub async fn next_partial(&mut self) -> Option<Result<&str, CompletionError>> {
        loop {
            match self.state {
                DriverState::Idle => {
                    self.transition(DriverState::Requesting);
                    match self.backend.open_stream(&self.request).await {
                        Ok(fragments) => {
                            self.fragments = Some(fragments);
                            self.transition(DriverState::Streaming);
                        }
                        Err(err) => return Some(Err(self.fail(err))),
                    }
                }
                DriverState::Streaming => {
                    let next = match self.fragments.as_mut() {
                        Some(fragments) => fragments.next().await,
                        None => None,
                    };
                    match next {
                        Some(Ok(piece)) if piece.is_empty() => {}
                        Some(Ok(piece)) => {
                            self.text.push_str(&piece);
                            return Some(Ok(&self.text));
                        }
                        Some(Err(err)) => return Some(Err(self.fail(err))),
                        None => {
                            self.fragments = None;
                            self.transition(DriverState::Completed);
                            tracing::info!(
                                model = %self.request.model,
                                chars = self.text.chars().count(),
                                "completion finished"
                            );
                            return None;
                        }
                    }
                }
                DriverState::Requesting | DriverState::Completed | DriverState::Failed => {
                    return None;
                }
            }
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn transition(&mut self, next: DriverState) {
        tracing::debug!(from = ?self.state, to = ?next, "completion state");
        self.state = next;
    }

    fn fail(&mut self, err: CompletionError) -> CompletionError {
        self.fragments = None;
        self.transition(DriverState::Failed);
        tracing::warn!(error = %err, received = self.text.len(), "completion failed");
        err
    }
}
