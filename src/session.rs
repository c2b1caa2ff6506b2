//! Caller-side chat flow around the transcript and the completion driver.
//!
//! A turn is split in three so the UI can keep the session in reactive state
//! and release it while the reply streams:
//!
//! 1. [`ChatSession::begin_turn`] validates settings and records the user turn
//! 2. [`PendingTurn::resolve`] streams the reply with no borrow on the session
//! 3. [`ChatSession::finish_turn`] records the assistant turn, substituting
//!    [`FALLBACK_REPLY`] when the completion failed
//!
//! A reply that resolves after the history was cleared is dropped, so the
//! fresh transcript never starts with an orphaned assistant turn.
//!
//! [`ChatSession::submit`] runs all three for callers that own the session
//! outright.

use crate::config::GenerationConfig;
use crate::driver::CompletionDriver;
use crate::error::{ChatError, ChatResult, CompletionError, FALLBACK_REPLY};
use crate::transcript::Transcript;
use crate::types::Turn;

/// Appended to partial replies while the stream is still running.
pub const CURSOR: &str = "▌";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderUpdate<'a> {
    Partial(&'a str),
    Final(&'a str),
}

impl RenderUpdate<'_> {
    pub fn text(&self) -> &str {
        match self {
            RenderUpdate::Partial(text) | RenderUpdate::Final(text) => *text,
        }
    }

    /// What the rendering surface should show for this update.
    pub fn display_text(&self) -> String {
        match self {
            RenderUpdate::Partial(text) => format!("{text}{CURSOR}"),
            RenderUpdate::Final(text) => text.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnResolution {
    Completed(String),
    Failed(CompletionError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    /// The assistant turn that was recorded.
    pub reply: Turn,
    /// Set when the reply is the fallback text.
    pub error: Option<CompletionError>,
}

/// A resolution tagged with the history it was started from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTurn {
    epoch: u64,
    pub resolution: TurnResolution,
}

/// A user turn that has been recorded and is waiting for its reply.
#[derive(Clone, Debug)]
pub struct PendingTurn {
    epoch: u64,
    snapshot: Vec<Turn>,
    config: GenerationConfig,
}

impl PendingTurn {
    /// Transcript as it will be sent, ending with the new user turn.
    pub fn snapshot(&self) -> &[Turn] {
        &self.snapshot
    }

    pub async fn resolve(
        self,
        driver: &CompletionDriver,
        mut on_render: impl FnMut(RenderUpdate<'_>),
    ) -> ResolvedTurn {
        let mut reply = driver.begin(&self.snapshot, &self.config);
        while let Some(update) = reply.next_partial().await {
            match update {
                Ok(text) => on_render(RenderUpdate::Partial(text)),
                Err(err) => {
                    return ResolvedTurn {
                        epoch: self.epoch,
                        resolution: TurnResolution::Failed(err),
                    };
                }
            }
        }
        let text = reply.into_text();
        on_render(RenderUpdate::Final(&text));
        ResolvedTurn {
            epoch: self.epoch,
            resolution: TurnResolution::Completed(text),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatSession {
    transcript: Transcript,
    /// Bumped on every clear.
    epoch: u64,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Records the user turn as typed. Fails without touching the transcript
    /// when the prompt is blank or the settings are unusable.
    pub fn begin_turn(
        &mut self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> ChatResult<PendingTurn> {
        if prompt.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "turn rejected before request");
            return Err(err);
        }

        self.transcript.append(Turn::user(prompt));
        tracing::debug!(turns = self.transcript.len(), "user turn recorded");
        Ok(PendingTurn {
            epoch: self.epoch,
            snapshot: self.transcript.snapshot().to_vec(),
            config: config.clone(),
        })
    }

    /// Records the reply. Returns `None` and records nothing when the history
    /// was cleared while the reply was in flight.
    pub fn finish_turn(&mut self, resolved: ResolvedTurn) -> Option<TurnOutcome> {
        if resolved.epoch != self.epoch {
            tracing::info!("dropping reply to a cleared conversation");
            return None;
        }
        Some(self.record(resolved.resolution))
    }

    fn record(&mut self, resolution: TurnResolution) -> TurnOutcome {
        let (reply, error) = match resolution {
            TurnResolution::Completed(text) => (Turn::assistant(text), None),
            TurnResolution::Failed(err) => (Turn::assistant(FALLBACK_REPLY), Some(err)),
        };
        self.transcript.append(reply.clone());
        TurnOutcome { reply, error }
    }

    pub async fn submit(
        &mut self,
        driver: &CompletionDriver,
        prompt: &str,
        config: &GenerationConfig,
        on_render: impl FnMut(RenderUpdate<'_>),
    ) -> ChatResult<TurnOutcome> {
        let pending = self.begin_turn(prompt, config)?;
        let resolved = pending.resolve(driver, on_render).await;
        // The exclusive borrow rules out a clear in between.
        Ok(self.record(resolved.resolution))
    }

    pub fn clear(&mut self) {
        tracing::info!(turns = self.transcript.len(), "clearing chat history");
        self.transcript.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_marks_partials() {
        assert_eq!(RenderUpdate::Partial("Hi").display_text(), "Hi▌");
        assert_eq!(RenderUpdate::Final("Hi").display_text(), "Hi");
        assert_eq!(RenderUpdate::Partial("Hi").text(), "Hi");
    }

    #[test]
    fn blank_prompt_is_ignored() {
        let mut session = ChatSession::new();
        let config = GenerationConfig::default();
        assert_eq!(
            session.begin_turn("   ", &config).unwrap_err(),
            ChatError::EmptyPrompt
        );
        assert!(session.transcript().is_empty());
    }

    fn resolved(session: &ChatSession, resolution: TurnResolution) -> ResolvedTurn {
        ResolvedTurn {
            epoch: session.epoch,
            resolution,
        }
    }

    #[test]
    fn failed_resolution_records_fallback() {
        let mut session = ChatSession::new();
        let failed = resolved(&session, TurnResolution::Failed(CompletionError::new("boom")));
        let outcome = session.finish_turn(failed).unwrap();
        assert_eq!(outcome.reply, Turn::assistant(FALLBACK_REPLY));
        assert_eq!(outcome.error, Some(CompletionError::new("boom")));
        assert_eq!(session.transcript().snapshot(), [Turn::assistant(FALLBACK_REPLY)]);
    }

    #[test]
    fn prompt_is_recorded_as_typed() {
        let mut session = ChatSession::new();
        let config = GenerationConfig {
            credential: crate::config::Credential::new("valid"),
            ..GenerationConfig::default()
        };
        let pending = session.begin_turn("  two  spaces \n", &config).unwrap();
        assert_eq!(pending.snapshot(), [Turn::user("  two  spaces \n")]);
    }

    #[test]
    fn stale_resolution_is_dropped_after_clear() {
        let mut session = ChatSession::new();
        let stale = resolved(&session, TurnResolution::Completed("late".into()));
        session.clear();

        assert_eq!(session.finish_turn(stale), None);
        assert!(session.transcript().is_empty());
    }
}
