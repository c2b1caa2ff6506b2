use super::{CompletionBackend, CompletionRequest, FragmentStream};
use crate::error::CompletionError;
use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// One canned response for [`ScriptedBackend`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedReply {
    /// Stream these fragments, then end normally.
    Fragments(Vec<String>),
    /// Stream these fragments, then fail with `message`.
    FailAfter {
        fragments: Vec<String>,
        message: String,
    },
    /// Refuse the request before any stream is handed out.
    Reject(String),
}

impl ScriptedReply {
    pub fn fragments<I, S>(pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedReply::Fragments(pieces.into_iter().map(Into::into).collect())
    }
}

/// Deterministic backend that replays scripted replies in order and records
/// every request it was given.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait(?Send)]
impl CompletionBackend for ScriptedBackend {
    async fn open_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream, CompletionError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(ScriptedReply::Fragments(fragments)) => {
                Ok(Box::pin(stream::iter(fragments.into_iter().map(Ok))))
            }
            Some(ScriptedReply::FailAfter { fragments, message }) => {
                let items = fragments
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(CompletionError::new(message))));
                Ok(Box::pin(stream::iter(items)))
            }
            Some(ScriptedReply::Reject(message)) => Err(CompletionError::new(message)),
            None => Err(CompletionError::new("no scripted reply left")),
        }
    }
}
