use super::sse::{ApiError, ChunkEvent, SseDecoder, parse_chunk_data};
use super::{CompletionBackend, CompletionRequest, FragmentStream};
use crate::config::DEFAULT_BASE_URL;
use crate::error::CompletionError;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

/// Streams chat completions from Groq's OpenAI-compatible API.
pub struct GroqBackend {
    client: Client,
    base_url: String,
}

impl GroqBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for GroqBackend {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ApiError,
}

/// Prefers the `error.message` of an OpenAI-style error body, falling back to
/// the raw text.
fn remote_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait(?Send)]
impl CompletionBackend for GroqBackend {
    async fn open_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<FragmentStream, CompletionError> {
        tracing::debug!(
            endpoint = %self.endpoint(),
            model = %request.model,
            turns = request.messages.len(),
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(ACCEPT, "text/event-stream")
            .bearer_auth(request.credential.expose())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::new(format!(
                "Groq error {status}: {}",
                remote_error_message(&body)
            )));
        }

        Ok(fragment_stream(response))
    }
}

fn fragment_stream(response: reqwest::Response) -> FragmentStream {
    let mut body = response.bytes_stream();
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::default();
        let mut exhausted = false;
        while !exhausted {
            let events = match body.next().await {
                Some(Ok(bytes)) => decoder.push(&bytes),
                Some(Err(err)) => {
                    yield Err(CompletionError::from(err));
                    return;
                }
                None => {
                    exhausted = true;
                    decoder.finish()
                }
            };

            for data in events {
                match parse_chunk_data(&data) {
                    Ok(ChunkEvent::Fragment(piece)) => yield Ok(piece),
                    Ok(ChunkEvent::Empty) => {}
                    Ok(ChunkEvent::Done) => return,
                    Err(err) => {
                        yield Err(err);
                        return;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(
            GroqBackend::default().endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            GroqBackend::new("http://127.0.0.1:8080/v1/").endpoint(),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
    }

    #[test]
    fn extracts_remote_error_message() {
        assert_eq!(
            remote_error_message(
                r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#
            ),
            "Invalid API Key"
        );
        assert_eq!(remote_error_message("bad gateway\n"), "bad gateway");
    }
}
