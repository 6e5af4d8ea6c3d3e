//! Scripted backend for tests and dry runs
//!
//! Plays back a queue of canned replies and records every request it saw.
//! This is the deterministic stand-in used by `--dry-run` and by the
//! scenario tests; it performs no I/O.

use crate::error::LlmError;
use crate::types::{Completion, CompletionRequest, LlmClient};
use async_trait::async_trait;
use std::sync::Mutex;

/// One scripted reply: either canned content or an error to raise.
enum Reply {
    Content(String),
    Error(LlmError),
}

/// Deterministic [`LlmClient`] playing back queued replies in order.
///
/// When the queue runs dry the client fails with
/// [`LlmError::EmptyResponse`] rather than looping, so a test that
/// under-provisions replies fails loudly.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<std::collections::VecDeque<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply to serve for the next unanswered request.
    pub fn push_reply(&self, content: impl Into<String>) {
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .push_back(Reply::Content(content.into()));
    }

    /// Queue an error to raise for the next unanswered request.
    pub fn push_error(&self, error: LlmError) {
        self.replies
            .lock()
            .expect("scripted replies poisoned")
            .push_back(Reply::Error(error));
    }

    /// Number of completion calls served so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("scripted requests poisoned").len()
    }

    /// Snapshot of every request seen, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .expect("scripted requests poisoned")
            .clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        self.requests
            .lock()
            .expect("scripted requests poisoned")
            .push(request);

        let reply = self
            .replies
            .lock()
            .expect("scripted replies poisoned")
            .pop_front();

        match reply {
            Some(Reply::Content(content)) => Ok(Completion::new(content, "scripted")),
            Some(Reply::Error(error)) => Err(error),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_replies_in_order_and_records_requests() {
        let client = ScriptedClient::new();
        client.push_reply("first");
        client.push_reply("second");

        let a = client
            .complete(CompletionRequest::new("sys", "one"))
            .await
            .unwrap();
        let b = client
            .complete(CompletionRequest::new("sys", "two"))
            .await
            .unwrap();

        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(client.call_count(), 2);
        assert_eq!(client.requests()[1].user, "two");
    }

    #[tokio::test]
    async fn exhausted_queue_fails_loudly() {
        let client = ScriptedClient::new();
        let err = client
            .complete(CompletionRequest::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn scripted_errors_are_raised() {
        let client = ScriptedClient::new();
        client.push_error(LlmError::Transport("connection failed".into()));
        let err = client
            .complete(CompletionRequest::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
