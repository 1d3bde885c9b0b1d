//! Mock dispatcher for testing.
//!
//! Produces the same `Result<String, DispatchError>` values as the gRPC
//! dispatcher and records every command it was asked to send, so the shell
//! can be tested without a network.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::DispatchError;
use crate::Dispatch;

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Reply with this text.
    Output(String),
    /// Reply with `Output for <command>`, like the stub agent.
    Echo,
    Unavailable,
    Remote(String),
    Timeout { ms: u64 },
    Cancelled,
}

impl MockResponse {
    fn resolve(&self, command: &str) -> Result<String, DispatchError> {
        match self {
            MockResponse::Output(text) => Ok(text.clone()),
            MockResponse::Echo => Ok(format!("Output for {command}")),
            MockResponse::Unavailable => Err(DispatchError::Unavailable),
            MockResponse::Remote(details) => Err(DispatchError::Remote(details.clone())),
            MockResponse::Timeout { ms } => Err(DispatchError::Timeout(Duration::from_millis(*ms))),
            MockResponse::Cancelled => Err(DispatchError::Cancelled),
        }
    }
}

/// Scripted dispatcher.
///
/// Responses are consumed in order; once the script runs out every further
/// call gets the fallback (echo by default).
#[derive(Debug, Clone)]
pub struct MockDispatcher {
    responses: VecDeque<MockResponse>,
    fallback: MockResponse,
    sent: Vec<String>,
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self {
            responses: VecDeque::new(),
            fallback: MockResponse::Echo,
            sent: Vec::new(),
        }
    }
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(mut self, responses: Vec<MockResponse>) -> Self {
        self.responses = responses.into();
        self
    }

    pub fn with_fallback(mut self, fallback: MockResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Every command line dispatched so far, oldest first.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

impl Dispatch for MockDispatcher {
    fn send(&mut self, command: &str) -> Result<String, DispatchError> {
        self.sent.push(command.to_string());
        let response = self
            .responses
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        response.resolve(command)
    }
}

/// Built-in test fixtures for common scenarios.
pub mod fixtures {
    use super::*;

    /// An agent that is never reachable.
    pub fn unreachable() -> MockDispatcher {
        MockDispatcher::new().with_fallback(MockResponse::Unavailable)
    }

    /// An agent that answers with these texts in order, then echoes.
    pub fn replies(texts: &[&str]) -> MockDispatcher {
        let responses = texts
            .iter()
            .map(|text| MockResponse::Output((*text).to_string()))
            .collect();
        MockDispatcher::new().with_responses(responses)
    }

    /// An agent that rejects every command with the same details.
    pub fn rejecting(details: &str) -> MockDispatcher {
        MockDispatcher::new().with_fallback(MockResponse::Remote(details.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_echoes_and_records() {
        let mut mock = MockDispatcher::new();
        assert_eq!(
            mock.send("show-afi-objects").unwrap(),
            "Output for show-afi-objects"
        );
        assert_eq!(mock.sent(), ["show-afi-objects"]);
    }

    #[test]
    fn scripted_responses_in_order_then_fallback() {
        let mut mock = MockDispatcher::new().with_responses(vec![
            MockResponse::Output("first".to_string()),
            MockResponse::Unavailable,
        ]);

        assert_eq!(mock.send("a").unwrap(), "first");
        assert_eq!(mock.send("b").unwrap_err(), DispatchError::Unavailable);
        assert_eq!(mock.send("c").unwrap(), "Output for c");
        assert_eq!(mock.sent(), ["a", "b", "c"]);
    }

    #[test]
    fn timeout_response() {
        let mut mock = MockDispatcher::new().with_responses(vec![MockResponse::Timeout { ms: 250 }]);
        assert_eq!(
            mock.send("x").unwrap_err(),
            DispatchError::Timeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn fixture_unreachable() {
        let mut mock = fixtures::unreachable();
        for _ in 0..3 {
            assert_eq!(mock.send("show-afi-objects").unwrap_err(), DispatchError::Unavailable);
        }
        assert_eq!(mock.sent().len(), 3);
    }

    #[test]
    fn fixture_replies() {
        let mut mock = fixtures::replies(&["Route added", "Receive added"]);
        assert_eq!(mock.send("add-route r p n").unwrap(), "Route added");
        assert_eq!(mock.send("add-receive 1 c").unwrap(), "Receive added");
    }

    #[test]
    fn fixture_rejecting() {
        let mut mock = fixtures::rejecting("permission denied");
        assert_eq!(
            mock.send("add-table t k 6 d 10").unwrap_err(),
            DispatchError::Remote("permission denied".to_string())
        );
    }

    #[test]
    fn works_through_box_dyn() {
        let mut boxed: Box<dyn Dispatch> = Box::new(fixtures::replies(&["ok"]));
        assert_eq!(boxed.send("anything").unwrap(), "ok");
    }
}
