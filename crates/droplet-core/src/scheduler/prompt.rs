//! Prompt request/response exchange.
//!
//! The scheduler never blocks on a dialog. It emits a [`PromptRequest`] and
//! the presentation layer reports back a [`PromptOutcome`]. An unanswered
//! prompt auto-dismisses after [`PROMPT_TIMEOUT_SECS`] with snooze as the
//! default outcome, and that timer races the user's answer: whichever lands
//! first wins and the other path must become a no-op. [`PromptSession`] is
//! the single resolved flag that settles the race.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::{timeout, Duration};

/// Seconds before an unanswered prompt resolves to its default outcome.
pub const PROMPT_TIMEOUT_SECS: u64 = 120;

/// How the user (or the auto-dismiss) answered a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptOutcome {
    Acknowledged,
    Snoozed,
}

/// What the presentation layer needs to show one reminder prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRequest {
    pub title: String,
    pub message: String,
    /// Button labels: [acknowledge, snooze].
    pub buttons: [String; 2],
    pub timeout_secs: u64,
    /// Whether an audible cue should accompany the prompt. Driven by
    /// configuration, not by the scheduler.
    pub play_sound: bool,
}

/// Single-resolution guard for an open prompt.
///
/// `resolve` records the first outcome and rejects every later one, so a
/// user click landing after the auto-dismiss (or vice versa) is a no-op
/// rather than a double-applied transition.
#[derive(Debug, Default)]
pub struct PromptSession {
    outcome: Option<PromptOutcome>,
}

impl PromptSession {
    pub fn new() -> Self {
        Self { outcome: None }
    }

    /// Record the outcome. Returns true if this call resolved the session,
    /// false if it was already resolved.
    pub fn resolve(&mut self, outcome: PromptOutcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    /// Resolve with the auto-dismiss default.
    pub fn resolve_default(&mut self) -> bool {
        self.resolve(PromptOutcome::Snoozed)
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<PromptOutcome> {
        self.outcome
    }
}

/// Await the presentation layer's answer for up to `timeout_secs`.
///
/// Resolves to the default outcome (snooze) when the timeout elapses or the
/// responder goes away without answering.
pub async fn await_response(
    rx: oneshot::Receiver<PromptOutcome>,
    timeout_secs: u64,
) -> PromptOutcome {
    match timeout(Duration::from_secs(timeout_secs), rx).await {
        Ok(Ok(outcome)) => outcome,
        _ => PromptOutcome::Snoozed,
    }
}
