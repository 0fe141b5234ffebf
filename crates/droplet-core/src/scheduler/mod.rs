//! Reminder scheduling: the countdown state machine and the prompt
//! request/response exchange it drives.

mod engine;
mod prompt;

pub use engine::{
    ReminderEngine, ReminderState, SLEEP_THRESHOLD_SECS, WAKE_PROMPT_DELAY_SECS,
};
pub use prompt::{
    await_response, PromptOutcome, PromptRequest, PromptSession, PROMPT_TIMEOUT_SECS,
};
