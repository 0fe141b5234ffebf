use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::{PromptOutcome, PromptRequest, ReminderState};

/// Every state change in the scheduler produces an Event.
/// The shell polls for events; `ReminderDue` doubles as the request the
/// presentation layer turns into a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The countdown expired (or a post-wake reminder came due) and a
    /// prompt should be presented.
    ReminderDue {
        prompt: PromptRequest,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// A wall-clock gap at wake time was large enough to count as a
    /// system sleep; a welcome reminder has been scheduled.
    SleepDetected {
        gap_secs: u64,
        welcome_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// User confirmed drinking water.
    Acknowledged {
        next_reminder_secs: u64,
        at: DateTime<Utc>,
    },
    /// User postponed; the countdown restarted with the decayed interval.
    Snoozed {
        snoozed_for_secs: u64,
        at: DateTime<Utc>,
    },
    /// An open prompt was closed, by the user or by the auto-dismiss.
    PromptResolved {
        outcome: PromptOutcome,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: ReminderState,
        remaining_secs: u64,
        remaining_display: String,
        elapsed_secs: u64,
        current_interval_secs: u64,
        is_first_snooze: bool,
        next_snooze_label: String,
        at: DateTime<Utc>,
    },
}
