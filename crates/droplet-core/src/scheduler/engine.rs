//! Reminder engine implementation.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads and never reads the system clock - the caller supplies `now` and
//! is responsible for calling `tick()` periodically (1 Hz in the CLI shell).
//!
//! ## State Transitions
//!
//! ```text
//! Counting -> Prompting when the countdown expires (guarded by alert_open)
//! Prompting -> Counting on resolve_prompt (user answer or auto-dismiss)
//! ```
//!
//! Configuration is passed into every transition that needs it, so values
//! are re-read (and re-clamped) at reminder-check time rather than captured
//! at construction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::scheduler::prompt::{PromptOutcome, PromptRequest, PROMPT_TIMEOUT_SECS};
use crate::storage::Config;

/// Wall-clock gap between two checks that is interpreted as a system sleep.
pub const SLEEP_THRESHOLD_SECS: u64 = 300;
/// Delay before the post-wake reminder fires, giving the UI time to come up.
pub const WAKE_PROMPT_DELAY_SECS: u64 = 2;

const PROMPT_TITLE: &str = "Drink Water!";
const NAG_MESSAGE: &str = "Drink water! You keep snoozing!";
const WELCOME_MESSAGE: &str = "Welcome back! Have some water after your break.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderState {
    /// Counting down to the next reminder.
    Counting,
    /// A reminder prompt is outstanding; ticks must not fire another.
    Prompting,
}

/// Core reminder engine.
///
/// Owns all timing state: the countdown target, the snooze decay chain and
/// the sleep-gap bookkeeping. Serializable so a shell can persist it between
/// invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderEngine {
    /// Moment of the last acknowledgment or snooze (countdown origin).
    last_drink_time: DateTime<Utc>,
    /// Moment of the last completed reminder cycle or wake check.
    last_check_time: DateTime<Utc>,
    /// Active countdown target in seconds.
    current_interval_secs: u64,
    /// Whether the next snooze is the first since the last acknowledgment.
    is_first_snooze: bool,
    /// Re-entrancy guard: true while a prompt is outstanding.
    alert_open: bool,
    /// Due time of a one-shot post-wake reminder, if one is scheduled.
    #[serde(default)]
    pending_welcome: Option<DateTime<Utc>>,
}

impl ReminderEngine {
    /// Create a fresh engine at `now` with a full base-interval countdown.
    pub fn new(now: DateTime<Utc>, config: &Config) -> Self {
        Self {
            last_drink_time: now,
            last_check_time: now,
            current_interval_secs: config.base_interval_secs(),
            is_first_snooze: true,
            alert_open: false,
            pending_welcome: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ReminderState {
        if self.alert_open {
            ReminderState::Prompting
        } else {
            ReminderState::Counting
        }
    }

    pub fn alert_open(&self) -> bool {
        self.alert_open
    }

    pub fn is_first_snooze(&self) -> bool {
        self.is_first_snooze
    }

    pub fn current_interval_secs(&self) -> u64 {
        self.current_interval_secs
    }

    pub fn last_drink_time(&self) -> DateTime<Utc> {
        self.last_drink_time
    }

    pub fn last_check_time(&self) -> DateTime<Utc> {
        self.last_check_time
    }

    /// Seconds since the last acknowledgment or snooze. Clamped at zero for
    /// non-monotonic clocks.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.last_drink_time).num_seconds().max(0) as u64
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        self.current_interval_secs
            .saturating_sub(self.elapsed_secs(now))
    }

    /// Countdown as `M:SS` for the status display.
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        let remaining = self.remaining_secs(now);
        format!("{}:{:02}", remaining / 60, remaining % 60)
    }

    /// What the next snooze duration would be if the user snoozed right
    /// now. Read-only mirror of the branch in [`snooze`](Self::snooze).
    pub fn next_snooze_secs(&self, config: &Config) -> u64 {
        if self.is_first_snooze {
            config.first_snooze_secs()
        } else {
            (self.current_interval_secs / 2).max(config.min_interval_secs())
        }
    }

    /// Next snooze duration as a button/menu label.
    pub fn format_next_snooze(&self, config: &Config) -> String {
        format_duration_label(self.next_snooze_secs(config))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>, config: &Config) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            remaining_secs: self.remaining_secs(now),
            remaining_display: self.format_remaining(now),
            elapsed_secs: self.elapsed_secs(now),
            current_interval_secs: self.current_interval_secs,
            is_first_snooze: self.is_first_snooze,
            next_snooze_label: self.format_next_snooze(config),
            at: now,
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Call periodically. Returns `Some(Event::ReminderDue)` when a prompt
    /// should be presented.
    pub fn tick(&mut self, now: DateTime<Utc>, config: &Config) -> Option<Event> {
        // A scheduled post-wake reminder fires independently of the normal
        // expiry condition.
        if let Some(due) = self.pending_welcome {
            if now >= due {
                self.pending_welcome = None;
                if self.alert_open {
                    // At most one prompt at a time: the welcome reminder is
                    // dropped, not queued.
                    tracing::debug!("post-wake reminder suppressed, prompt already open");
                } else {
                    self.alert_open = true;
                    tracing::info!("post-wake reminder due");
                    return Some(self.reminder_due(WELCOME_MESSAGE.to_string(), now, config));
                }
            }
        }

        let elapsed = self.elapsed_secs(now);
        if !self.alert_open && elapsed >= self.current_interval_secs {
            // Sub-minute cycles (small snooze floors) get the generic nag;
            // citing "0 min" would be nonsense.
            let message = if elapsed >= 60 {
                format!(
                    "It's been {} min since your last water. Drink up!",
                    elapsed / 60
                )
            } else {
                NAG_MESSAGE.to_string()
            };
            self.alert_open = true;
            tracing::info!(elapsed_secs = elapsed, "reminder due");
            return Some(self.reminder_due(message, now, config));
        }
        None
    }

    /// "I drank water": restart the countdown at the base interval and
    /// reset the decay chain.
    pub fn acknowledge(&mut self, now: DateTime<Utc>, config: &Config) -> Event {
        self.last_drink_time = now;
        self.current_interval_secs = config.base_interval_secs();
        self.is_first_snooze = true;
        Event::Acknowledged {
            next_reminder_secs: self.current_interval_secs,
            at: now,
        }
    }

    /// Postpone: first snooze grants the configured first-snooze delay,
    /// each one after that halves the interval, floored at `min_interval`.
    /// The countdown restarts from the moment of the snooze.
    pub fn snooze(&mut self, now: DateTime<Utc>, config: &Config) -> Event {
        if self.is_first_snooze {
            self.current_interval_secs = config.first_snooze_secs();
            self.is_first_snooze = false;
        } else {
            self.current_interval_secs =
                (self.current_interval_secs / 2).max(config.min_interval_secs());
        }
        self.last_drink_time = now;
        Event::Snoozed {
            snoozed_for_secs: self.current_interval_secs,
            at: now,
        }
    }

    /// Close an open prompt with the given outcome, applying the matching
    /// transition and completing the reminder cycle.
    pub fn resolve_prompt(
        &mut self,
        outcome: PromptOutcome,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Event {
        match outcome {
            PromptOutcome::Acknowledged => {
                self.acknowledge(now, config);
            }
            PromptOutcome::Snoozed => {
                self.snooze(now, config);
            }
        }
        self.alert_open = false;
        self.last_check_time = now;
        Event::PromptResolved { outcome, at: now }
    }

    /// Wake-from-sleep signal. A gap of [`SLEEP_THRESHOLD_SECS`] or more
    /// since the last check counts as a genuine sleep: the decay chain is
    /// reset and a welcome reminder is scheduled shortly after `now`.
    /// `last_check_time` is refreshed either way.
    pub fn on_wake(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let gap = (now - self.last_check_time).num_seconds().max(0) as u64;
        let mut event = None;
        if gap >= SLEEP_THRESHOLD_SECS {
            self.is_first_snooze = true;
            let welcome_at = now + Duration::seconds(WAKE_PROMPT_DELAY_SECS as i64);
            self.pending_welcome = Some(welcome_at);
            tracing::info!(gap_secs = gap, "sleep gap detected");
            event = Some(Event::SleepDetected {
                gap_secs: gap,
                welcome_at,
                at: now,
            });
        }
        self.last_check_time = now;
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reminder_due(&self, message: String, now: DateTime<Utc>, config: &Config) -> Event {
        Event::ReminderDue {
            prompt: PromptRequest {
                title: PROMPT_TITLE.to_string(),
                message,
                buttons: [
                    "I Drank Water".to_string(),
                    format!("Snooze ({})", self.format_next_snooze(config)),
                ],
                timeout_secs: PROMPT_TIMEOUT_SECS,
                play_sound: config.sound_enabled(),
            },
            elapsed_secs: self.elapsed_secs(now),
            at: now,
        }
    }
}

/// Duration label for snooze buttons and menus: whole minutes as "10 min",
/// fractional minutes with one decimal as "1.5 min", sub-minute as "45 sec".
fn format_duration_label(secs: u64) -> String {
    if secs >= 60 {
        if secs % 60 == 0 {
            format!("{} min", secs / 60)
        } else {
            format!("{:.1} min", secs as f64 / 60.0)
        }
    } else {
        format!("{} sec", secs)
    }
}
