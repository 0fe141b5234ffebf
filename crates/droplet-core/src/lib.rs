//! # Droplet Core Library
//!
//! Core business logic for Droplet, a water-break reminder utility. It
//! implements a CLI-first philosophy: all operations are available via a
//! standalone CLI binary, with any GUI shell being a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Reminder Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` with the current time. It owns
//!   the countdown, the snooze decay chain, and sleep-gap detection.
//! - **Prompts**: Reminders surface as asynchronous request/response
//!   exchanges with a single-resolution guard for the auto-dismiss race.
//! - **Storage**: TOML-based configuration and a SQLite key-value store for
//!   persisting engine state between shell invocations.
//!
//! ## Key Components
//!
//! - [`ReminderEngine`]: Core scheduling state machine
//! - [`PromptSession`]: Idempotent prompt resolution guard
//! - [`Config`]: Application configuration with floor-clamped reads
//! - [`Database`]: Key-value persistence

pub mod error;
pub mod events;
pub mod scheduler;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError};
pub use events::Event;
pub use scheduler::{
    PromptOutcome, PromptRequest, PromptSession, ReminderEngine, ReminderState,
};
pub use storage::{Config, Database};
