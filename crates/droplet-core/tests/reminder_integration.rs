//! Integration tests for the reminder cycle.
//!
//! These drive the engine through complete acknowledge/snooze/wake
//! timelines with synthetic timestamps, the way a shell heartbeat would.

use chrono::{DateTime, Duration, TimeZone, Utc};
use droplet_core::scheduler::SLEEP_THRESHOLD_SECS;
use droplet_core::{Config, Event, PromptOutcome, PromptSession, ReminderEngine};

fn config_1800_600_15() -> Config {
    let mut config = Config::default();
    config.reminder.base_interval_secs = 1800;
    config.reminder.first_snooze_secs = 600;
    config.reminder.min_interval_secs = 15;
    config
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

/// Tick once per second over `[from, to]`, asserting nothing fires.
fn tick_quiet(engine: &mut ReminderEngine, config: &Config, from: i64, to: i64) {
    for s in from..=to {
        assert!(
            engine.tick(at(s), config).is_none(),
            "unexpected reminder at t={s}"
        );
    }
}

#[test]
fn full_decay_scenario() {
    let config = config_1800_600_15();
    let mut engine = ReminderEngine::new(t0(), &config);
    engine.acknowledge(t0(), &config);

    // No action until the base interval expires.
    tick_quiet(&mut engine, &config, 1, 1799);
    let due = engine.tick(at(1800), &config).expect("reminder at t=1800");
    match due {
        Event::ReminderDue { elapsed_secs, .. } => assert_eq!(elapsed_secs, 1800),
        other => panic!("expected ReminderDue, got {other:?}"),
    }

    // Snooze: the first grants the configured first-snooze delay.
    engine.resolve_prompt(PromptOutcome::Snoozed, at(1800), &config);
    assert_eq!(engine.current_interval_secs(), 600);
    assert!(!engine.is_first_snooze());

    tick_quiet(&mut engine, &config, 1801, 2399);
    assert!(engine.tick(at(2400), &config).is_some());

    // Each further snooze halves, down to the 15 s floor.
    engine.resolve_prompt(PromptOutcome::Snoozed, at(2400), &config);
    assert_eq!(engine.current_interval_secs(), 300);

    tick_quiet(&mut engine, &config, 2401, 2699);
    assert!(engine.tick(at(2700), &config).is_some());
    engine.resolve_prompt(PromptOutcome::Snoozed, at(2700), &config);
    assert_eq!(engine.current_interval_secs(), 150);

    let mut now = 2700i64;
    for expected in [75u64, 37, 18, 15, 15, 15] {
        now += engine.current_interval_secs() as i64;
        assert!(engine.tick(at(now), &config).is_some(), "reminder at t={now}");
        engine.resolve_prompt(PromptOutcome::Snoozed, at(now), &config);
        assert_eq!(engine.current_interval_secs(), expected);
    }

    // Acknowledging anywhere in the chain restores the base interval.
    engine.acknowledge(at(now), &config);
    assert_eq!(engine.current_interval_secs(), 1800);
    assert!(engine.is_first_snooze());
}

#[test]
fn wake_threshold_boundary() {
    let config = config_1800_600_15();
    let threshold = SLEEP_THRESHOLD_SECS as i64;

    // One second short of the threshold: bookkeeping only.
    let mut engine = ReminderEngine::new(t0(), &config);
    engine.snooze(t0(), &config);
    assert!(engine.on_wake(at(threshold - 1)).is_none());
    assert!(!engine.is_first_snooze());
    assert_eq!(engine.last_check_time(), at(threshold - 1));
    // No welcome reminder was scheduled.
    assert!(engine.tick(at(threshold + 1), &config).is_none());

    // Exactly the threshold: genuine sleep, fresh chain, welcome reminder.
    let mut engine = ReminderEngine::new(t0(), &config);
    engine.snooze(t0(), &config);
    let event = engine.on_wake(at(threshold)).expect("sleep detected");
    match event {
        Event::SleepDetected { gap_secs, welcome_at, .. } => {
            assert_eq!(gap_secs, SLEEP_THRESHOLD_SECS);
            assert_eq!(welcome_at, at(threshold + 2));
        }
        other => panic!("expected SleepDetected, got {other:?}"),
    }
    assert!(engine.is_first_snooze());

    // The welcome reminder fires 2 s after the wake, well ahead of the
    // 600 s snooze countdown still pending.
    assert!(engine.tick(at(threshold + 1), &config).is_none());
    let due = engine.tick(at(threshold + 2), &config).expect("welcome reminder");
    match due {
        Event::ReminderDue { prompt, .. } => {
            assert_eq!(prompt.message, "Welcome back! Have some water after your break.");
        }
        other => panic!("expected ReminderDue, got {other:?}"),
    }
}

#[test]
fn prompt_race_applies_exactly_one_outcome() {
    let config = config_1800_600_15();
    let mut engine = ReminderEngine::new(t0(), &config);

    engine.tick(at(1800), &config).expect("reminder");

    // The auto-dismiss and a late user click race; the session guard lets
    // only the first through.
    let mut session = PromptSession::new();
    assert!(session.resolve_default());
    assert!(!session.resolve(PromptOutcome::Acknowledged));

    engine.resolve_prompt(session.outcome().unwrap(), at(1920), &config);

    // Snooze (the default) applied: decay chain started, not reset.
    assert_eq!(engine.current_interval_secs(), 600);
    assert!(!engine.is_first_snooze());
    assert_eq!(engine.last_drink_time(), at(1920));
    assert_eq!(engine.last_check_time(), at(1920));
}

#[test]
fn prompt_labels_come_from_scheduler_state() {
    let config = config_1800_600_15();
    let mut engine = ReminderEngine::new(t0(), &config);

    let due = engine.tick(at(1800), &config).expect("reminder");
    match due {
        Event::ReminderDue { prompt, .. } => {
            assert_eq!(prompt.title, "Drink Water!");
            assert_eq!(prompt.buttons[0], "I Drank Water");
            assert_eq!(prompt.buttons[1], "Snooze (10 min)");
            assert_eq!(prompt.timeout_secs, 120);
            assert!(prompt.play_sound);
        }
        other => panic!("expected ReminderDue, got {other:?}"),
    }
}

#[test]
fn corrupted_config_is_clamped_not_rejected() {
    let mut config = Config::default();
    config.reminder.base_interval_secs = 0;
    config.reminder.first_snooze_secs = 0;
    config.reminder.min_interval_secs = 0;

    let mut engine = ReminderEngine::new(t0(), &config);
    assert_eq!(engine.current_interval_secs(), 60);

    engine.snooze(t0(), &config);
    assert_eq!(engine.current_interval_secs(), 10);
    engine.snooze(t0(), &config);
    assert_eq!(engine.current_interval_secs(), 5);
    engine.snooze(t0(), &config);
    assert_eq!(engine.current_interval_secs(), 5);
}
