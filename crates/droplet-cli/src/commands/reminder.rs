use chrono::Utc;
use clap::Subcommand;
use droplet_core::scheduler::{PromptOutcome, PromptRequest, PromptSession};
use droplet_core::{Config, Database, Event, ReminderEngine};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{interval, Duration, MissedTickBehavior};

const ENGINE_KEY: &str = "reminder_engine";

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Print current scheduler state as JSON (ticking first)
    Status,
    /// Record that water was drunk
    Ack,
    /// Snooze the current countdown
    Snooze,
    /// Deliver the wake-from-sleep signal
    Wake,
    /// Discard persisted scheduler state
    Reset,
    /// Run the foreground heartbeat, prompting on the terminal
    Run,
}

fn load_engine(db: &Database, config: &Config) -> ReminderEngine {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        if let Ok(engine) = serde_json::from_str::<ReminderEngine>(&json) {
            return engine;
        }
    }
    ReminderEngine::new(Utc::now(), config)
}

fn save_engine(db: &Database, engine: &ReminderEngine) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

/// Best-effort persistence; the scheduler stays correct without it.
fn persist(db: &Database, engine: &ReminderEngine) {
    if let Err(e) = save_engine(db, engine) {
        tracing::warn!("failed to persist engine state: {e}");
    }
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let mut engine = load_engine(&db, &config);

    match action {
        ReminderAction::Status => {
            let now = Utc::now();
            let fired = engine.tick(now, &config);
            println!(
                "{}",
                serde_json::to_string_pretty(&engine.snapshot(now, &config))?
            );
            if let Some(event) = fired {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        ReminderAction::Ack => {
            let now = Utc::now();
            // An answer while a prompt is outstanding closes the prompt;
            // otherwise this is the plain menu action.
            let event = if engine.alert_open() {
                engine.resolve_prompt(PromptOutcome::Acknowledged, now, &config)
            } else {
                engine.acknowledge(now, &config)
            };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ReminderAction::Snooze => {
            let now = Utc::now();
            let event = if engine.alert_open() {
                engine.resolve_prompt(PromptOutcome::Snoozed, now, &config)
            } else {
                engine.snooze(now, &config)
            };
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        ReminderAction::Wake => {
            match engine.on_wake(Utc::now()) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("{{\"type\": \"no_sleep_detected\"}}"),
            }
        }
        ReminderAction::Reset => {
            db.kv_delete(ENGINE_KEY)?;
            engine = ReminderEngine::new(Utc::now(), &config);
            println!("{{\"type\": \"engine_reset\"}}");
        }
        ReminderAction::Run => {
            return run_loop(&db, &mut engine);
        }
    }

    persist(&db, &engine);
    Ok(())
}

/// Foreground heartbeat: tick once per second, prompt on the terminal when
/// a reminder comes due, exit on Ctrl-C.
fn run_loop(db: &Database, engine: &mut ReminderEngine) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Configuration is re-read at reminder-check time so
                    // edits apply without restarting the loop.
                    let config = Config::load_or_default();
                    let now = Utc::now();
                    let fired = engine.tick(now, &config);
                    eprint!(
                        "\rnext reminder in {}  (snooze: {})   ",
                        engine.format_remaining(now),
                        engine.format_next_snooze(&config),
                    );
                    if let Some(Event::ReminderDue { prompt, .. }) = fired {
                        eprintln!();
                        let outcome = present_prompt(&prompt, &mut lines).await;
                        let event = engine.resolve_prompt(outcome, Utc::now(), &config);
                        println!("{}", serde_json::to_string(&event)?);
                        persist(db, engine);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    eprintln!();
                    break;
                }
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;

    persist(db, engine);
    Ok(())
}

/// Present one prompt and settle the user-answer vs auto-dismiss race
/// through a single `PromptSession`.
async fn present_prompt(
    prompt: &PromptRequest,
    lines: &mut Lines<BufReader<Stdin>>,
) -> PromptOutcome {
    if prompt.play_sound {
        eprint!("\x07");
    }
    println!("== {} ==", prompt.title);
    println!("{}", prompt.message);
    println!(
        "  [enter/d] {}   [s] {}   (auto-snooze in {}s)",
        prompt.buttons[0], prompt.buttons[1], prompt.timeout_secs
    );

    let mut session = PromptSession::new();
    let mut stdin_open = true;
    let deadline = tokio::time::sleep(Duration::from_secs(prompt.timeout_secs));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => {
                session.resolve_default();
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(input)) => {
                        let answer = match input.trim() {
                            "" | "d" | "D" => Some(PromptOutcome::Acknowledged),
                            "s" | "S" => Some(PromptOutcome::Snoozed),
                            _ => None,
                        };
                        if let Some(outcome) = answer {
                            session.resolve(outcome);
                            break;
                        }
                        println!("  please answer [d]rank or [s]nooze");
                    }
                    // Stdin is gone; wait out the auto-dismiss.
                    _ => stdin_open = false,
                }
            }
        }
    }

    session.outcome().unwrap_or(PromptOutcome::Snoozed)
}
