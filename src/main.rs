use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use log::warn;
use tokio::sync::mpsc;
use tokio::time::interval;

use word_tilt_rs::categories;
use word_tilt_rs::game::{GameSession, TimeOption};
use word_tilt_rs::recognizer::{StopHandle, TiltRecognizer};
use word_tilt_rs::sensors::{
    current_timestamp, SensorError, SensorSource, SimulatedAccelerometer, StdinSource,
};
use word_tilt_rs::session_log::{RecordingSource, SessionLog};
use word_tilt_rs::tilt::{TiltEvent, SAMPLE_INTERVAL_MS};
use word_tilt_rs::watchdog::{SensorWatchdog, WatchedSource};

#[derive(Parser, Debug)]
#[command(name = "word_tilt")]
#[command(about = "Tilt-to-answer word party game", long_about = None)]
struct Args {
    /// List categories and exit
    #[arg(long)]
    list: bool,

    /// Category id
    #[arg(long, default_value = "animals")]
    category: String,

    /// Subcategory id
    #[arg(long, default_value = "mammals")]
    subcategory: String,

    /// Round length in seconds (30, 60 or 120)
    #[arg(long, default_value = "60")]
    time: u64,

    /// Input source (sim, stdin, keys)
    #[arg(long, default_value = "sim")]
    source: String,

    /// Word selection seed (0 = derive from the clock)
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Record samples and recognized events to this JSON file
    #[arg(long)]
    record: Option<PathBuf>,
}

enum GameInput {
    Correct,
    Skip,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        for category in categories::catalog() {
            println!("{} - {}", category.id, category.title);
            for sub in category.subcategories {
                println!(
                    "  {}/{} - {} ({} words)",
                    category.id,
                    sub.id,
                    sub.title,
                    sub.words.len()
                );
            }
        }
        return Ok(());
    }

    let Some(sub) = categories::find(&args.category, &args.subcategory) else {
        bail!(
            "unknown category '{}/{}' (see --list)",
            args.category,
            args.subcategory
        );
    };
    let words: Vec<String> = sub.words.iter().map(|w| w.to_string()).collect();
    let time = TimeOption::try_from(args.time)?;
    let seed = if args.seed != 0 {
        args.seed
    } else {
        clock_seed()
    };

    let mut session = GameSession::new(words, time, seed)?;

    println!("[{}] Word Tilt starting", ts_now());
    println!("  Category: {}/{} ({})", args.category, args.subcategory, sub.title);
    println!("  Round length: {}s", session.time_left());
    println!("  Source: {}", args.source);
    if args.source == "keys" {
        println!("  Type 'c' + Enter for correct, 's' + Enter for skip");
    } else {
        println!("  Tilt down = correct, tilt up = skip");
    }
    println!();

    let (tx, mut rx) = mpsc::unbounded_channel::<GameInput>();
    let watchdog = SensorWatchdog::new(Duration::from_secs(3));
    let record_log = args
        .record
        .as_ref()
        .map(|_| Arc::new(Mutex::new(SessionLog::new(current_timestamp(), SAMPLE_INTERVAL_MS))));

    let stop: Option<StopHandle> = match args.source.as_str() {
        "sim" => Some(launch(
            SimulatedAccelerometer::new(),
            &watchdog,
            &tx,
            &record_log,
        )?),
        "stdin" => Some(launch(StdinSource, &watchdog, &tx, &record_log)?),
        "keys" => {
            spawn_key_reader(tx.clone());
            None
        }
        other => bail!("unknown source '{}' (expected sim, stdin or keys)", other),
    };

    print_word(&session);

    let mut ticker = interval(Duration::from_secs(1));
    ticker.tick().await; // the first tick completes immediately
    let mut warned_silent = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick();
                if session.is_over() {
                    break;
                }
                if session.time_left() % 10 == 0 {
                    println!(
                        "[{}] {}s left, score {}",
                        ts_now(),
                        session.time_left(),
                        session.score()
                    );
                }
                if !warned_silent && args.source != "keys" && watchdog.is_silent() {
                    warned_silent = true;
                    warn!("no accelerometer samples for 3s");
                    println!(
                        "[{}] motion input is silent; gestures will not register \
                         (restart with --source keys for manual input)",
                        ts_now()
                    );
                }
            }
            input = rx.recv() => {
                let Some(input) = input else { break };
                match input {
                    GameInput::Correct => {
                        session.mark_correct();
                        println!("[{}] correct! score {}", ts_now(), session.score());
                    }
                    GameInput::Skip => {
                        session.skip();
                        println!("[{}] skipped", ts_now());
                    }
                }
                if !session.is_over() {
                    print_word(&session);
                }
            }
        }
    }

    if let Some(stop) = &stop {
        stop.stop();
    }

    println!();
    println!("[{}] Time's up! Final score: {}", ts_now(), session.score());

    if let (Some(path), Some(log)) = (&args.record, &record_log) {
        match log.lock() {
            Ok(log) => {
                log.save(path)
                    .with_context(|| format!("saving session log to {}", path.display()))?;
                println!(
                    "[{}] Session log saved: {} samples, {} events -> {}",
                    ts_now(),
                    log.samples.len(),
                    log.events.len(),
                    path.display()
                );
            }
            Err(_) => warn!("session log lock poisoned; nothing saved"),
        }
    }

    Ok(())
}

/// Wrap the base source with the watchdog (and the recorder when requested),
/// then hand it to the recognizer. Tilt up skips, tilt down scores.
fn launch<S: SensorSource>(
    base: S,
    watchdog: &SensorWatchdog,
    tx: &mpsc::UnboundedSender<GameInput>,
    record_log: &Option<Arc<Mutex<SessionLog>>>,
) -> Result<StopHandle, SensorError> {
    let watched = WatchedSource::new(base, watchdog.clone());
    match record_log {
        Some(log) => start_recognizer(
            RecordingSource::new(watched, log.clone()),
            tx.clone(),
            Some(log.clone()),
        ),
        None => start_recognizer(watched, tx.clone(), None),
    }
}

fn start_recognizer<S: SensorSource>(
    mut source: S,
    tx: mpsc::UnboundedSender<GameInput>,
    log: Option<Arc<Mutex<SessionLog>>>,
) -> Result<StopHandle, SensorError> {
    let up_tx = tx.clone();
    let up_log = log.clone();
    let down_log = log;

    TiltRecognizer::observe(
        &mut source,
        move || {
            if let Some(log) = &up_log {
                if let Ok(mut log) = log.lock() {
                    log.push_event(current_timestamp(), TiltEvent::Up);
                }
            }
            let _ = up_tx.send(GameInput::Skip);
        },
        move || {
            if let Some(log) = &down_log {
                if let Ok(mut log) = log.lock() {
                    log.push_event(current_timestamp(), TiltEvent::Down);
                }
            }
            let _ = tx.send(GameInput::Correct);
        },
    )
}

/// Manual fallback: one input per line on stdin.
fn spawn_key_reader(tx: mpsc::UnboundedSender<GameInput>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let input = match line.trim() {
                "c" => GameInput::Correct,
                "s" => GameInput::Skip,
                _ => continue,
            };
            if tx.send(input).is_err() {
                break;
            }
        }
    });
}

fn print_word(session: &GameSession) {
    println!(
        "[{}] ({}s)  WORD: {}",
        ts_now(),
        session.time_left(),
        session.current_word().to_uppercase()
    );
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
        | 1
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
