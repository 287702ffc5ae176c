//! Offline replay: run a recorded accelerometer session back through a fresh
//! detector and report what it finds. Used to judge threshold changes against
//! captured motion traces, and to check drift between live and replayed
//! detections.

use std::path::PathBuf;

use clap::Parser;
use word_tilt_rs::session_log::{RecordedEvent, SessionLog};
use word_tilt_rs::tilt::{TiltDetector, TiltEvent};

#[derive(Parser, Debug)]
#[command(name = "tilt_replay")]
#[command(about = "Replay a recorded session through the tilt detector", long_about = None)]
struct Args {
    /// Path to a recorded session (.json or .json.gz)
    #[arg(long)]
    log: PathBuf,

    /// Print every sample as it is replayed
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let log = SessionLog::load(&args.log)?;
    println!(
        "Replaying {} samples ({}ms interval) from {}",
        log.samples.len(),
        log.sample_interval_ms,
        args.log.display()
    );

    let mut detector = TiltDetector::new(log.started_at);
    let mut replayed: Vec<RecordedEvent> = Vec::new();

    for sample in &log.samples {
        if args.verbose {
            println!(
                "  [t+{:>6.2}s] x={:+.2} y={:+.2} z={:+.2}",
                sample.timestamp - log.started_at,
                sample.x,
                sample.y,
                sample.z
            );
        }
        if let Some(event) = detector.process(sample) {
            println!(
                "[t+{:>6.2}s] {:?}  (z={:+.2})",
                sample.timestamp - log.started_at,
                event,
                sample.z
            );
            replayed.push(RecordedEvent {
                timestamp: sample.timestamp,
                event,
            });
        }
    }

    let ups = replayed
        .iter()
        .filter(|e| e.event == TiltEvent::Up)
        .count();
    let downs = replayed.len() - ups;

    println!();
    println!("=== Replay Summary ===");
    println!("Samples:    {}", log.samples.len());
    println!("Detections: {} ({} up, {} down)", replayed.len(), ups, downs);

    if !log.events.is_empty() {
        let matched = replayed
            .iter()
            .zip(log.events.iter())
            .filter(|(replay, live)| replay.event == live.event)
            .count();
        println!(
            "Recorded live: {} events, agreement {}/{}",
            log.events.len(),
            matched,
            log.events.len().max(replayed.len())
        );
    }

    Ok(())
}
