//! Accelerometer sample sources.
//!
//! Everything downstream consumes the same push-based contract: a source is
//! told its sampling interval, handed a handler, and returns a [`Subscription`]
//! that cancels delivery. The game never cares whether samples came from a
//! simulated waveform or a real sensor feed piped over stdin.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{interval, Duration};

/// One instantaneous accelerometer reading, in units of standard gravity
/// (~±1.0 along the gravity axis at rest). Timestamps are epoch seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccelSample {
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelSample {
    pub fn new(timestamp: f64, x: f64, y: f64, z: f64) -> Self {
        Self { timestamp, x, y, z }
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    /// The platform cannot provide motion data. Non-fatal: the game keeps
    /// running without gestures.
    #[error("sensor unavailable: {0}")]
    Unavailable(String),
}

/// Handler invoked once per delivered sample.
pub type SampleHandler = Box<dyn FnMut(AccelSample) + Send + 'static>;

/// A push-based motion sample stream.
pub trait SensorSource {
    /// Request a delivery interval in milliseconds. Sources that are paced
    /// externally (e.g. stdin) may ignore this.
    fn set_sample_interval(&mut self, interval_ms: u64);

    /// Start delivering samples to `handler` until the returned subscription
    /// is cancelled.
    fn subscribe(&mut self, handler: SampleHandler) -> Result<Subscription, SensorError>;
}

/// Cancellation handle for an active sample stream.
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub(crate) fn new(active: Arc<AtomicBool>) -> Self {
        Self { active }
    }

    /// Stop delivery. Idempotent. The producing task observes the flag before
    /// each delivery, so at most one sample already in flight can still land.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Simulated accelerometer for running the game without hardware.
///
/// Produces a landscape-hold resting pose with a sharp tilt excursion once per
/// cycle, alternating up and down, so the recognizer has something to detect.
pub struct SimulatedAccelerometer {
    interval_ms: u64,
}

/// Seconds per simulated gesture cycle: rest, one excursion, return to rest.
const SIM_CYCLE_S: f64 = 6.0;

impl SimulatedAccelerometer {
    pub fn new() -> Self {
        Self { interval_ms: 100 }
    }
}

impl Default for SimulatedAccelerometer {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SimulatedAccelerometer {
    fn set_sample_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms.max(1);
    }

    fn subscribe(&mut self, mut handler: SampleHandler) -> Result<Subscription, SensorError> {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let period_ms = self.interval_ms;

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_millis(period_ms));
            let mut n: u64 = 0;
            loop {
                ticker.tick().await;
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                handler(simulated_sample(n, period_ms));
                n += 1;
            }
        });

        Ok(Subscription::new(active))
    }
}

fn simulated_sample(n: u64, period_ms: u64) -> AccelSample {
    let t = n as f64 * period_ms as f64 / 1000.0;
    let cycle = (t / SIM_CYCLE_S) as u64;
    let phase = t % SIM_CYCLE_S;
    let direction = if cycle % 2 == 0 { -1.0 } else { 1.0 };

    // Sharp excursion in the middle of each cycle; low-level noise otherwise.
    let z = if (2.0..2.6).contains(&phase) {
        direction * 0.9
    } else {
        0.04 * (t * 1.3).sin()
    };

    AccelSample {
        timestamp: current_timestamp(),
        x: 0.85 + 0.02 * (t * 0.7).sin(),
        y: 0.05 * (t * 0.9).cos(),
        z,
    }
}

/// Sample source reading one reading per line from stdin.
///
/// Accepts the `x=0.81, y=0.05, z=-0.62` sensor dump format or a bare
/// whitespace-separated triple. Timestamps are stamped on arrival, so the
/// feeding process controls pacing.
pub struct StdinSource;

impl SensorSource for StdinSource {
    fn set_sample_interval(&mut self, _interval_ms: u64) {}

    fn subscribe(&mut self, mut handler: SampleHandler) -> Result<Subscription, SensorError> {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();

        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(_) => break,
                };
                if let Some(sample) = parse_sample_line(&line) {
                    handler(sample);
                }
            }
        });

        Ok(Subscription::new(active))
    }
}

/// Parse a single text line into a sample, stamping the current time.
///
/// Returns `None` for blank or malformed lines; the stream just skips them.
pub fn parse_sample_line(line: &str) -> Option<AccelSample> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.contains('=') {
        let mut x = None;
        let mut y = None;
        let mut z = None;
        for part in line.split(',') {
            let part = part.trim();
            if let Some(v) = part.strip_prefix("x=") {
                x = v.trim().parse().ok();
            } else if let Some(v) = part.strip_prefix("y=") {
                y = v.trim().parse().ok();
            } else if let Some(v) = part.strip_prefix("z=") {
                z = v.trim().parse().ok();
            }
        }
        return Some(AccelSample::new(current_timestamp(), x?, y?, z?));
    }

    let mut fields = line.split_whitespace();
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    let z = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(AccelSample::new(current_timestamp(), x, y, z))
}
