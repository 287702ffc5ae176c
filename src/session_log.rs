//! Recording and replaying accelerometer sessions.
//!
//! A session log captures the raw sample stream plus the gestures that were
//! recognized live, as pretty-printed JSON. `tilt_replay` runs the samples
//! back through a fresh detector, which is how threshold changes get judged
//! against captured motion traces instead of hand waving.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::sensors::{AccelSample, SampleHandler, SensorError, SensorSource, Subscription};
use crate::tilt::TiltEvent;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub timestamp: f64,
    pub event: TiltEvent,
}

#[derive(Serialize, Deserialize)]
pub struct SessionLog {
    pub started_at: f64,
    pub sample_interval_ms: u64,
    pub samples: Vec<AccelSample>,
    pub events: Vec<RecordedEvent>,
}

impl SessionLog {
    pub fn new(started_at: f64, sample_interval_ms: u64) -> Self {
        Self {
            started_at,
            sample_interval_ms,
            samples: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn push_sample(&mut self, sample: AccelSample) {
        self.samples.push(sample);
    }

    pub fn push_event(&mut self, timestamp: f64, event: TiltEvent) {
        self.events.push(RecordedEvent { timestamp, event });
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a log from `.json` or `.json.gz`.
    pub fn load(path: &Path) -> anyhow::Result<SessionLog> {
        let file = File::open(path)?;
        if path.extension().map(|e| e == "gz").unwrap_or(false) {
            let gz = GzDecoder::new(file);
            let reader = BufReader::new(gz);
            Ok(serde_json::from_reader(reader)?)
        } else {
            let reader = BufReader::new(file);
            Ok(serde_json::from_reader(reader)?)
        }
    }
}

/// Source decorator that tees every delivered sample into a shared log before
/// forwarding it.
pub struct RecordingSource<S> {
    inner: S,
    log: Arc<Mutex<SessionLog>>,
}

impl<S> RecordingSource<S> {
    pub fn new(inner: S, log: Arc<Mutex<SessionLog>>) -> Self {
        Self { inner, log }
    }
}

impl<S: SensorSource> SensorSource for RecordingSource<S> {
    fn set_sample_interval(&mut self, interval_ms: u64) {
        if let Ok(mut log) = self.log.lock() {
            log.sample_interval_ms = interval_ms;
        }
        self.inner.set_sample_interval(interval_ms);
    }

    fn subscribe(&mut self, mut handler: SampleHandler) -> Result<Subscription, SensorError> {
        let log = self.log.clone();
        self.inner.subscribe(Box::new(move |sample| {
            if let Ok(mut log) = log.lock() {
                log.push_sample(sample);
            }
            handler(sample);
        }))
    }
}
