//! Sensor silence detection.
//!
//! A sensor that cannot deliver is not an error here, it is a degraded mode:
//! the recognizer simply never fires. The watchdog exists so the game can
//! notice the silence and tell the player that motion input is dead.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::sensors::{SampleHandler, SensorError, SensorSource, Subscription};

/// Tracks when the accelerometer last produced a sample.
#[derive(Clone)]
pub struct SensorWatchdog {
    last_sample: Arc<Mutex<Instant>>,
    silence_threshold: Duration,
}

impl SensorWatchdog {
    pub fn new(silence_threshold: Duration) -> Self {
        Self {
            last_sample: Arc::new(Mutex::new(Instant::now())),
            silence_threshold,
        }
    }

    pub fn note_sample(&self) {
        if let Ok(mut last) = self.last_sample.lock() {
            *last = Instant::now();
        }
    }

    pub fn time_since_last_sample(&self) -> Option<Duration> {
        self.last_sample.lock().ok().map(|last| last.elapsed())
    }

    pub fn is_silent(&self) -> bool {
        self.time_since_last_sample()
            .map(|elapsed| elapsed > self.silence_threshold)
            .unwrap_or(false)
    }
}

/// Source decorator that feeds the watchdog on every delivered sample.
pub struct WatchedSource<S> {
    inner: S,
    watchdog: SensorWatchdog,
}

impl<S> WatchedSource<S> {
    pub fn new(inner: S, watchdog: SensorWatchdog) -> Self {
        Self { inner, watchdog }
    }
}

impl<S: SensorSource> SensorSource for WatchedSource<S> {
    fn set_sample_interval(&mut self, interval_ms: u64) {
        self.inner.set_sample_interval(interval_ms);
    }

    fn subscribe(&mut self, mut handler: SampleHandler) -> Result<Subscription, SensorError> {
        let watchdog = self.watchdog.clone();
        self.inner.subscribe(Box::new(move |sample| {
            watchdog.note_sample();
            handler(sample);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_silence_detection() {
        let watchdog = SensorWatchdog::new(Duration::from_millis(50));
        assert!(!watchdog.is_silent());

        thread::sleep(Duration::from_millis(80));
        assert!(watchdog.is_silent());

        watchdog.note_sample();
        assert!(!watchdog.is_silent());
    }

    #[test]
    fn test_watchdog_clones_share_state() {
        let watchdog = SensorWatchdog::new(Duration::from_millis(50));
        let other = watchdog.clone();

        thread::sleep(Duration::from_millis(80));
        assert!(other.is_silent());

        watchdog.note_sample();
        assert!(!other.is_silent());
    }

    #[tokio::test]
    async fn test_watched_source_feeds_watchdog() {
        use crate::sensors::SimulatedAccelerometer;

        let watchdog = SensorWatchdog::new(Duration::from_millis(200));
        let mut source = WatchedSource::new(SimulatedAccelerometer::new(), watchdog.clone());
        source.set_sample_interval(1);
        let subscription = source.subscribe(Box::new(|_sample| {})).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(watchdog.time_since_last_sample().unwrap() < Duration::from_millis(200));

        subscription.unsubscribe();
    }
}
