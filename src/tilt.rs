//! Tilt gesture detection.
//!
//! Turns the raw accelerometer stream into discrete "tilt up" / "tilt down"
//! events for a phone held to the forehead in landscape. The hard part is not
//! spotting a big z excursion, it is refusing to fire on everything else.
//! Phone handling and gravity drift look like tilts on the position axis, and
//! one real tilt motion produces a whole burst of qualifying samples.
//!
//! Detection gates, in order, per sample:
//!
//! 1. Debounce: nothing is evaluated within [`DEBOUNCE_WINDOW`] of the last
//!    arm, nor before the post-fire cooldown deadline has passed.
//! 2. Orientation: samples taken outside the landscape hold are ignored
//!    entirely (device flat on a table or held upright).
//! 3. Neutral release: after a fire, the device must be seen back near level
//!    before the next gesture can even begin.
//! 4. Classification: absolute z past [`TILT_THRESHOLD`] AND a same-direction
//!    first difference past half the threshold. Position alone is a device
//!    resting tilted; the delta term demands an active motion.
//!
//! Time never comes from the wall clock here; it rides in on each sample's
//! timestamp. That keeps the whole state machine a pure function of its input
//! sequence, so every property is testable without a sensor or a sleep.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::sensors::AccelSample;

/// Minimum |z| (in g) to consider the device tilted off-axis.
pub const TILT_THRESHOLD: f64 = 0.5;
/// Maximum |z| to consider the device back at center.
pub const NEUTRAL_THRESHOLD: f64 = 0.2;
/// Minimum |x| for the landscape hold: the long axis carries gravity.
pub const HORIZONTAL_X_MIN: f64 = 0.7;
/// Maximum |y| for the landscape hold.
pub const HORIZONTAL_Y_MAX: f64 = 1.0;
/// Minimum seconds between the start of successive gesture evaluations.
pub const DEBOUNCE_WINDOW: f64 = 1.0;
/// Seconds after a fire before a new gesture may begin processing.
pub const PROCESSING_COOLDOWN: f64 = 0.6;
/// Sensor push rate requested from the source.
pub const SAMPLE_INTERVAL_MS: u64 = 100;

/// The two recognizable gesture outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiltEvent {
    Up,
    Down,
}

/// Per-observation gesture state. Created when observation starts, discarded
/// when it stops; never persists across sessions.
pub struct TiltDetector {
    /// Time of the last arm (neutral release), or detector creation time.
    last_event_at: f64,
    /// Deadline before which no new gesture may begin processing. Replaces a
    /// cancellable cooldown timer with a plain comparison against sample time.
    processing_until: f64,
    /// True from a fire until the device is seen back at center.
    waiting_for_neutral: bool,
    /// Previous accepted z reading, the first-difference baseline.
    last_z: f64,
}

impl TiltDetector {
    pub fn new(started_at: f64) -> Self {
        Self {
            last_event_at: started_at,
            processing_until: started_at,
            waiting_for_neutral: false,
            last_z: 0.0,
        }
    }

    /// True while the post-fire cooldown deadline has not passed.
    pub fn is_processing(&self, now: f64) -> bool {
        now < self.processing_until
    }

    pub fn is_waiting_for_neutral(&self) -> bool {
        self.waiting_for_neutral
    }

    fn is_landscape_hold(x: f64, y: f64) -> bool {
        y.abs() < HORIZONTAL_Y_MAX && x.abs() > HORIZONTAL_X_MIN
    }

    /// Evaluate one sample, returning at most one gesture event.
    ///
    /// The armed state (`waiting_for_neutral`, cooldown deadline) is committed
    /// before the event is returned, so a consumer that panics on the event
    /// cannot leave the detector able to double-fire.
    pub fn process(&mut self, sample: &AccelSample) -> Option<TiltEvent> {
        let now = sample.timestamp;

        if now - self.last_event_at < DEBOUNCE_WINDOW || now < self.processing_until {
            return None;
        }

        if !Self::is_landscape_hold(sample.x, sample.y) {
            return None;
        }

        if self.waiting_for_neutral {
            if sample.z.abs() < NEUTRAL_THRESHOLD {
                // Back at center: release the gesture and restart the debounce
                // window from here, not from the fire. The release sample
                // still refreshes the z baseline below; it can never classify
                // itself since the release and tilt bands are disjoint.
                self.waiting_for_neutral = false;
                self.last_event_at = now;
            } else {
                return None;
            }
        }

        let z_delta = sample.z - self.last_z;
        self.last_z = sample.z;

        let event = if sample.z < -TILT_THRESHOLD && z_delta < -TILT_THRESHOLD / 2.0 {
            TiltEvent::Up
        } else if sample.z > TILT_THRESHOLD && z_delta > TILT_THRESHOLD / 2.0 {
            TiltEvent::Down
        } else {
            return None;
        };

        self.waiting_for_neutral = true;
        self.processing_until = now + PROCESSING_COOLDOWN;
        debug!(
            "{:?} detected: z={:.2} z_delta={:.2}",
            event, sample.z, z_delta
        );
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: f64 = 1000.0;

    /// Detector whose debounce window has already elapsed at t=START.
    fn armed_detector() -> TiltDetector {
        TiltDetector::new(START - DEBOUNCE_WINDOW)
    }

    fn level(t: f64) -> AccelSample {
        AccelSample::new(t, 0.8, 0.1, 0.0)
    }

    fn tilted(t: f64, z: f64) -> AccelSample {
        AccelSample::new(t, 0.8, 0.1, z)
    }

    #[test]
    fn test_single_tilt_up_fires_once() {
        let mut detector = armed_detector();
        assert_eq!(detector.process(&level(START)), None);
        assert_eq!(detector.process(&tilted(START + 0.1, -0.6)), Some(TiltEvent::Up));

        // The rest of the same physical motion: deeper excursion, then back.
        assert_eq!(detector.process(&tilted(START + 0.2, -0.9)), None);
        assert_eq!(detector.process(&tilted(START + 0.3, -0.9)), None);
        assert_eq!(detector.process(&tilted(START + 0.4, -0.4)), None);
    }

    #[test]
    fn test_tilt_down_symmetric() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        assert_eq!(detector.process(&tilted(START + 0.1, 0.7)), Some(TiltEvent::Down));
    }

    #[test]
    fn test_cooldown_window_tracks_deadline() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        detector.process(&tilted(START + 0.1, -0.6));

        assert!(detector.is_processing(START + 0.1));
        assert!(detector.is_processing(START + 0.1 + PROCESSING_COOLDOWN - 0.01));
        assert!(!detector.is_processing(START + 0.1 + PROCESSING_COOLDOWN));
    }

    #[test]
    fn test_orientation_gate_rejects_non_landscape() {
        let mut detector = armed_detector();

        // |y| >= 1.0: not held sideways, no matter how hard z swings.
        for i in 0..20 {
            let t = START + 0.1 * i as f64;
            let z = if i % 2 == 0 { -0.9 } else { 0.9 };
            let sample = AccelSample::new(t, 0.8, 1.2, z);
            assert_eq!(detector.process(&sample), None);
        }

        // |x| <= 0.7: flat on a table.
        for i in 0..20 {
            let t = START + 2.0 + 0.1 * i as f64;
            let sample = AccelSample::new(t, 0.1, 0.0, -0.9);
            assert_eq!(detector.process(&sample), None);
        }
    }

    #[test]
    fn test_neutral_release_required_between_gestures() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        assert_eq!(detector.process(&tilted(START + 0.1, -0.6)), Some(TiltEvent::Up));

        // Down-qualifying samples arrive, but the gesture was never released.
        let mut t = START + 1.2;
        for _ in 0..10 {
            assert_eq!(detector.process(&tilted(t, 0.8)), None);
            t += 0.1;
        }
        assert!(detector.is_waiting_for_neutral());

        // Release at center, wait out the refreshed window, then down fires.
        assert_eq!(detector.process(&level(t)), None);
        assert!(!detector.is_waiting_for_neutral());
        t += DEBOUNCE_WINDOW;
        assert_eq!(detector.process(&level(t)), None);
        assert_eq!(detector.process(&tilted(t + 0.1, 0.7)), Some(TiltEvent::Down));
    }

    #[test]
    fn test_release_restarts_debounce_window() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        assert_eq!(detector.process(&tilted(START + 0.1, -0.6)), Some(TiltEvent::Up));

        // Released 0.9s after the fire; a new tilt 0.2s later is still inside
        // the restarted window and must be suppressed.
        let release = START + 1.1;
        assert_eq!(detector.process(&level(release)), None);
        assert_eq!(detector.process(&tilted(release + 0.2, -0.8)), None);

        // Past the window the same motion is accepted again.
        assert_eq!(detector.process(&level(release + DEBOUNCE_WINDOW)), None);
        assert_eq!(
            detector.process(&tilted(release + DEBOUNCE_WINDOW + 0.1, -0.8)),
            Some(TiltEvent::Up)
        );
    }

    #[test]
    fn test_resting_tilted_does_not_fire() {
        let mut detector = armed_detector();
        detector.process(&level(START));

        // Creep past the position threshold in small steps: every delta stays
        // under the motion threshold, so no sample classifies.
        let mut t = START + 0.1;
        for z in [-0.2, -0.4, -0.55, -0.6, -0.62] {
            assert_eq!(detector.process(&tilted(t, z)), None);
            t += 0.1;
        }

        // Holding there produces zero deltas forever.
        for _ in 0..20 {
            assert_eq!(detector.process(&tilted(t, -0.62)), None);
            t += 0.1;
        }
    }

    #[test]
    fn test_delta_without_position_does_not_fire() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        // A 0.4g jerk that never crosses the position threshold.
        assert_eq!(detector.process(&tilted(START + 0.1, -0.4)), None);
    }

    #[test]
    fn test_two_sample_stream_fires_single_up() {
        // Two-sample stream 100ms apart, debounce elapsed: exactly one Up,
        // processing true right after, false again 600ms later.
        let mut detector = TiltDetector::new(START - 1.0);
        let mut events = Vec::new();

        for sample in [
            AccelSample::new(START, 0.8, 0.1, 0.0),
            AccelSample::new(START + 0.1, 0.8, 0.1, -0.6),
        ] {
            if let Some(event) = detector.process(&sample) {
                events.push(event);
            }
        }

        assert_eq!(events, vec![TiltEvent::Up]);
        assert!(detector.is_processing(START + 0.1));
        assert!(!detector.is_processing(START + 0.7));
    }

    #[test]
    fn test_repeat_stream_within_one_second_fires_once() {
        // The same stream fed twice inside one second produces one event.
        let mut detector = TiltDetector::new(START - 1.0);
        let mut fired = 0;

        let stream = [
            AccelSample::new(START, 0.8, 0.1, 0.0),
            AccelSample::new(START + 0.1, 0.8, 0.1, -0.6),
            AccelSample::new(START + 0.2, 0.8, 0.1, 0.0),
            AccelSample::new(START + 0.3, 0.8, 0.1, -0.6),
        ];
        for sample in &stream {
            if detector.process(sample).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_quiet_before_debounce_elapses() {
        // A fresh detector ignores everything until DEBOUNCE_WINDOW has
        // passed since creation.
        let mut detector = TiltDetector::new(START);
        assert_eq!(detector.process(&tilted(START + 0.5, -0.9)), None);
        assert_eq!(detector.process(&tilted(START + 0.9, 0.9)), None);
        // Rejected samples never touched the z baseline; once the window
        // elapses the next motion classifies normally.
        assert_eq!(detector.process(&level(START + 1.1)), None);
        assert_eq!(detector.process(&tilted(START + 1.2, -0.8)), Some(TiltEvent::Up));
    }

    #[test]
    fn test_non_landscape_samples_do_not_release_neutral() {
        let mut detector = armed_detector();
        detector.process(&level(START));
        assert_eq!(detector.process(&tilted(START + 0.1, -0.6)), Some(TiltEvent::Up));

        // A level z reading while NOT in the landscape hold must not re-arm.
        let flat = AccelSample::new(START + 1.2, 0.1, 0.0, 0.0);
        assert_eq!(detector.process(&flat), None);
        assert!(detector.is_waiting_for_neutral());
    }
}
