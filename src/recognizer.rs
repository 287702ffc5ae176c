//! Observation wiring: a [`TiltDetector`] driven by a live sensor source,
//! reporting gestures through a pair of caller-supplied callbacks.
//!
//! Callbacks run synchronously under one lock around "process one sample", so
//! sample evaluation is serialized even when the source delivers from its own
//! task or thread. The same lock is what makes [`StopHandle::stop`] a hard
//! cutoff: once it returns, no callback is running and none will fire.

use std::sync::{Arc, Mutex};

use crate::sensors::{current_timestamp, SensorError, SensorSource, Subscription};
use crate::tilt::{TiltDetector, TiltEvent, SAMPLE_INTERVAL_MS};

type GestureCallback = Box<dyn FnMut() + Send + 'static>;

struct Observer {
    detector: TiltDetector,
    on_tilt_up: GestureCallback,
    on_tilt_down: GestureCallback,
    stopped: bool,
}

pub struct TiltRecognizer;

impl TiltRecognizer {
    /// Start consuming `source` and invoke exactly one of the callbacks per
    /// recognized gesture. Returns a handle that ends observation.
    ///
    /// The recognizer holds no game state; invoking the callback is its only
    /// side effect. A source that never delivers simply never fires.
    pub fn observe<S: SensorSource>(
        source: &mut S,
        on_tilt_up: impl FnMut() + Send + 'static,
        on_tilt_down: impl FnMut() + Send + 'static,
    ) -> Result<StopHandle, SensorError> {
        source.set_sample_interval(SAMPLE_INTERVAL_MS);

        let observer = Arc::new(Mutex::new(Observer {
            detector: TiltDetector::new(current_timestamp()),
            on_tilt_up: Box::new(on_tilt_up),
            on_tilt_down: Box::new(on_tilt_down),
            stopped: false,
        }));

        let shared = observer.clone();
        let subscription = source.subscribe(Box::new(move |sample| {
            let mut observer = match shared.lock() {
                Ok(guard) => guard,
                // A callback panicked mid-sample; the detector already holds
                // its armed state, and we deliver nothing further.
                Err(_) => return,
            };
            if observer.stopped {
                return;
            }
            match observer.detector.process(&sample) {
                Some(TiltEvent::Up) => (observer.on_tilt_up)(),
                Some(TiltEvent::Down) => (observer.on_tilt_down)(),
                None => {}
            }
        }))?;

        Ok(StopHandle {
            observer,
            subscription,
        })
    }
}

/// Ends an observation. Dropping the handle without calling [`stop`] leaves
/// observation running for the life of the source.
///
/// [`stop`]: StopHandle::stop
pub struct StopHandle {
    observer: Arc<Mutex<Observer>>,
    subscription: Subscription,
}

impl StopHandle {
    /// Unsubscribe from the source and discard in-flight gesture state.
    /// Idempotent; safe to call mid-gesture. No callback fires after this
    /// returns: taking the observer lock waits out any callback currently
    /// executing, and later samples see the stopped flag.
    pub fn stop(&self) {
        if let Ok(mut observer) = self.observer.lock() {
            observer.stopped = true;
        }
        self.subscription.unsubscribe();
    }
}
