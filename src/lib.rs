//! Tilt-controlled word guessing game.
//!
//! A word is shown; the player holds the device to their forehead in
//! landscape and tilts it down for "got it" or up for "skip" until the round
//! timer runs out. The interesting part is [`tilt`]: a debounced gesture
//! recognizer that turns the noisy accelerometer stream into exactly one
//! discrete event per physical tilt motion.
//!
//! Layout:
//!
//! - [`sensors`]: sample type and push-based sources (simulated, stdin)
//! - [`tilt`]: the detection state machine, pure over sample timestamps
//! - [`recognizer`]: live observation with callbacks and a stop handle
//! - [`watchdog`]: notices when the sample stream goes quiet
//! - [`game`] / [`categories`]: round state and the word catalog
//! - [`session_log`]: record sessions to JSON, replay them offline

pub mod categories;
pub mod game;
pub mod recognizer;
pub mod rng;
pub mod sensors;
pub mod session_log;
pub mod tilt;
pub mod watchdog;

pub use recognizer::{StopHandle, TiltRecognizer};
pub use sensors::{AccelSample, SensorError, SensorSource, Subscription};
pub use tilt::{TiltDetector, TiltEvent};
