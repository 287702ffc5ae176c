//! Round state: score, countdown, and word rotation.
//!
//! The session is deliberately clock-free; the game loop feeds it one `tick`
//! per elapsed second and gesture outcomes as they arrive, so every rule is
//! testable without timers.

use thiserror::Error;

use crate::rng::XorShiftRng;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("round length must be 30, 60 or 120 seconds, got {0}")]
    InvalidTimeOption(u64),
    #[error("word list is empty")]
    EmptyWordList,
}

/// Allowed round lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOption {
    ThirtySeconds,
    SixtySeconds,
    TwoMinutes,
}

impl TimeOption {
    pub fn seconds(self) -> u64 {
        match self {
            TimeOption::ThirtySeconds => 30,
            TimeOption::SixtySeconds => 60,
            TimeOption::TwoMinutes => 120,
        }
    }
}

impl TryFrom<u64> for TimeOption {
    type Error = GameError;

    fn try_from(seconds: u64) -> Result<Self, Self::Error> {
        match seconds {
            30 => Ok(TimeOption::ThirtySeconds),
            60 => Ok(TimeOption::SixtySeconds),
            120 => Ok(TimeOption::TwoMinutes),
            other => Err(GameError::InvalidTimeOption(other)),
        }
    }
}

/// One playthrough: a word list, a countdown, and a score.
pub struct GameSession {
    words: Vec<String>,
    current: usize,
    score: u32,
    time_left: u64,
    rng: XorShiftRng,
    over: bool,
}

impl GameSession {
    pub fn new(words: Vec<String>, time: TimeOption, seed: u64) -> Result<Self, GameError> {
        if words.is_empty() {
            return Err(GameError::EmptyWordList);
        }
        let mut session = Self {
            words,
            current: 0,
            score: 0,
            time_left: time.seconds(),
            rng: XorShiftRng::seeded(seed),
            over: false,
        };
        session.next_word();
        Ok(session)
    }

    pub fn current_word(&self) -> &str {
        &self.words[self.current]
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Player got the word: one point, rotate to the next word.
    pub fn mark_correct(&mut self) {
        if self.over {
            return;
        }
        self.score += 1;
        self.next_word();
    }

    /// Player passed: no point, rotate to the next word.
    pub fn skip(&mut self) {
        if self.over {
            return;
        }
        self.next_word();
    }

    /// One second elapsed. The round ends when the countdown reaches zero.
    pub fn tick(&mut self) {
        if self.over {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.over = true;
        }
    }

    fn next_word(&mut self) {
        self.current = self.rng.next_range(self.words.len());
    }
}
