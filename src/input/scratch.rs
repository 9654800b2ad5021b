//! Turntable ("scratch") decoding.
//!
//! The turntable sensor produces two offset phase signals. The decoder
//! samples them every report cycle, without debouncing, and moves a
//! one-byte position counter by one step whenever phase A changes:
//!
//! | A changed | A == B after the change | Step |
//! |-----------|-------------------------|------|
//! | no        | -                       |  0   |
//! | yes       | yes                     | +1   |
//! | yes       | no                      | -1   |
//!
//! This is not a full Gray-code state table: phase B is only looked at on
//! an A edge. At a 1 ms sampling period the turntable cannot move far
//! enough between samples for that to matter.
//!
//! A [`DirectionClassifier`] turns the counter into a three-state
//! direction that falls back to idle after [`SCRATCH_IDLE_CHECKS`]
//! unchanged checks.

use crate::config::{SCRATCH_CLASSIFY_INTERVAL_MS, SCRATCH_IDLE_CHECKS};
use crate::cycle::IntervalGate;

/// Turntable position counter.
///
/// Invariant: arithmetic is modulo 256. The counter is sent as a single
/// byte, so 255 + 1 wraps to 0 and is still forward motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position(u8);

impl Position {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw counter byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Apply a decoder step; only the low byte of the sum is kept.
    pub const fn step(self, delta: i8) -> Self {
        Self(self.0.wrapping_add_signed(delta))
    }

    /// Counter as a zero-centred axis: 128 -> 0, 0 -> -128, 255 -> 127.
    pub const fn centered(self) -> i8 {
        self.0.wrapping_sub(128) as i8
    }

    /// Signed distance travelled from `earlier` to `self`.
    ///
    /// The forward difference is read as a two's-complement byte: 1..=127
    /// is forward, 128..=255 is backward.
    pub const fn since(self, earlier: Position) -> i8 {
        self.0.wrapping_sub(earlier.0) as i8
    }
}

/// Discrete turntable direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Negative,
    #[default]
    Idle,
    Positive,
}

impl Direction {
    /// Direction of a signed position change; `None` for no change.
    pub fn of_change(delta: i8) -> Option<Self> {
        match delta {
            0 => None,
            d if d > 0 => Some(Direction::Positive),
            _ => Some(Direction::Negative),
        }
    }

    /// Quantised axis value: -128, 0 or 127.
    pub const fn axis_value(self) -> i8 {
        match self {
            Direction::Negative => i8::MIN,
            Direction::Idle => 0,
            Direction::Positive => i8::MAX,
        }
    }
}

/// One decoder step from the current phases and the previous phase A.
///
/// Phases are logical (asserted = `true`).
pub fn decode_step(phase_a: bool, phase_b: bool, prev_a: bool) -> i8 {
    if phase_a == prev_a {
        0
    } else if phase_a == phase_b {
        1
    } else {
        -1
    }
}

/// Phase decoder feeding the position counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScratchDecoder {
    prev_a: Option<bool>,
    position: Position,
}

impl ScratchDecoder {
    pub const fn new() -> Self {
        Self {
            prev_a: None,
            position: Position::new(0),
        }
    }

    /// Feed one pair of logical phase samples; returns the step applied.
    ///
    /// The first sample only primes the previous phase A.
    pub fn tick(&mut self, phase_a: bool, phase_b: bool) -> i8 {
        let delta = match self.prev_a {
            Some(prev_a) => decode_step(phase_a, phase_b, prev_a),
            None => 0,
        };
        self.prev_a = Some(phase_a);
        self.position = self.position.step(delta);
        delta
    }

    pub fn position(&self) -> Position {
        self.position
    }
}

/// Hysteresis classifier from position counter to [`Direction`].
///
/// Any change snaps straight to the direction of travel; only a run of
/// [`SCRATCH_IDLE_CHECKS`] checks without a change returns it to idle, so
/// a short pause mid-scratch does not chatter through zero.
#[derive(Clone, Copy, Debug)]
pub struct DirectionClassifier {
    direction: Direction,
    last_seen: Position,
    unchanged_checks: u16,
    last_motion_ms: Option<u32>,
}

impl Default for DirectionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectionClassifier {
    pub const fn new() -> Self {
        Self {
            direction: Direction::Idle,
            last_seen: Position::new(0),
            unchanged_checks: 0,
            last_motion_ms: None,
        }
    }

    /// Compare `position` with the previous check and update the direction.
    ///
    /// A change of exactly half a turn (128) is ambiguous; it is read as a
    /// wrap, so it counts as forward when the counter fell numerically and
    /// backward when it rose.
    pub fn classify(&mut self, position: Position, now_ms: u32) -> Direction {
        let change = match position.since(self.last_seen) {
            i8::MIN if position.raw() < self.last_seen.raw() => i8::MAX,
            d => d,
        };
        match Direction::of_change(change) {
            Some(direction) => {
                #[cfg(feature = "defmt")]
                if direction != self.direction {
                    defmt::trace!("scratch: {} -> {}", self.direction, direction);
                }
                self.direction = direction;
                self.unchanged_checks = 0;
                self.last_motion_ms = Some(now_ms);
            }
            None => {
                self.unchanged_checks = self.unchanged_checks.saturating_add(1);
                if self.unchanged_checks >= SCRATCH_IDLE_CHECKS {
                    self.direction = Direction::Idle;
                }
            }
        }
        self.last_seen = position;
        self.direction
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// When the counter last moved, if it ever has.
    pub fn last_motion_ms(&self) -> Option<u32> {
        self.last_motion_ms
    }
}

/// The turntable: decoder plus rate-limited direction classification.
#[derive(Clone, Copy, Debug)]
pub struct ScratchAxis {
    decoder: ScratchDecoder,
    classifier: DirectionClassifier,
    classify_gate: IntervalGate,
}

impl Default for ScratchAxis {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchAxis {
    pub const fn new() -> Self {
        Self {
            decoder: ScratchDecoder::new(),
            classifier: DirectionClassifier::new(),
            classify_gate: IntervalGate::new(SCRATCH_CLASSIFY_INTERVAL_MS),
        }
    }

    /// Sample the phase pins (electrical levels, active-low).
    pub fn sample(&mut self, a_high: bool, b_high: bool, now_ms: u32) {
        self.decoder.tick(!a_high, !b_high);
        if self.classify_gate.due(now_ms) {
            self.classifier.classify(self.decoder.position(), now_ms);
        }
    }

    pub fn position(&self) -> Position {
        self.decoder.position()
    }

    pub fn direction(&self) -> Direction {
        self.classifier.direction()
    }

    pub fn last_motion_ms(&self) -> Option<u32> {
        self.classifier.last_motion_ms()
    }
}
