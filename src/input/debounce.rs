//! Edge-holdoff debouncing for the button channels.
//!
//! A channel accepts a new level only when it differs from the stable one
//! and at least [`DEBOUNCE_MS`] have passed since the last accepted
//! transition. Raw samples are not averaged: once the window reopens a
//! single differing sample flips the output.
//!
//! ```text
//! raw     ‾‾‾|_|‾|___________|‾|_|‾‾‾‾‾‾‾
//! stable  ‾‾‾|_______________|‾‾‾‾‾‾‾‾‾‾‾
//!            <-20 ms->       <-20 ms->
//! ```

use crate::config::{BUTTON_COUNT, DEBOUNCE_MS};
use crate::input::Button;

/// Debounce state of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    /// Last accepted electrical level (`true` = high = released).
    stable_high: bool,
    /// When `stable_high` last changed; `None` until the first transition.
    changed_at_ms: Option<u32>,
}

impl Debouncer {
    /// Seed a channel with its power-on level.
    ///
    /// The first transition after power-on is accepted without holdoff.
    pub const fn new(initial_high: bool) -> Self {
        Self {
            stable_high: initial_high,
            changed_at_ms: None,
        }
    }

    /// Feed one raw sample taken at `now_ms`; returns the stable level.
    pub fn update(&mut self, raw_high: bool, now_ms: u32) -> bool {
        if raw_high != self.stable_high && self.window_open(now_ms) {
            self.stable_high = raw_high;
            self.changed_at_ms = Some(now_ms);
        }
        self.stable_high
    }

    /// Current stable level.
    pub fn stable_high(&self) -> bool {
        self.stable_high
    }

    fn window_open(&self, now_ms: u32) -> bool {
        match self.changed_at_ms {
            Some(at) => now_ms.wrapping_sub(at) >= DEBOUNCE_MS,
            None => true,
        }
    }
}

/// Debounce state for every button channel.
#[derive(Clone, Debug)]
pub struct DebounceBank {
    channels: [Debouncer; BUTTON_COUNT],
}

impl DebounceBank {
    /// Seed every channel from its power-on level.
    pub fn new(initial_high: [bool; BUTTON_COUNT]) -> Self {
        Self {
            channels: initial_high.map(Debouncer::new),
        }
    }

    /// Debounce one channel; returns its stable level.
    pub fn update(&mut self, button: Button, raw_high: bool, now_ms: u32) -> bool {
        self.channels[button.index()].update(raw_high, now_ms)
    }

    /// Stable level of one channel.
    pub fn stable_high(&self, button: Button) -> bool {
        self.channels[button.index()].stable_high()
    }

    /// Stable levels of all channels, in channel order.
    pub fn levels(&self) -> [bool; BUTTON_COUNT] {
        self.channels.map(|c| c.stable_high())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_transition_has_no_holdoff() {
        let mut d = Debouncer::new(true);
        assert!(!d.update(false, 3));
    }

    #[test]
    fn bounce_inside_window_is_held_off() {
        let mut d = Debouncer::new(true);
        assert!(!d.update(false, 100));
        // Contact bounce right after the press.
        assert!(!d.update(true, 101));
        assert!(!d.update(true, 119));
        assert!(!d.update(false, 119));
    }

    #[test]
    fn window_reopens_after_debounce_duration() {
        let mut d = Debouncer::new(true);
        d.update(false, 100);
        assert!(d.update(true, 120));
        // And closes again behind the new edge.
        assert!(d.update(false, 139));
        assert!(!d.update(false, 140));
    }

    #[test]
    fn steady_level_never_moves_timestamp() {
        let mut d = Debouncer::new(true);
        d.update(false, 100);
        for t in 101..500 {
            assert!(!d.update(false, t));
        }
        // Held far longer than the window: release is immediate.
        assert!(d.update(true, 500));
    }

    #[test]
    fn clock_wrap_still_measures_elapsed_time() {
        let mut d = Debouncer::new(true);
        d.update(false, u32::MAX - 5);
        assert!(!d.update(true, 10)); // 16 ms later
        assert!(d.update(true, 14)); // 20 ms later
    }

    #[test]
    fn bank_tracks_channels_independently() {
        let mut bank = DebounceBank::new([true; BUTTON_COUNT]);
        bank.update(Button::Key1, false, 50);
        assert!(!bank.update(Button::Key1, true, 55));
        assert!(!bank.update(Button::Key2, false, 55));

        let levels = bank.levels();
        assert!(!levels[0]);
        assert!(!levels[1]);
        assert!(levels[2..].iter().all(|&high| high));
        assert!(bank.stable_high(Button::Select));
    }
}
