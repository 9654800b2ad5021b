//! Status LED blink policy.
//!
//! - 250 ms : device not mounted
//! - 1000 ms: device mounted
//! - 2500 ms: bus suspended

use crate::config::{BLINK_MOUNTED_MS, BLINK_NOT_MOUNTED_MS, BLINK_SUSPENDED_MS};
use crate::cycle::{IntervalGate, LinkState};

/// Toggle period for a link state.
pub fn blink_interval_ms(state: LinkState) -> u32 {
    match state {
        LinkState::NotMounted => BLINK_NOT_MOUNTED_MS,
        LinkState::Mounted => BLINK_MOUNTED_MS,
        LinkState::Suspended => BLINK_SUSPENDED_MS,
    }
}

/// Square-wave generator for the status LED.
pub struct Blinker {
    state: LinkState,
    gate: IntervalGate,
    lit: bool,
}

impl Default for Blinker {
    fn default() -> Self {
        Self::new()
    }
}

impl Blinker {
    pub const fn new() -> Self {
        Self {
            state: LinkState::NotMounted,
            gate: IntervalGate::new(BLINK_NOT_MOUNTED_MS),
            lit: false,
        }
    }

    /// Switch the blink pattern. The new period starts from the next toggle.
    pub fn set_state(&mut self, state: LinkState) {
        if state != self.state {
            self.state = state;
            self.gate = IntervalGate::new(blink_interval_ms(state));
        }
    }

    /// Returns the new LED level when it is time to toggle.
    pub fn tick(&mut self, now_ms: u32) -> Option<bool> {
        if !self.gate.due(now_ms) {
            return None;
        }
        let level = self.lit;
        self.lit = !self.lit;
        Some(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intervals_per_state() {
        assert_eq!(blink_interval_ms(LinkState::NotMounted), 250);
        assert_eq!(blink_interval_ms(LinkState::Mounted), 1000);
        assert_eq!(blink_interval_ms(LinkState::Suspended), 2500);
    }

    #[test]
    fn blinker_toggles_on_period() {
        let mut b = Blinker::new();
        assert_eq!(b.tick(0), Some(false));
        assert_eq!(b.tick(100), None);
        assert_eq!(b.tick(250), Some(true));
        assert_eq!(b.tick(499), None);
        assert_eq!(b.tick(500), Some(false));
    }

    #[test]
    fn state_change_restarts_period() {
        let mut b = Blinker::new();
        b.tick(0);
        b.set_state(LinkState::Mounted);
        assert_eq!(b.tick(10), Some(true));
        assert_eq!(b.tick(900), None);
        assert_eq!(b.tick(1010), Some(false));

        // Same state again keeps the running period.
        b.set_state(LinkState::Mounted);
        assert_eq!(b.tick(1500), None);
    }
}
