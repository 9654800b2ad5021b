//! Physical inputs - nine buttons and the turntable ("scratch").
//!
//! Every line is active-low with a pull-up: an electrically low pin is a
//! pressed button or an asserted scratch phase.
//!
//! ## Components
//!
//! - **Debounce**: per-button edge holdoff filter ([`debounce`])
//! - **Scratch**: phase decoder, position counter and direction
//!   classifier ([`scratch`])
//! - **Sources**: the [`InputSource`] capability the report cycle samples,
//!   with an `embedded-hal` implementation ([`PinInputs`])

pub mod debounce;
pub mod scratch;

use crate::config::{ButtonSlot, BUTTON_COUNT, BUTTON_SLOTS, MODE_SELECT_CHANNEL};
use embedded_hal::digital::InputPin;

/// Logical button channels, in pin-table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Start,
    Select,
}

impl Button {
    /// All channels, index-aligned with the pin table.
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::Key1,
        Button::Key2,
        Button::Key3,
        Button::Key4,
        Button::Key5,
        Button::Key6,
        Button::Key7,
        Button::Start,
        Button::Select,
    ];

    /// Channel held at boot to select the scratch mode.
    pub const MODE_SELECT: Button = Button::ALL[MODE_SELECT_CHANNEL];

    /// Channel index (0..9).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Where this button lands in the report.
    pub const fn slot(self) -> ButtonSlot {
        BUTTON_SLOTS[self.index()]
    }
}

/// Raw electrical levels of the controller's inputs.
///
/// Implemented by the board; sampling must not block and has no side
/// effects. `true` means electrically high (released / phase inactive).
pub trait InputSource {
    /// Level of one button pin.
    fn button_high(&mut self, button: Button) -> bool;

    /// Levels of the scratch phase pins as `(a, b)`.
    fn scratch_high(&mut self) -> (bool, bool);
}

/// [`InputSource`] over `embedded-hal` digital inputs.
///
/// A read error counts as the idle (high) level, so a faulty line reads
/// as a released button rather than a stuck press.
pub struct PinInputs<P> {
    keys: [P; BUTTON_COUNT],
    scratch_a: P,
    scratch_b: P,
}

impl<P: InputPin> PinInputs<P> {
    pub fn new(keys: [P; BUTTON_COUNT], scratch_a: P, scratch_b: P) -> Self {
        Self {
            keys,
            scratch_a,
            scratch_b,
        }
    }

    fn level(pin: &mut P) -> bool {
        pin.is_high().unwrap_or(true)
    }
}

impl<P: InputPin> InputSource for PinInputs<P> {
    fn button_high(&mut self, button: Button) -> bool {
        Self::level(&mut self.keys[button.index()])
    }

    fn scratch_high(&mut self) -> (bool, bool) {
        (
            Self::level(&mut self.scratch_a),
            Self::level(&mut self.scratch_b),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl InputPin for BrokenPin {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            Err(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn button_indices_follow_pin_table() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
        assert_eq!(Button::MODE_SELECT, Button::Select);
    }

    #[test]
    fn slots_match_report_layout() {
        assert_eq!(Button::Key1.slot(), ButtonSlot { group: 0, bit: 0 });
        assert_eq!(Button::Key7.slot(), ButtonSlot { group: 0, bit: 6 });
        assert_eq!(Button::Start.slot(), ButtonSlot { group: 1, bit: 0 });
        assert_eq!(Button::Select.slot(), ButtonSlot { group: 1, bit: 1 });
    }

    #[test]
    fn pin_inputs_read_levels() {
        let keys = core::array::from_fn(|i| FixedPin(i != 2));
        let mut inputs = PinInputs::new(keys, FixedPin(false), FixedPin(true));

        assert!(inputs.button_high(Button::Key1));
        assert!(!inputs.button_high(Button::Key3));
        assert_eq!(inputs.scratch_high(), (false, true));
    }

    #[test]
    fn read_errors_look_released() {
        let keys = core::array::from_fn(|_| BrokenPin);
        let mut inputs = PinInputs::new(keys, BrokenPin, BrokenPin);

        assert!(inputs.button_high(Button::Start));
        assert_eq!(inputs.scratch_high(), (true, true));
    }
}
