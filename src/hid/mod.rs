//! HID report assembly - stable button levels and the turntable in,
//! finished [`JoystickReport`] out.

pub mod joystick;


pub use joystick::{JoystickReport, JOYSTICK_REPORT_DESCRIPTOR, JOYSTICK_REPORT_SIZE};

use crate::config::BUTTON_COUNT;
use crate::input::scratch::{Direction, Position};
use crate::input::Button;

/// How the turntable is reported, latched once at boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScratchMode {
    /// Position counter on the X axis.
    #[default]
    Analog,
    /// Direction on the Y axis as -128 / 0 / 127.
    Digital,
}

impl ScratchMode {
    /// Pick the mode from the mode-select button's level at power-on:
    /// held (low) selects [`ScratchMode::Digital`].
    pub const fn latch(select_high_at_boot: bool) -> Self {
        if select_high_at_boot {
            ScratchMode::Analog
        } else {
            ScratchMode::Digital
        }
    }
}

/// Turntable state consumed by the report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScratchState {
    pub position: Position,
    pub direction: Direction,
}

/// Build one report.
///
/// `stable_high` holds the debounced electrical level per channel; a low
/// (pressed) button sets its bit. Only the axis chosen by `mode` carries
/// data, the other stays zero.
pub fn build_report(
    stable_high: &[bool; BUTTON_COUNT],
    scratch: ScratchState,
    mode: ScratchMode,
) -> JoystickReport {
    let mut report = JoystickReport::empty();

    for (button, &high) in Button::ALL.iter().zip(stable_high) {
        if !high {
            report.press(button.slot());
        }
    }

    match mode {
        ScratchMode::Analog => report.x = scratch.position.centered(),
        ScratchMode::Digital => report.y = scratch.direction.axis_value(),
    }

    report
}
