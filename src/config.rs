//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use crate::error::Error;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "xac-joystick";
pub const USB_PRODUCT: &str = "IIDX Controller (XAC)";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

/// Bus power requested in the configuration descriptor (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

// Input timing

/// Number of logical button channels.
pub const BUTTON_COUNT: usize = 9;

/// Minimum dwell between two accepted transitions of one button (ms).
pub const DEBOUNCE_MS: u32 = 20;

/// Minimum spacing between two report cycles (ms).
pub const REPORT_INTERVAL_MS: u32 = 1;

/// Minimum spacing between two scratch direction checks (ms).
pub const SCRATCH_CLASSIFY_INTERVAL_MS: u32 = 1;

/// Consecutive unchanged direction checks before the scratch reads idle.
///
/// Idle is set on the check that completes the count, not the one after it.
/// With one check per [`SCRATCH_CLASSIFY_INTERVAL_MS`] the decay takes
/// about 150 ms.
pub const SCRATCH_IDLE_CHECKS: u16 = 150;

/// Channel sampled once at boot to pick the scratch mode (SELECT).
pub const MODE_SELECT_CHANNEL: usize = 8;

// Status LED blink periods (ms)

pub const BLINK_NOT_MOUNTED_MS: u32 = 250;
pub const BLINK_MOUNTED_MS: u32 = 1000;
pub const BLINK_SUSPENDED_MS: u32 = 2500;

// GPIO pin assignments
//
// Pin numbers are flat nRF52840 GPIO indices (port * 32 + pin), so P0.11
// is 11 and P1.02 would be 34. Every input is active-low with the internal
// pull-up enabled.

/// Number of addressable GPIO lines (P0.00 - P1.15).
pub const GPIO_PIN_COUNT: u8 = 48;

/// One physical wiring of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinLayout {
    /// Button pins: keys 1-7, then START, then SELECT.
    pub keys: [u8; BUTTON_COUNT],
    /// Turntable phase A.
    pub scratch_a: u8,
    /// Turntable phase B.
    pub scratch_b: u8,
    /// Status LED (active-high).
    pub status_led: u8,
}

impl PinLayout {
    /// Every pin of the layout, buttons first.
    pub fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        self.keys
            .iter()
            .copied()
            .chain([self.scratch_a, self.scratch_b, self.status_led])
    }

    /// Reject tables that name a pin twice or address a missing pin.
    ///
    /// The board code claims pins straight from this table, so a duplicate
    /// would hand out the same GPIO to two drivers.
    pub fn validate(&self) -> Result<(), Error> {
        let mut seen: u64 = 0;
        for pin in self.pins() {
            if pin >= GPIO_PIN_COUNT {
                return Err(Error::PinOutOfRange(pin));
            }
            let bit = 1u64 << pin;
            if seen & bit != 0 {
                return Err(Error::PinConflict(pin));
            }
            seen |= bit;
        }
        Ok(())
    }
}

/// IIDX PS2 controller board.
pub const IIDX_PS2: PinLayout = PinLayout {
    keys: [5, 2, 8, 7, 6, 9, 10, 4, 3],
    scratch_a: 12,
    scratch_b: 11,
    status_led: 13,
};

/// Rainbow 2 Plus board.
pub const RAINBOW2PLUS: PinLayout = PinLayout {
    keys: [26, 13, 27, 14, 28, 15, 29, 10, 11],
    scratch_a: 9,
    scratch_b: 8,
    status_led: 6,
};

/// Wiring used by this build.
#[cfg(not(feature = "layout-rainbow2plus"))]
pub const PIN_LAYOUT: PinLayout = IIDX_PS2;
#[cfg(feature = "layout-rainbow2plus")]
pub const PIN_LAYOUT: PinLayout = RAINBOW2PLUS;

// Report mapping

/// Position of one button inside the report's button bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSlot {
    /// Byte-aligned button group (0..3).
    pub group: u8,
    /// Bit inside the group (0..8).
    pub bit: u8,
}

const fn slot(group: u8, bit: u8) -> ButtonSlot {
    ButtonSlot { group, bit }
}

/// Report slot per channel: keys 1-7 fill group 0, START/SELECT open group 1.
pub const BUTTON_SLOTS: [ButtonSlot; BUTTON_COUNT] = [
    slot(0, 0),
    slot(0, 1),
    slot(0, 2),
    slot(0, 3),
    slot(0, 4),
    slot(0, 5),
    slot(0, 6),
    slot(1, 0),
    slot(1, 1),
];
