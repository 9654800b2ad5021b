//! USB HID joystick report.
//!
//! Layout (5 bytes):
//! ```text
//! Byte 0: X axis (signed) - turntable position in analog mode
//! Byte 1: Y axis (signed) - turntable direction in digital mode
//! Byte 2: Buttons 1-8   (bit 0 = button 1)
//! Byte 3: Buttons 9-16
//! Byte 4: Buttons 17-24
//! ```

use crate::config::ButtonSlot;

/// Joystick report size in bytes.
pub const JOYSTICK_REPORT_SIZE: usize = 5;

/// Number of byte-aligned button groups.
pub const BUTTON_GROUPS: usize = 3;

/// Two-axis, 24-button joystick report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickReport {
    /// Primary axis (X).
    pub x: i8,
    /// Secondary axis (Y).
    pub y: i8,
    /// Button bitfield groups.
    pub buttons: [u8; BUTTON_GROUPS],
}

impl JoystickReport {
    /// Create a neutral (centred, all-released) report.
    pub const fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            buttons: [0; BUTTON_GROUPS],
        }
    }

    /// Set the bit for one button.
    pub fn press(&mut self, slot: ButtonSlot) {
        if let Some(group) = self.buttons.get_mut(usize::from(slot.group)) {
            *group |= 1 << (slot.bit & 7);
        }
    }

    /// Returns `true` if the button at `slot` is set.
    pub fn is_pressed(&self, slot: ButtonSlot) -> bool {
        self.buttons
            .get(usize::from(slot.group))
            .is_some_and(|group| group & (1 << (slot.bit & 7)) != 0)
    }

    /// Returns `true` if any button bit is set.
    pub fn has_pressed_buttons(&self) -> bool {
        self.buttons.iter().any(|&g| g != 0)
    }

    /// Report as it goes on the wire.
    pub fn to_bytes(&self) -> [u8; JOYSTICK_REPORT_SIZE] {
        [
            self.x as u8,
            self.y as u8,
            self.buttons[0],
            self.buttons[1],
            self.buttons[2],
        ]
    }

    /// Serialise into a byte slice for USB HID transmission.
    /// Returns the number of bytes written (0 if `buf` is too small).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        match buf.get_mut(..JOYSTICK_REPORT_SIZE) {
            Some(out) => {
                out.copy_from_slice(&self.to_bytes());
                JOYSTICK_REPORT_SIZE
            }
            None => 0,
        }
    }
}

// USB HID report descriptor

/// USB HID Report Descriptor for the joystick.
///
/// Two signed 8-bit axes followed by 24 one-bit buttons, no report ID,
/// so every input report is exactly [`JOYSTICK_REPORT_SIZE`] bytes.
pub const JOYSTICK_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    //   - X, Y axes -
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x15, 0x80, //   Logical Minimum (-128)
    0x25, 0x7F, //   Logical Maximum (127)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Buttons (24 bits) -
    0x05, 0x09, //   Usage Page (Buttons)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x18, //   Usage Maximum (Button 24)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x18, //   Report Count (24)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
