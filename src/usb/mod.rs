//! USB Device subsystem - presents the controller as a HID joystick.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb` with a single HID interface (no report IDs, 5-byte
//! input reports).
//!
//! The report cycle hands finished reports over through a latest-value
//! signal; the writer task pushes whatever is newest to the endpoint.

pub mod hid_device;
