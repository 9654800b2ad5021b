//! Host-testable core of the xac-joystick firmware.
//!
//! Everything that turns pin levels into HID reports lives here and has
//! no hardware dependency: debouncing, turntable decoding, report
//! assembly, the report cycle and the status LED policy.
//!
//! Usage: `cargo test` (no target or features needed)
//!
//! Note: The embedded binary (`src/main.rs`, feature `embedded`) owns the
//! nRF52840 peripherals and drives this library from Embassy tasks.

#![cfg_attr(not(test), no_std)]

// ═══════════════════════════════════════════════════════════════════════════
// Configuration & Errors
// ═══════════════════════════════════════════════════════════════════════════

pub mod config;
pub mod error;

// ═══════════════════════════════════════════════════════════════════════════
// Input → Report pipeline
// ═══════════════════════════════════════════════════════════════════════════

pub mod cycle;
pub mod hid;
pub mod input;
pub mod status;

pub use cycle::{Controller, CycleOutcome, Delivery, LinkState, ReportSink};
pub use error::Error;
pub use hid::{JoystickReport, ScratchMode};
pub use input::{Button, InputSource, PinInputs};
