//! Unified error type for xac-joystick.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! The input and report core never fails; these errors only surface at
//! board bring-up and at the USB endpoint.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Board
    /// A pin table names the same GPIO twice.
    PinConflict(u8),

    /// A pin table names a GPIO the chip does not have.
    PinOutOfRange(u8),

    /// An Embassy task could not be spawned (pool exhausted).
    Spawn,

    // USB
    /// USB endpoint write failed.
    Usb(UsbError),

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Subset of endpoint errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbError {
    /// The endpoint is disabled (cable pulled, host reset the bus).
    Disabled,
    /// The report did not fit the endpoint's packet size.
    BufferOverflow,
}

// Convenience conversions

impl From<UsbError> for Error {
    fn from(e: UsbError) -> Self {
        Error::Usb(e)
    }
}
