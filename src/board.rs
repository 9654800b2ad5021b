//! Board bring-up - clocks, input pins and the status LED.
//!
//! Pins are claimed by number from a [`PinLayout`] table so the two
//! controller wirings share one code path.

use defmt::info;
use embassy_nrf::config::{Config, HfclkSource};
use embassy_nrf::gpio::{AnyPin, Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::peripherals;
use xac_joystick::config::PinLayout;
use xac_joystick::{Error, PinInputs};

/// Input pins as the report cycle samples them.
pub type BoardInputs = PinInputs<Input<'static>>;

pub struct Board {
    pub inputs: BoardInputs,
    pub status_led: Output<'static>,
    pub usbd: peripherals::USBD,
}

/// Claim a GPIO by flat index.
///
/// # Safety
///
/// Each pin may be claimed once, and never through its typed singleton.
unsafe fn claim(pin: u8) -> AnyPin {
    AnyPin::steal(pin)
}

fn pulled_up(pin: u8) -> Input<'static> {
    // SAFETY: `init` validated the layout, so no pin is claimed twice, and
    // the typed GPIO singletons from `embassy_nrf::init` are dropped unused.
    Input::new(unsafe { claim(pin) }, Pull::Up)
}

pub fn init(layout: &PinLayout) -> Result<Board, Error> {
    layout.validate()?;

    // USB needs the external 32 MHz crystal.
    let mut config = Config::default();
    config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(config);

    let keys = layout.keys.map(pulled_up);
    let inputs = PinInputs::new(keys, pulled_up(layout.scratch_a), pulled_up(layout.scratch_b));

    // SAFETY: as above; the LED pin is distinct from every input.
    let led_pin = unsafe { claim(layout.status_led) };
    let status_led = Output::new(led_pin, Level::Low, OutputDrive::Standard);

    info!("Board ready: {}", layout);

    Ok(Board {
        inputs,
        status_led,
        usbd: p.USBD,
    })
}
