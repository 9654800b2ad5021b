//! xac-joystick firmware entry point (nRF52840).
//!
//! Task layout on the single-threaded Embassy executor:
//!
//! - `usb_device`   - enumeration, suspend/resume, remote wakeup
//! - `hid_writer`   - pushes the newest report to the HID endpoint
//! - `report_cycle` - 1 ms sample/debounce/decode/assemble cycle
//! - `status_led`   - link state blink pattern
//!
//! No task blocks; each one awaits its own timer or signal.

#![no_std]
#![no_main]

mod board;
mod usb;

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Level, Output};
use embassy_time::{Duration, Instant, Ticker, Timer};
use panic_probe as _;
use usb::hid_device::{self, UsbDriver, UsbSink};
use xac_joystick::status::Blinker;
use xac_joystick::{config, Controller, Delivery, Error};

/// How often the status LED task re-reads the link state (ms).
const STATUS_POLL_MS: u64 = 10;

/// Pull-up settling time before the boot-time input sample (ms).
const PULLUP_SETTLE_MS: u64 = 1;

fn now_ms() -> u32 {
    // Truncation is fine: every interval compared is far below 2^32 ms.
    Instant::now().as_millis() as u32
}

#[embassy_executor::task]
async fn usb_device(device: embassy_usb::UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_writer(writer: embassy_usb::class::hid::HidWriter<'static, UsbDriver, 8>) -> ! {
    hid_device::hid_writer_task(writer).await
}

#[embassy_executor::task]
async fn report_cycle(mut inputs: board::BoardInputs) -> ! {
    Timer::after(Duration::from_millis(PULLUP_SETTLE_MS)).await;

    let mut controller = Controller::boot(&mut inputs);
    let mut sink = UsbSink;
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(config::REPORT_INTERVAL_MS)));

    loop {
        if let Some(outcome) = controller.poll(now_ms(), &mut inputs, &mut sink) {
            if outcome.delivery == Delivery::WakeRequested {
                info!("Input while suspended - waking host");
            }
        }
        ticker.next().await;
    }
}

#[embassy_executor::task]
async fn status_led(mut led: Output<'static>) -> ! {
    let mut blinker = Blinker::new();
    let mut ticker = Ticker::every(Duration::from_millis(STATUS_POLL_MS));

    loop {
        blinker.set_state(hid_device::link_state());
        if let Some(lit) = blinker.tick(now_ms()) {
            led.set_level(Level::from(lit));
        }
        ticker.next().await;
    }
}

fn start(spawner: Spawner) -> Result<(), Error> {
    let board = board::init(&config::PIN_LAYOUT)?;
    let usb = hid_device::init(board.usbd);

    spawner
        .spawn(usb_device(usb.device))
        .map_err(|_| Error::Spawn)?;
    spawner
        .spawn(hid_writer(usb.writer))
        .map_err(|_| Error::Spawn)?;
    spawner
        .spawn(report_cycle(board.inputs))
        .map_err(|_| Error::Spawn)?;
    spawner
        .spawn(status_led(board.status_led))
        .map_err(|_| Error::Spawn)?;

    Ok(())
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("xac-joystick starting");

    if let Err(e) = start(spawner) {
        error!("Startup failed: {}", e);
    }
}
