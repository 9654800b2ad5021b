//! USB HID joystick device.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral, exposes one HID endpoint and tracks the link state for
//! the report cycle and the status LED.

use core::sync::atomic::{AtomicU8, Ordering};

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{self, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;
use xac_joystick::config;
use xac_joystick::error::{Error, UsbError};
use xac_joystick::hid::{JoystickReport, JOYSTICK_REPORT_DESCRIPTOR, JOYSTICK_REPORT_SIZE};
use xac_joystick::{LinkState, ReportSink};

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_STATE_HANDLER: StaticCell<UsbStateHandler> = StaticCell::new();

static LINK_STATE: AtomicU8 = AtomicU8::new(LINK_NOT_MOUNTED);
static REPORT_SIGNAL: Signal<CriticalSectionRawMutex, JoystickReport> = Signal::new();
static WAKE_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

const LINK_NOT_MOUNTED: u8 = 0;
const LINK_MOUNTED: u8 = 1;
const LINK_SUSPENDED: u8 = 2;

fn set_link_state(state: LinkState) {
    let raw = match state {
        LinkState::NotMounted => LINK_NOT_MOUNTED,
        LinkState::Mounted => LINK_MOUNTED,
        LinkState::Suspended => LINK_SUSPENDED,
    };
    if LINK_STATE.swap(raw, Ordering::AcqRel) != raw {
        info!("USB: link {}", state);
    }
}

/// Current USB link state.
pub fn link_state() -> LinkState {
    match LINK_STATE.load(Ordering::Acquire) {
        LINK_MOUNTED => LinkState::Mounted,
        LINK_SUSPENDED => LinkState::Suspended,
        _ => LinkState::NotMounted,
    }
}

/// Device-stack callbacks folded into a [`LinkState`].
struct UsbStateHandler {
    configured: bool,
}

impl embassy_usb::Handler for UsbStateHandler {
    fn enabled(&mut self, enabled: bool) {
        info!("USB: enabled={}", enabled);
        if !enabled {
            self.configured = false;
            set_link_state(LinkState::NotMounted);
        }
    }

    fn reset(&mut self) {
        self.configured = false;
        set_link_state(LinkState::NotMounted);
    }

    fn configured(&mut self, configured: bool) {
        self.configured = configured;
        set_link_state(if configured {
            LinkState::Mounted
        } else {
            LinkState::NotMounted
        });
    }

    fn suspended(&mut self, suspended: bool) {
        set_link_state(match (suspended, self.configured) {
            (true, _) => LinkState::Suspended,
            (false, true) => LinkState::Mounted,
            (false, false) => LinkState::NotMounted,
        });
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        info!("USB: remote wakeup enabled={}", enabled);
    }
}

/// [`ReportSink`] backed by the writer task's latest-value signal.
///
/// Submitting overwrites any report the writer has not picked up yet.
pub struct UsbSink;

impl ReportSink for UsbSink {
    fn link_state(&self) -> LinkState {
        link_state()
    }

    fn submit(&mut self, report: &JoystickReport) {
        REPORT_SIGNAL.signal(*report);
    }

    fn wake_host(&mut self) {
        WAKE_SIGNAL.signal(());
    }
}

/// Build result containing the USB device runner and the HID writer.
pub struct UsbJoystick {
    pub device: UsbDevice<'static, UsbDriver>,
    pub writer: HidWriter<'static, UsbDriver, 8>,
}

/// Initialise the USB stack and create the HID joystick device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD) -> UsbJoystick {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // Plain single-interface device: no IADs, class defined per interface.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = config::USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;
    usb_config.device_class = 0x00;
    usb_config.device_sub_class = 0x00;
    usb_config.device_protocol = 0x00;
    usb_config.composite_with_iads = false;

    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let handler = USB_STATE_HANDLER.init(UsbStateHandler { configured: false });
    builder.handler(handler);

    let hid_state = HID_STATE.init(State::new());
    let hid_config = HidConfig {
        report_descriptor: JOYSTICK_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let writer = HidWriter::new(&mut builder, hid_state, hid_config);

    let device = builder.build();

    info!("USB HID joystick initialised");

    UsbJoystick { device, writer }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// Handles enumeration and endpoint servicing. While the bus is suspended
/// it waits for either a host resume or a wakeup request from the report
/// cycle.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    loop {
        device.run_until_suspend().await;
        WAKE_SIGNAL.reset();

        match select(device.wait_resume(), WAKE_SIGNAL.wait()).await {
            Either::First(()) => {}
            Either::Second(()) => {
                info!("USB: requesting remote wakeup");
                if let Err(_e) = device.remote_wakeup().await {
                    warn!("USB remote wakeup not permitted by host");
                }
            }
        }
    }
}

fn endpoint_error(e: EndpointError) -> Error {
    match e {
        EndpointError::BufferOverflow => UsbError::BufferOverflow.into(),
        EndpointError::Disabled => UsbError::Disabled.into(),
    }
}

/// HID report forwarding task - writes the newest report to the endpoint.
///
/// Reports signalled while a write is in flight are coalesced; only the
/// latest one is sent next.
pub async fn hid_writer_task(mut writer: HidWriter<'static, UsbDriver, 8>) -> ! {
    info!("HID writer task started - waiting for reports");

    let mut buf = [0u8; JOYSTICK_REPORT_SIZE];

    loop {
        let report = REPORT_SIGNAL.wait().await;
        let n = report.serialize(&mut buf);
        if let Err(e) = writer.write(&buf[..n]).await {
            warn!("USB joystick write failed: {}", endpoint_error(e));
        }
    }
}
