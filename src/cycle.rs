//! Report cycle - one pass of sample, debounce, decode and assemble.
//!
//! The firmware runs a cooperative loop: USB servicing, the status LED
//! and this cycle share one executor and none of them blocks. The cycle
//! itself is rate-limited by an [`IntervalGate`] so it runs at most once
//! per [`REPORT_INTERVAL_MS`], however often it is polled.
//!
//! ```text
//!  InputSource ──► DebounceBank ──┐
//!       │                         ├──► build_report ──► ReportSink
//!       └────────► ScratchAxis ───┘
//! ```

use crate::config::{BUTTON_COUNT, REPORT_INTERVAL_MS};
use crate::hid::{build_report, JoystickReport, ScratchMode, ScratchState};
use crate::input::debounce::DebounceBank;
use crate::input::scratch::ScratchAxis;
use crate::input::{Button, InputSource};

/// Non-blocking "has enough time passed" check on the millisecond clock.
///
/// The first check always passes. Elapsed time is computed with wrapping
/// arithmetic, so a clock rollover costs at most one late tick.
#[derive(Clone, Copy, Debug)]
pub struct IntervalGate {
    interval_ms: u32,
    last_ms: Option<u32>,
}

impl IntervalGate {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Returns `true` (and restarts the interval) when the gate is open.
    pub fn due(&mut self, now_ms: u32) -> bool {
        let open = match self.last_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
            None => true,
        };
        if open {
            self.last_ms = Some(now_ms);
        }
        open
    }
}

/// USB link state as seen by the report cycle and the status LED.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not configured by a host.
    #[default]
    NotMounted,
    /// Configured and able to take reports.
    Mounted,
    /// Host suspended the bus.
    Suspended,
}

/// Consumer of finished reports (the USB HID endpoint).
pub trait ReportSink {
    /// Current link state.
    fn link_state(&self) -> LinkState;

    /// Hand over a report. Must not block; a report that cannot go out
    /// now is dropped, the next cycle supersedes it.
    fn submit(&mut self, report: &JoystickReport);

    /// Ask the host to resume a suspended bus.
    fn wake_host(&mut self);
}

/// What one cycle did with its report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    /// Handed to the sink.
    Sent,
    /// Link down; report dropped.
    Dropped,
    /// Link suspended with a button held or the turntable moving; host
    /// wakeup requested.
    WakeRequested,
}

/// Outcome of a cycle that actually ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleOutcome {
    pub report: JoystickReport,
    pub delivery: Delivery,
}

/// All per-device input state: debouncers, turntable and the mode latch.
pub struct Controller {
    buttons: DebounceBank,
    scratch: ScratchAxis,
    mode: ScratchMode,
    gate: IntervalGate,
    scratch_moved: bool,
    wake_pending: bool,
}

impl Controller {
    /// Take the power-on samples: seed the debouncers and latch the
    /// scratch mode from the mode-select button.
    pub fn boot<I: InputSource>(inputs: &mut I) -> Self {
        let levels: [bool; BUTTON_COUNT] = Button::ALL.map(|b| inputs.button_high(b));
        let mode = ScratchMode::latch(levels[Button::MODE_SELECT.index()]);

        #[cfg(feature = "defmt")]
        defmt::info!("scratch mode latched: {}", mode);

        Self {
            buttons: DebounceBank::new(levels),
            scratch: ScratchAxis::new(),
            mode,
            gate: IntervalGate::new(REPORT_INTERVAL_MS),
            scratch_moved: false,
            wake_pending: false,
        }
    }

    /// Scratch mode latched at boot.
    pub fn mode(&self) -> ScratchMode {
        self.mode
    }

    /// Run a cycle if the report interval has elapsed.
    ///
    /// Returns `None` when the gate is still closed; nothing is sampled
    /// and the sink is not touched in that case.
    pub fn poll<I, S>(&mut self, now_ms: u32, inputs: &mut I, sink: &mut S) -> Option<CycleOutcome>
    where
        I: InputSource,
        S: ReportSink,
    {
        if !self.gate.due(now_ms) {
            return None;
        }
        let report = self.sample(now_ms, inputs);
        let delivery = self.deliver(&report, sink);
        Some(CycleOutcome { report, delivery })
    }

    /// Sample every input once and assemble a report, ignoring the gate.
    pub fn sample<I: InputSource>(&mut self, now_ms: u32, inputs: &mut I) -> JoystickReport {
        for button in Button::ALL {
            let raw = inputs.button_high(button);
            self.buttons.update(button, raw, now_ms);
        }

        let before = self.scratch.position();
        let (a_high, b_high) = inputs.scratch_high();
        self.scratch.sample(a_high, b_high, now_ms);
        self.scratch_moved = self.scratch.position() != before;

        build_report(&self.buttons.levels(), self.scratch_state(), self.mode)
    }

    /// Current turntable state.
    pub fn scratch_state(&self) -> ScratchState {
        ScratchState {
            position: self.scratch.position(),
            direction: self.scratch.direction(),
        }
    }

    /// Whether this cycle saw user input worth waking a suspended host for.
    fn has_activity(&self, report: &JoystickReport) -> bool {
        report.has_pressed_buttons() || self.scratch_moved
    }

    fn deliver<S: ReportSink>(&mut self, report: &JoystickReport, sink: &mut S) -> Delivery {
        match sink.link_state() {
            LinkState::Mounted => {
                self.wake_pending = false;
                sink.submit(report);
                Delivery::Sent
            }
            LinkState::Suspended if self.has_activity(report) && !self.wake_pending => {
                self.wake_pending = true;
                sink.wake_host();
                Delivery::WakeRequested
            }
            LinkState::Suspended => Delivery::Dropped,
            LinkState::NotMounted => {
                self.wake_pending = false;
                Delivery::Dropped
            }
        }
    }
}
