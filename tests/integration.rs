//! Integration tests for xac-joystick host-testable logic.
//!
//! The controller is driven through `PinInputs` over fake `embedded-hal`
//! pins, the same way the firmware drives it over nRF GPIO inputs.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use xac_joystick::config::BUTTON_COUNT;
use xac_joystick::{
    Button, Controller, Delivery, JoystickReport, LinkState, PinInputs, ReportSink, ScratchMode,
};

/// Pin whose level the test can change while the controller owns it.
#[derive(Clone, Default)]
struct Line(Rc<Cell<bool>>);

impl Line {
    fn high() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl ErrorType for Line {
    type Error = Infallible;
}

impl InputPin for Line {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.get())
    }
}

struct Rig {
    keys: [Line; BUTTON_COUNT],
    scratch_a: Line,
    scratch_b: Line,
    inputs: PinInputs<Line>,
}

impl Rig {
    fn new() -> Self {
        let keys: [Line; BUTTON_COUNT] = std::array::from_fn(|_| Line::high());
        let scratch_a = Line::high();
        let scratch_b = Line::high();
        let inputs = PinInputs::new(keys.clone(), scratch_a.clone(), scratch_b.clone());
        Self {
            keys,
            scratch_a,
            scratch_b,
            inputs,
        }
    }

    fn key(&self, button: Button) -> &Line {
        &self.keys[button.index()]
    }

    /// Drive logical phases (asserted = pulled low).
    fn phases(&self, a: bool, b: bool) {
        self.scratch_a.set_high(!a);
        self.scratch_b.set_high(!b);
    }
}

#[derive(Default)]
struct RecordingSink {
    state: LinkState,
    reports: Vec<(u32, [u8; 5])>,
    clock_ms: u32,
}

impl ReportSink for RecordingSink {
    fn link_state(&self) -> LinkState {
        self.state
    }

    fn submit(&mut self, report: &JoystickReport) {
        self.reports.push((self.clock_ms, report.to_bytes()));
    }

    fn wake_host(&mut self) {}
}

fn mounted() -> RecordingSink {
    RecordingSink {
        state: LinkState::Mounted,
        ..RecordingSink::default()
    }
}

fn run(ctl: &mut Controller, rig: &mut Rig, sink: &mut RecordingSink, from: u32, to: u32) {
    for t in from..to {
        sink.clock_ms = t;
        ctl.poll(t, &mut rig.inputs, sink);
    }
}

#[test]
fn press_and_release_reach_the_report() {
    let mut rig = Rig::new();
    let mut sink = mounted();
    let mut ctl = Controller::boot(&mut rig.inputs);
    let slot = Button::Key1.slot();

    run(&mut ctl, &mut rig, &mut sink, 0, 50);
    rig.key(Button::Key1).set_high(false);
    run(&mut ctl, &mut rig, &mut sink, 50, 80);

    let (_, bytes) = *sink.reports.last().unwrap();
    assert_eq!(bytes[2 + usize::from(slot.group)] & (1 << slot.bit), 1 << slot.bit);

    rig.key(Button::Key1).set_high(true);
    run(&mut ctl, &mut rig, &mut sink, 80, 110);

    let (_, bytes) = *sink.reports.last().unwrap();
    assert_eq!(bytes[2..], [0, 0, 0]);
}

#[test]
fn contact_bounce_does_not_chatter_the_report() {
    let mut rig = Rig::new();
    let mut sink = mounted();
    let mut ctl = Controller::boot(&mut rig.inputs);

    // Press at t=10, then the contact bounces every millisecond for 15 ms.
    for t in 10..25u32 {
        rig.key(Button::Start).set_high(t % 2 == 1);
        sink.clock_ms = t;
        ctl.poll(t, &mut rig.inputs, &mut sink);
    }
    rig.key(Button::Start).set_high(false);
    run(&mut ctl, &mut rig, &mut sink, 25, 40);

    let start = Button::Start.slot();
    assert!(sink
        .reports
        .iter()
        .all(|(_, bytes)| bytes[2 + usize::from(start.group)] & (1 << start.bit) != 0));
}

#[test]
fn analog_mode_reports_position_on_x() {
    let mut rig = Rig::new();
    let mut sink = mounted();
    let mut ctl = Controller::boot(&mut rig.inputs);
    assert_eq!(ctl.mode(), ScratchMode::Analog);

    // Prime with both phases idle, then three forward steps.
    rig.phases(false, false);
    run(&mut ctl, &mut rig, &mut sink, 0, 1);
    for (t, a) in [(1, true), (2, false), (3, true)] {
        rig.phases(a, a);
        run(&mut ctl, &mut rig, &mut sink, t, t + 1);
    }

    let (_, bytes) = *sink.reports.last().unwrap();
    // Position 3 is reported as 3 - 128.
    assert_eq!(bytes[0] as i8, -125);
    assert_eq!(bytes[1], 0);
}

#[test]
fn digital_mode_reports_direction_and_decays_to_idle() {
    let mut rig = Rig::new();
    rig.key(Button::Select).set_high(false);
    let mut sink = mounted();
    let mut ctl = Controller::boot(&mut rig.inputs);
    rig.key(Button::Select).set_high(true);
    assert_eq!(ctl.mode(), ScratchMode::Digital);

    rig.phases(false, false);
    run(&mut ctl, &mut rig, &mut sink, 0, 1);
    // A asserted while B idle: one step backwards.
    rig.phases(true, false);
    run(&mut ctl, &mut rig, &mut sink, 1, 2);

    let (_, bytes) = *sink.reports.last().unwrap();
    assert_eq!(bytes[0], 0);
    assert_eq!(bytes[1] as i8, -128);

    run(&mut ctl, &mut rig, &mut sink, 2, 400);
    let (_, bytes) = *sink.reports.last().unwrap();
    assert_eq!(bytes[1], 0);
}

#[test]
fn at_most_one_report_per_millisecond() {
    let mut rig = Rig::new();
    let mut sink = mounted();
    let mut ctl = Controller::boot(&mut rig.inputs);

    // Poll ten times per millisecond.
    for t in 0..200u32 {
        for _ in 0..10 {
            sink.clock_ms = t;
            ctl.poll(t, &mut rig.inputs, &mut sink);
        }
    }

    assert_eq!(sink.reports.len(), 200);
    assert!(sink.reports.windows(2).all(|w| w[1].0 > w[0].0));
}

#[test]
fn reports_are_dropped_until_mounted() {
    let mut rig = Rig::new();
    let mut sink = RecordingSink::default();
    let mut ctl = Controller::boot(&mut rig.inputs);

    let outcome = ctl.poll(0, &mut rig.inputs, &mut sink).unwrap();
    assert_eq!(outcome.delivery, Delivery::Dropped);
    assert!(sink.reports.is_empty());

    sink.state = LinkState::Mounted;
    let outcome = ctl.poll(1, &mut rig.inputs, &mut sink).unwrap();
    assert_eq!(outcome.delivery, Delivery::Sent);
    assert_eq!(sink.reports.len(), 1);
}
