//! Mock adapters for integration tests.
//!
//! Records every motor call and every emitted event so tests can assert on
//! the full history, and scripts the serial port from both ends.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use domectl::app::events::AppEvent;
use domectl::app::ports::{
    DomeDrivePort, DriveDirection, EventSink, LimitPort, MotorPort, PaddleInputPort,
    PaddleInputs, SafetyPort, ShutterAction,
};
use domectl::dome::DomeEvent;
use domectl::paddle::{Axis, PaddleTransition};
use domectl::protocol::codec::decode_frame;
use domectl::protocol::transport::Transport;

// ── Motor call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum MotorCall {
    Start { axis: Axis, velocity: f64 },
    Stop(Axis),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<MotorCall>,
    pub inputs: PaddleInputs,
    pub east_clear: bool,
    pub west_clear: bool,
    pub permitted: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            inputs: PaddleInputs::default(),
            east_clear: true,
            west_clear: true,
            permitted: true,
        }
    }

    pub fn last_call(&self) -> Option<&MotorCall> {
        self.calls.last()
    }

    /// Velocity the axis was last started at, or `None` if stopped.
    pub fn running(&self, axis: Axis) -> Option<f64> {
        self.calls.iter().rev().find_map(|c| match *c {
            MotorCall::Start { axis: a, velocity } if a == axis => Some(Some(velocity)),
            MotorCall::Stop(a) if a == axis => Some(None),
            _ => None,
        })
        .flatten()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorPort for MockHardware {
    fn start_paddle(&mut self, axis: Axis, velocity: f64) {
        self.calls.push(MotorCall::Start { axis, velocity });
    }

    fn stop_paddle(&mut self, axis: Axis) {
        self.calls.push(MotorCall::Stop(axis));
    }
}

impl LimitPort for MockHardware {
    fn can_move_east(&self) -> bool {
        self.east_clear
    }

    fn can_move_west(&self) -> bool {
        self.west_clear
    }
}

impl PaddleInputPort for MockHardware {
    fn read(&mut self) -> PaddleInputs {
        self.inputs
    }
}

impl SafetyPort for MockHardware {
    fn motion_permitted(&self) -> bool {
        self.permitted
    }
}

// ── MockDrive ─────────────────────────────────────────────────

/// Dome drive with direct encoder access.
#[derive(Default)]
pub struct MockDrive {
    pub drives: Vec<DriveDirection>,
    pub shutters: Vec<ShutterAction>,
    pub encoder: Option<u8>,
}

impl DomeDrivePort for MockDrive {
    fn drive(&mut self, direction: DriveDirection) {
        self.drives.push(direction);
    }

    fn shutter(&mut self, action: ShutterAction) {
        self.shutters.push(action);
    }

    fn read_encoder(&mut self) -> Option<u8> {
        self.encoder
    }
}

// ── MockPort ──────────────────────────────────────────────────

#[derive(Default)]
struct PortState {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    fail_writes: bool,
}

/// In-memory serial port.  Clones share the same buffers, so a test keeps
/// one handle after moving the other into the link.
#[derive(Clone, Default)]
pub struct MockPort {
    inner: Rc<RefCell<PortState>>,
}

#[allow(dead_code)]
impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for the controller side to "send".
    pub fn inject(&self, bytes: &[u8]) {
        self.inner.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Every frame written since the last call, decoded.
    pub fn take_frames(&self) -> Vec<Vec<String>> {
        let tx = std::mem::take(&mut self.inner.borrow_mut().tx);
        tx.split_inclusive(|&b| b == b'*')
            .map(|f| decode_frame(f).expect("service wrote a malformed frame"))
            .collect()
    }
}

impl Transport for MockPort {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut state = self.inner.borrow_mut();
        let n = buf.len().min(state.rx.len());
        for (slot, byte) in buf.iter_mut().zip(state.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.inner.borrow_mut();
        if state.fail_writes {
            return Err("write failed");
        }
        state.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dome_events(&self) -> Vec<DomeEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Dome(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn paddle_transitions(&self) -> Vec<PaddleTransition> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Paddle { transition, .. } => Some(*transition),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
