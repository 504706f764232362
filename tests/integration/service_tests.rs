//! Integration tests for the ControlService → dome / paddles → link
//! pipeline.
//!
//! Each test drives the service tick by tick with a scripted serial port
//! on one side and recording hardware on the other.

use crate::mock_hw::{MockHardware, MockPort, MotorCall, RecordingSink};

use domectl::app::commands::{DomeRequest, RequestChannel};
use domectl::app::ports::DriveDirection;
use domectl::app::events::{AppEvent, PaddleSource};
use domectl::app::service::ControlService;
use domectl::config::DomeConfig;
use domectl::dome::geometry::TelescopePosition;
use domectl::dome::{AbandonReason, DomeCommand, DomeEvent};
use domectl::error::{AdmissionError, FrameError, GeometryError};
use domectl::paddle::{Axis, EAST_MASK, NORTH_MASK, PaddleDirection, PaddleTransition};
use domectl::protocol::link::SerialLink;
use domectl::protocol::outbound::OutboundCommand;

const TICK_MS: u64 = 100;

struct Rig {
    svc: ControlService<MockPort>,
    port: MockPort,
    hw: MockHardware,
    sink: RecordingSink,
    requests: RequestChannel,
    now: u64,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(DomeConfig::default())
    }

    fn with_config(config: DomeConfig) -> Self {
        let port = MockPort::new();
        let link = SerialLink::new(port.clone(), config.serial.timeout_ms);
        let mut svc = ControlService::new(config, link);
        let mut sink = RecordingSink::new();
        svc.start(&mut sink);
        Self {
            svc,
            port,
            hw: MockHardware::new(),
            sink,
            requests: RequestChannel::new(),
            now: 0,
        }
    }

    fn request(&self, req: DomeRequest) {
        self.requests.try_send(req).unwrap();
    }

    /// Run one tick `after_ms` after the previous one.
    fn tick_after(&mut self, after_ms: u64) {
        self.now += after_ms;
        self.svc
            .tick(self.now, &self.requests, &mut self.hw, &mut self.sink);
    }

    fn tick(&mut self) {
        self.tick_after(TICK_MS);
    }

    /// Outbound frames since the last call.
    fn frames(&self) -> Vec<Vec<String>> {
        self.port.take_frames()
    }

    fn last_frame(&self) -> Vec<String> {
        self.frames().pop().unwrap_or_default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ── Lifecycle and framing ─────────────────────────────────────

#[test]
fn start_reports_connected_link() {
    let rig = Rig::new();
    assert_eq!(
        rig.sink.events,
        vec![AppEvent::Started {
            auto: false,
            tracking: false,
            connected: true,
        }]
    );
}

#[test]
fn empty_frame_is_sent_every_tick() {
    let mut rig = Rig::new();
    rig.tick();
    rig.tick();
    assert_eq!(rig.frames(), vec![Vec::<String>::new(), Vec::new()]);
    assert_eq!(rig.svc.build_telemetry().frames_tx, 2);
}

#[test]
fn frame_split_across_reads_is_reassembled() {
    let mut rig = Rig::new();
    rig.port.inject(b"h1");
    rig.tick();
    assert_eq!(rig.svc.snapshot().azimuth, -1.0);
    rig.port.inject(b"20\r*");
    rig.tick();
    assert_eq!(rig.svc.snapshot().azimuth, 120.0);
}

#[test]
fn unknown_letter_is_skipped_rest_of_frame_applies() {
    let mut rig = Rig::new();
    rig.port.inject(b"z1\rh45\r*");
    rig.tick();
    assert!(rig.sink.events.contains(&AppEvent::CommandsRejected(1)));
    assert_eq!(rig.svc.snapshot().azimuth, 45.0);
}

#[test]
fn non_ascii_frame_is_dropped() {
    let mut rig = Rig::new();
    rig.port.inject(&[b'h', 0xff, b'\r', b'*']);
    rig.tick();
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::FrameDropped(FrameError::NotAscii)));
    assert_eq!(rig.svc.snapshot().azimuth, -1.0);
}

#[test]
fn write_failure_is_reported_and_counted() {
    let mut rig = Rig::new();
    rig.port.fail_writes(true);
    rig.tick();
    assert!(rig
        .sink
        .events
        .contains(&AppEvent::FrameDropped(FrameError::Transport)));
    assert_eq!(rig.svc.build_telemetry().link_errors, 1);
}

#[test]
fn disconnected_link_keeps_service_running() {
    let link: SerialLink<MockPort> = SerialLink::disconnected(1000);
    let mut svc = ControlService::new(DomeConfig::default(), link);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let requests = RequestChannel::new();
    requests.try_send(DomeRequest::SetAuto(true)).unwrap();
    for t in 0..5 {
        svc.tick(t * TICK_MS, &requests, &mut hw, &mut sink);
    }
    let telemetry = svc.build_telemetry();
    assert!(!telemetry.connected);
    assert_eq!(telemetry.tick, 5);
    assert_eq!(telemetry.frames_tx, 0);
    assert!(telemetry.dome.auto);
}

// ── Dome gotos ────────────────────────────────────────────────

#[test]
fn goto_drives_then_arrival_in_same_tick_stops() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 200.0,
        force: false,
    });
    rig.port.inject(b"h100\r*");
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["G1", "H2"]));

    // The report is dispatched before the dome step of the same tick.
    rig.port.inject(b"h198\r*");
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["H0"]));
    assert_eq!(
        rig.sink.dome_events(),
        vec![
            DomeEvent::Started(DomeCommand::GotoAzimuth(200.0)),
            DomeEvent::Arrived { azimuth: 198.0 },
        ]
    );
    assert!(rig.svc.dome().is_idle());
}

#[test]
fn drive_command_is_not_repeated_while_moving() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 300.0,
        force: false,
    });
    rig.port.inject(b"h10\r*");
    rig.tick();
    rig.port.inject(b"h0\r*");
    rig.tick();
    rig.port.inject(b"h350\r*");
    rig.tick();
    let frames = rig.frames();
    // 10 -> 300 is shorter going left, through north.
    assert_eq!(frames[0], strings(&["G1", "H1"]));
    assert!(frames[1].is_empty());
    assert!(frames[2].is_empty());
}

#[test]
fn raw_drive_command_does_not_mask_goto_stop() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 90.0,
        force: false,
    });
    rig.port.inject(b"h90\r*");
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["G1", "H0"]));

    rig.request(DomeRequest::Send(OutboundCommand::DomeManual(
        DriveDirection::Right,
    )));
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["H2"]));

    // Already within tolerance: the goto arrives at once and must stop
    // the rotation started by the raw command.
    rig.request(DomeRequest::MoveTo {
        azimuth: 91.0,
        force: false,
    });
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["H0"]));
}

#[test]
fn goto_times_out_and_marks_failure() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 100.0,
        force: false,
    });
    rig.port.inject(b"h10\r*");
    rig.tick();
    rig.tick_after(180_001);
    assert_eq!(rig.frames().last(), Some(&strings(&["H0"])));
    assert_eq!(
        rig.sink.dome_events().last(),
        Some(&DomeEvent::Abandoned {
            target: 100.0,
            reason: AbandonReason::TimedOut,
        })
    );
    assert!(rig.svc.snapshot().failed);
}

#[test]
fn goto_without_azimuth_is_abandoned_immediately() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 100.0,
        force: false,
    });
    rig.tick();
    assert_eq!(
        rig.sink.dome_events(),
        vec![
            DomeEvent::Started(DomeCommand::GotoAzimuth(100.0)),
            DomeEvent::Abandoned {
                target: 100.0,
                reason: AbandonReason::AzimuthUnknown,
            },
        ]
    );
    assert_eq!(rig.last_frame(), strings(&["G1", "H0"]));
}

#[test]
fn manual_mode_abandons_goto_in_flight() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::MoveTo {
        azimuth: 100.0,
        force: false,
    });
    rig.port.inject(b"h10\r*");
    rig.tick();
    rig.frames();

    rig.request(DomeRequest::SetAuto(false));
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["G0", "H0"]));
    assert_eq!(
        rig.sink.dome_events().last(),
        Some(&DomeEvent::Abandoned {
            target: 100.0,
            reason: AbandonReason::ManualMode,
        })
    );
}

// ── Shutter ───────────────────────────────────────────────────

#[test]
fn open_runs_shutter_then_status_query() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::Open { force: false });
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["G1", "L1"]));
    for _ in 0..3 {
        rig.tick();
    }
    assert_eq!(
        rig.sink.dome_events(),
        vec![
            DomeEvent::Started(DomeCommand::OpenShutter),
            DomeEvent::Completed(DomeCommand::OpenShutter),
            DomeEvent::Started(DomeCommand::QueryShutterStatus),
            DomeEvent::Completed(DomeCommand::QueryShutterStatus),
        ]
    );
    assert!(rig.svc.snapshot().shutter_open);
}

#[test]
fn windshield_open_uses_its_own_code() {
    let mut config = DomeConfig::default();
    config.open_with_windshield = true;
    config.default_auto_dome = true;
    let mut rig = Rig::with_config(config);
    rig.request(DomeRequest::Open { force: false });
    rig.tick();
    assert_eq!(rig.last_frame(), strings(&["L2"]));
}

// ── Admission ─────────────────────────────────────────────────

#[test]
fn requests_rejected_in_manual_mode() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::MoveTo {
        azimuth: 90.0,
        force: true,
    });
    rig.tick();
    assert!(rig.sink.events.contains(&AppEvent::RequestRejected {
        request: "move",
        error: AdmissionError::NotAutoMode,
    }));
    assert!(rig.svc.dome().is_idle());
}

#[test]
fn force_overrides_safety_interlock_only() {
    let mut rig = Rig::new();
    rig.hw.permitted = false;
    let (svc, hw, sink) = (&mut rig.svc, &rig.hw, &mut rig.sink);
    assert_eq!(svc.handle_request(DomeRequest::SetAuto(true), hw, sink), Ok(()));
    assert_eq!(
        svc.handle_request(DomeRequest::Close { force: false }, hw, sink),
        Err(AdmissionError::SafetyInterlock)
    );
    assert_eq!(
        svc.handle_request(DomeRequest::Close { force: true }, hw, sink),
        Ok(())
    );
    assert_eq!(
        svc.handle_request(
            DomeRequest::MoveTo {
                azimuth: 360.0,
                force: true,
            },
            hw,
            sink
        ),
        Err(AdmissionError::InvalidAzimuth)
    );
    assert_eq!(svc.dome().queued().count(), 2);
}

// ── Position and tracking ─────────────────────────────────────

#[test]
fn position_update_publishes_coordinates() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::UpdatePosition(TelescopePosition {
        ra_hours: 1.5,
        dec_deg: -30.5,
        lst_hours: 3.0,
        ..TelescopePosition::default()
    }));
    rig.tick();
    assert_eq!(
        rig.last_frame(),
        strings(&["A01:30:00", "B-30:30:00", "C+01:30:00", "D03:00:00"])
    );
}

fn tracking_rig(current: &[u8], dome_az: f64) -> Rig {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::SetTracking(true));
    rig.request(DomeRequest::UpdatePosition(TelescopePosition {
        dome_override: Some(dome_az),
        ..TelescopePosition::default()
    }));
    rig.port.inject(current);
    rig.tick();
    rig
}

#[test]
fn tracking_moves_dome_when_outside_tolerance() {
    let rig = tracking_rig(b"h10\r*", 90.0);
    assert!(rig.sink.events.contains(&AppEvent::TrackingMove {
        from: Some(10.0),
        to: 90.0,
    }));
    assert_eq!(
        rig.sink.dome_events(),
        vec![DomeEvent::Started(DomeCommand::GotoAzimuth(90.0))]
    );
    assert!(rig.last_frame().contains(&"H2".to_string()));
}

#[test]
fn tracking_holds_within_tolerance() {
    let rig = tracking_rig(b"h88\r*", 90.0);
    assert!(
        !rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::TrackingMove { .. }))
    );
    assert!(rig.svc.dome().is_idle());
}

#[test]
fn tracking_is_rate_limited() {
    let mut rig = tracking_rig(b"h10\r*", 90.0);
    rig.port.inject(b"h89\r*");
    rig.tick();
    assert!(rig.svc.dome().is_idle());

    // New target, but the interval has not elapsed.
    rig.request(DomeRequest::UpdatePosition(TelescopePosition {
        dome_override: Some(180.0),
        ..TelescopePosition::default()
    }));
    rig.tick();
    assert!(rig.svc.dome().is_idle());

    rig.tick_after(10_000);
    assert!(rig.sink.events.contains(&AppEvent::TrackingMove {
        from: Some(89.0),
        to: 180.0,
    }));
}

#[test]
fn tracking_skips_degenerate_pointing() {
    let mut rig = Rig::new();
    rig.request(DomeRequest::SetAuto(true));
    rig.request(DomeRequest::SetTracking(true));
    rig.request(DomeRequest::UpdatePosition(TelescopePosition {
        alt_deg: 0.0,
        azi_deg: 90.0,
        ..TelescopePosition::default()
    }));
    rig.port.inject(b"h10\r*");
    rig.tick();
    assert!(rig.sink.events.contains(&AppEvent::TrackingSkipped(
        GeometryError::DegenerateDirection
    )));
    assert!(rig.svc.dome().is_idle());
}

// ── Paddles ───────────────────────────────────────────────────

#[test]
fn virtual_button_runs_motor_until_failsafe() {
    let mut rig = Rig::new();
    rig.port.inject(b"a2\r*");
    rig.tick_after(0);
    assert_eq!(rig.hw.running(Axis::Dec), Some(600.0));

    rig.tick_after(500);
    assert_eq!(rig.hw.calls.len(), 1);

    rig.tick_after(1100);
    assert_eq!(rig.hw.last_call(), Some(&MotorCall::Stop(Axis::Dec)));
    assert!(!rig.svc.snapshot().buttons.north);
    assert_eq!(
        rig.sink.paddle_transitions().last(),
        Some(&PaddleTransition::Released {
            direction: PaddleDirection::CoarseNorth,
        })
    );
}

#[test]
fn virtual_release_stops_motor() {
    let mut rig = Rig::new();
    rig.port.inject(b"d3\r*");
    rig.tick();
    assert_eq!(rig.hw.running(Axis::Ra), Some(-3600.0));
    rig.port.inject(b"e\r*");
    rig.tick();
    assert_eq!(rig.hw.running(Axis::Ra), None);
}

#[test]
fn physical_paddle_respects_ra_limit() {
    let mut rig = Rig::new();
    rig.hw.inputs.fine = EAST_MASK;
    rig.hw.east_clear = false;
    rig.tick();
    assert!(rig.hw.calls.is_empty());

    rig.hw.east_clear = true;
    rig.tick();
    assert_eq!(
        rig.hw.calls,
        vec![MotorCall::Start {
            axis: Axis::Ra,
            velocity: 30.0,
        }]
    );
    assert!(rig.sink.events.contains(&AppEvent::Paddle {
        source: PaddleSource::Physical,
        transition: PaddleTransition::Pressed {
            direction: PaddleDirection::FineEast,
            velocity: 30.0,
        },
    }));

    rig.hw.inputs.fine = 0;
    rig.tick();
    assert_eq!(rig.hw.last_call(), Some(&MotorCall::Stop(Axis::Ra)));
}

#[test]
fn physical_and_virtual_paddles_latch_independently() {
    let mut rig = Rig::new();
    rig.hw.inputs.fine = NORTH_MASK;
    rig.tick();
    assert!(matches!(
        rig.hw.calls.as_slice(),
        [MotorCall::Start { axis: Axis::Dec, .. }]
    ));

    // The virtual latch is free, so the same axis is started again.
    rig.port.inject(b"a2\r*");
    rig.tick();
    assert_eq!(rig.hw.running(Axis::Dec), Some(600.0));
    assert_eq!(rig.hw.calls.len(), 2);

    // Physical release stops the axis although the virtual button is held.
    rig.hw.inputs.fine = 0;
    rig.tick();
    assert_eq!(rig.hw.last_call(), Some(&MotorCall::Stop(Axis::Dec)));
    assert!(rig.svc.snapshot().buttons.north);
}
