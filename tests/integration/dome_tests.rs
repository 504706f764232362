//! Integration tests for the dome command queue against a drive with its
//! own encoder.

use crate::mock_hw::{MockDrive, MockHardware};

use domectl::app::ports::{DriveDirection, ShutterAction};
use domectl::config::DomeConfig;
use domectl::dome::{Dome, DomeCommand, DomeEvent, QUEUE_DEPTH};
use domectl::error::AdmissionError;

fn auto_dome() -> Dome {
    Dome::new(&DomeConfig {
        default_auto_dome: true,
        ..DomeConfig::default()
    })
}

#[test]
fn encoder_position_drives_goto() {
    let mut dome = auto_dome();
    let hw = MockHardware::new();
    // Default offset is 27 counts: raw 229 reads as north.
    let mut drive = MockDrive {
        encoder: Some(229),
        ..MockDrive::default()
    };
    dome.move_to(90.0, false, &hw).unwrap();

    dome.step(0, &mut drive);
    assert_eq!(dome.state().azimuth, Some(0.0));
    assert_eq!(drive.drives, vec![DriveDirection::Right]);

    // 37 + 27 = 64 counts, a quarter turn.
    drive.encoder = Some(37);
    let events = dome.step(100, &mut drive);
    assert_eq!(events.as_slice(), &[DomeEvent::Arrived { azimuth: 90.0 }]);
    assert_eq!(drive.drives.last(), Some(&DriveDirection::Stop));
}

#[test]
fn commands_run_in_submission_order() {
    let mut dome = auto_dome();
    let hw = MockHardware::new();
    let mut drive = MockDrive {
        encoder: Some(229),
        ..MockDrive::default()
    };
    dome.move_to(2.0, false, &hw).unwrap();
    dome.close(false, &hw).unwrap();
    dome.move_to(1.0, false, &hw).unwrap();

    let mut started = Vec::new();
    for t in 0..10 {
        for event in dome.step(t * 100, &mut drive) {
            if let DomeEvent::Started(cmd) = event {
                started.push(cmd);
            }
        }
    }
    assert_eq!(
        started,
        vec![
            DomeCommand::GotoAzimuth(2.0),
            DomeCommand::CloseShutter,
            DomeCommand::QueryShutterStatus,
            DomeCommand::GotoAzimuth(1.0),
        ]
    );
    assert_eq!(drive.shutters, vec![ShutterAction::Close]);
    assert!(dome.is_idle());
}

#[test]
fn queue_holds_sixteen_commands() {
    let mut dome = auto_dome();
    let hw = MockHardware::new();
    for i in 0..QUEUE_DEPTH {
        dome.move_to(i as f64, false, &hw).unwrap();
    }
    assert_eq!(
        dome.move_to(200.0, false, &hw),
        Err(AdmissionError::QueueFull)
    );
    assert_eq!(dome.queued().count(), QUEUE_DEPTH);
}
