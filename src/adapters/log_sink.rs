//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (env_logger on the host binary).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::dome::DomeEvent;
use crate::paddle::PaddleTransition;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | tick={} link={} rx={} tx={} err={} | azi={:.1} cmd={:.1} \
                     in_use={} queued={} | auto={} track={} | {} | {} |{}",
                    t.tick,
                    if t.connected { "up" } else { "down" },
                    t.frames_rx,
                    t.frames_tx,
                    t.link_errors,
                    t.dome.azimuth,
                    t.dome.commanded_azimuth,
                    t.dome.in_use,
                    t.dome.queued,
                    t.dome.auto,
                    t.dome.tracking,
                    t.dome.shutter,
                    t.dome.dome_drive,
                    t.dome.encoder,
                );
            }
            AppEvent::Started {
                auto,
                tracking,
                connected,
            } => {
                info!("START | auto={} tracking={} connected={}", auto, tracking, connected);
            }
            AppEvent::Dome(DomeEvent::Started(cmd)) => info!("DOME  | start {:?}", cmd),
            AppEvent::Dome(DomeEvent::Completed(cmd)) => info!("DOME  | done {:?}", cmd),
            AppEvent::Dome(DomeEvent::Arrived { azimuth }) => {
                info!("DOME  | arrived at {:.1}", azimuth);
            }
            AppEvent::Dome(DomeEvent::Abandoned { target, reason }) => {
                warn!("DOME  | abandoned goto {:.1}: {:?}", target, reason);
            }
            AppEvent::Paddle { source, transition } => match transition {
                PaddleTransition::Pressed {
                    direction,
                    velocity,
                } => info!("PADDL | {:?} {:?} at {:.2}", source, direction, velocity),
                PaddleTransition::Released { direction } => {
                    info!("PADDL | {:?} {:?} released", source, direction);
                }
            },
            AppEvent::RequestRejected { request, error } => {
                warn!("REQ   | {} rejected: {}", request, error);
            }
            AppEvent::FrameDropped(e) => warn!("LINK  | frame dropped: {}", e),
            AppEvent::CommandsRejected(n) => warn!("LINK  | {} command(s) rejected", n),
            AppEvent::TrackingMove { from, to } => match from {
                Some(from) => info!("TRACK | {:.1} -> {:.1}", from, to),
                None => info!("TRACK | ? -> {:.1}", to),
            },
            AppEvent::TrackingSkipped(e) => warn!("TRACK | skipped: {}", e),
        }
    }
}
