//! Framed link to the dome controller.
//!
//! ```text
//!  Transport ──bytes──▶ FrameAccumulator ──frames──▶ decode_frame ──▶ commands
//!  commands ──▶ encode_frame ──bytes──▶ Transport
//! ```
//!
//! A link without a transport is "disconnected": reads yield nothing and
//! writes are dropped, so the control loop keeps running when the port
//! could not be opened.

use log::{debug, error, warn};

use crate::error::FrameError;

use super::codec::{FrameAccumulator, decode_frame, encode_frame};
use super::transport::Transport;

const READ_CHUNK: usize = 256;

/// Result of one inbound poll, in arrival order.
pub type Polled = Vec<Result<Vec<String>, FrameError>>;

pub struct SerialLink<T: Transport> {
    transport: Option<T>,
    accumulator: FrameAccumulator,
    /// Partial frames older than this are dropped.
    read_timeout_ms: u64,
    frames_rx: u64,
    frames_tx: u64,
    errors: u64,
}

impl<T: Transport> SerialLink<T> {
    pub fn new(transport: T, read_timeout_ms: u64) -> Self {
        Self::with_transport(Some(transport), read_timeout_ms)
    }

    /// A link with no port behind it.
    pub fn disconnected(read_timeout_ms: u64) -> Self {
        Self::with_transport(None, read_timeout_ms)
    }

    fn with_transport(transport: Option<T>, read_timeout_ms: u64) -> Self {
        Self {
            transport,
            accumulator: FrameAccumulator::new(),
            read_timeout_ms,
            frames_rx: 0,
            frames_tx: 0,
            errors: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Read whatever is available and return every frame completed so far.
    pub fn poll_inbound(&mut self, now_ms: u64) -> Polled {
        let mut out = Polled::new();
        let Some(transport) = self.transport.as_mut() else {
            return out;
        };

        let mut buf = [0u8; READ_CHUNK];
        match transport.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                if let Err(e) = self.accumulator.feed(&buf[..n], now_ms) {
                    out.push(Err(e));
                }
            }
            Err(e) => {
                error!("serial read failed: {:?}", e);
                out.push(Err(FrameError::Transport));
            }
        }

        if let Err(e) = self.accumulator.expire(now_ms, self.read_timeout_ms) {
            warn!("dropping partial frame after {} ms", self.read_timeout_ms);
            out.push(Err(e));
        }

        while let Some(frame) = self.accumulator.next_frame() {
            out.push(decode_frame(&frame));
        }

        for r in &out {
            match r {
                Ok(_) => self.frames_rx += 1,
                Err(_) => self.errors += 1,
            }
        }
        out
    }

    /// Send one frame.  A disconnected link drops it.
    pub fn send(&mut self, commands: &[String]) -> Result<(), FrameError> {
        let Some(transport) = self.transport.as_mut() else {
            debug!("link disconnected, dropping {} command(s)", commands.len());
            return Ok(());
        };
        let bytes = encode_frame(commands);
        let written = transport
            .write_all(&bytes)
            .and_then(|()| transport.flush());
        match written {
            Ok(()) => {
                self.frames_tx += 1;
                Ok(())
            }
            Err(e) => {
                error!("serial write failed: {:?}", e);
                self.errors += 1;
                Err(FrameError::Transport)
            }
        }
    }

    /// (frames received, frames sent, frame/transport errors)
    pub fn counters(&self) -> (u64, u64, u64) {
        (self.frames_rx, self.frames_tx, self.errors)
    }
}
