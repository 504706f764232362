//! Sentinel-terminated frame codec.
//!
//! Wire format (both directions):
//! ```text
//! ┌──────────┬────┬──────────┬────┬─────┬───┐
//! │ h180     │ \r │ j1       │ \r │ ... │ * │
//! │ cmd 0    │    │ cmd 1    │    │     │   │
//! └──────────┴────┴──────────┴────┴─────┴───┘
//! ```
//!
//! Each command is an ASCII letter plus a fixed-width payload, followed by
//! a carriage return.  The frame ends with `*`.  An empty frame is the
//! sentinel alone.
//!
//! [`FrameAccumulator`] collects bytes from partial serial reads and yields
//! whole frames; [`decode_frame`] splits one frame into command strings.

use crate::error::FrameError;

/// Separates commands inside a frame.
pub const FIELD_SEPARATOR: u8 = b'\r';

/// Terminates a frame.
pub const SENTINEL: u8 = b'*';

/// Longest frame accepted before the accumulator gives up on a sentinel.
pub const MAX_FRAME_LEN: usize = 512;

/// Encode commands into one frame.
///
/// Every command is followed by [`FIELD_SEPARATOR`], then [`SENTINEL`] is
/// appended.  An empty command list encodes to `b"*"`.
pub fn encode_frame<S: AsRef<str>>(commands: &[S]) -> Vec<u8> {
    let len = commands.iter().map(|c| c.as_ref().len() + 1).sum::<usize>() + 1;
    let mut out = Vec::with_capacity(len);
    for cmd in commands {
        out.extend_from_slice(cmd.as_ref().as_bytes());
        out.push(FIELD_SEPARATOR);
    }
    out.push(SENTINEL);
    out
}

/// Split a frame into its command strings.
///
/// `bytes` is expected to end at the sentinel; anything after the first
/// sentinel is ignored.  Empty entries (including the one left by the final
/// separator) are dropped.
pub fn decode_frame(bytes: &[u8]) -> Result<Vec<String>, FrameError> {
    let end = bytes
        .iter()
        .position(|&b| b == SENTINEL)
        .ok_or(FrameError::Malformed)?;
    let body = &bytes[..end];
    if !body.is_ascii() {
        return Err(FrameError::NotAscii);
    }

    Ok(body
        .split(|&b| b == FIELD_SEPARATOR)
        .filter(|field| !field.is_empty())
        // ASCII checked above, so each field is valid UTF-8.
        .map(|field| field.iter().map(|&b| b as char).collect())
        .collect())
}

// ---------------------------------------------------------------------------
// Streaming accumulator
// ---------------------------------------------------------------------------

/// Reassembles frames from arbitrary read boundaries.
///
/// A single serial read may return part of a frame, exactly one frame, or
/// several frames back to back.  Complete frames are queued until taken
/// with [`next_frame`](Self::next_frame).
pub struct FrameAccumulator {
    partial: Vec<u8>,
    /// Time the first byte of `partial` arrived.
    started_ms: Option<u64>,
    /// Set after an overflow; bytes are dropped up to the next sentinel.
    discarding: bool,
    ready: Vec<Vec<u8>>,
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self {
            partial: Vec::with_capacity(MAX_FRAME_LEN),
            started_ms: None,
            discarding: false,
            ready: Vec::new(),
        }
    }

    /// Feed bytes read at `now_ms`.
    ///
    /// Returns `Err(Overflow)` if a partial frame grew past
    /// [`MAX_FRAME_LEN`].  The whole oversized frame is dropped, through to
    /// its sentinel, even when that sentinel arrives in a later read.
    /// Frames completed before the overflow are kept.
    pub fn feed(&mut self, data: &[u8], now_ms: u64) -> Result<(), FrameError> {
        let mut overflowed = false;

        for &b in data {
            if self.discarding {
                if b == SENTINEL {
                    self.discarding = false;
                    self.started_ms = None;
                }
                continue;
            }
            if self.started_ms.is_none() {
                self.started_ms = Some(now_ms);
            }
            self.partial.push(b);

            if b == SENTINEL {
                self.ready.push(core::mem::take(&mut self.partial));
                self.started_ms = None;
            } else if self.partial.len() >= MAX_FRAME_LEN {
                self.partial.clear();
                self.discarding = true;
                overflowed = true;
            }
        }

        if overflowed {
            Err(FrameError::Overflow)
        } else {
            Ok(())
        }
    }

    /// Drop a partial frame that has waited longer than `timeout_ms` for its
    /// sentinel.  Returns `Err(Malformed)` when something was dropped.
    pub fn expire(&mut self, now_ms: u64, timeout_ms: u64) -> Result<(), FrameError> {
        match self.started_ms {
            Some(start) if now_ms.saturating_sub(start) > timeout_ms => {
                self.reset();
                Err(FrameError::Malformed)
            }
            _ => Ok(()),
        }
    }

    /// Oldest complete frame, sentinel included.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        if self.ready.is_empty() {
            None
        } else {
            Some(self.ready.remove(0))
        }
    }

    /// Bytes waiting for a sentinel.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// True while the tail of an oversized frame is being dropped.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Discard the partial frame (e.g. after a port reopen).
    pub fn reset(&mut self) {
        self.partial.clear();
        self.started_ms = None;
        self.discarding = false;
    }
}
