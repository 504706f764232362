//! Fuzz target: frame accumulation, decode and dispatch
//!
//! Splits arbitrary bytes at a fuzzer-chosen point, feeds both halves to
//! the accumulator, and dispatches every completed frame into a fresh
//! dome state.  Nothing may panic, and status indices must stay inside
//! their tables.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use domectl::dome::state::DomeState;
use domectl::protocol::codec::{FrameAccumulator, MAX_FRAME_LEN, decode_frame};
use domectl::protocol::dispatch::dispatch_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());

    let mut acc = FrameAccumulator::new();
    let mut state = DomeState::new(true, false, 27);

    let _ = acc.feed(&rest[..split], 0);
    let _ = acc.feed(&rest[split..], 1);
    assert!(acc.pending() <= MAX_FRAME_LEN, "partial frame exceeds MAX_FRAME_LEN");

    while let Some(frame) = acc.next_frame() {
        if let Ok(commands) = decode_frame(&frame) {
            let rejected = dispatch_frame(&commands, &mut state);
            assert!(rejected <= commands.len());
        }
    }

    // Status lookups must never index out of bounds.
    let _ = (
        state.mirror_cover_status(),
        state.dome_drive_status(),
        state.shutter_status(),
        state.encoder_status(),
        state.lights_status(),
    );
    if let Some(az) = state.azimuth {
        assert!((0.0..360.0).contains(&az));
    }

    acc.reset();
    assert_eq!(acc.pending(), 0);
});
