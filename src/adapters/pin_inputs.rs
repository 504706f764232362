//! Hand-paddle switch inputs over `embedded-hal` pins.
//!
//! Each pin is paired with the mask bit it drives.  Switches pull the
//! line low when pressed.  A pin that fails to read counts as released.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::{PaddleInputPort, PaddleInputs};

/// One switch and its mask bit.
pub struct PaddlePin<P> {
    pub pin: P,
    pub mask: u8,
}

impl<P> PaddlePin<P> {
    pub fn new(pin: P, mask: u8) -> Self {
        Self { pin, mask }
    }
}

pub struct PinPaddleInputs<P: InputPin> {
    fine: Vec<PaddlePin<P>>,
    coarse: Vec<PaddlePin<P>>,
}

impl<P: InputPin> PinPaddleInputs<P> {
    pub fn new(fine: Vec<PaddlePin<P>>, coarse: Vec<PaddlePin<P>>) -> Self {
        Self { fine, coarse }
    }
}

fn sample<P: InputPin>(pins: &mut [PaddlePin<P>]) -> u8 {
    pins.iter_mut().fold(0, |mask, p| match p.pin.is_low() {
        Ok(true) => mask | p.mask,
        Ok(false) => mask,
        Err(e) => {
            warn!("paddle pin 0x{:02x} unreadable: {:?}", p.mask, e);
            mask
        }
    })
}

impl<P: InputPin> PaddleInputPort for PinPaddleInputs<P> {
    fn read(&mut self) -> PaddleInputs {
        PaddleInputs {
            fine: sample(&mut self.fine),
            coarse: sample(&mut self.coarse),
        }
    }
}
