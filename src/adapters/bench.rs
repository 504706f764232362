//! Bench hardware adapter.
//!
//! Stands in for the telescope drive electronics when the controller runs
//! on a desk: motor commands are logged (repeats suppressed), the RA
//! limits are always clear and the paddle switches read as released
//! unless a [`PaddleInputPort`] is plugged in.

use log::info;

use crate::app::ports::{LimitPort, MotorPort, PaddleInputPort, PaddleInputs, SafetyPort};
use crate::paddle::Axis;

pub struct BenchHardware<I = NoSwitches, S = AlwaysSafe> {
    inputs: I,
    safety: S,
    ra: Option<f64>,
    dec: Option<f64>,
}

/// Switches that are never pressed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSwitches;

impl PaddleInputPort for NoSwitches {
    fn read(&mut self) -> PaddleInputs {
        PaddleInputs::default()
    }
}

/// Interlock that always permits motion.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysSafe;

impl SafetyPort for AlwaysSafe {
    fn motion_permitted(&self) -> bool {
        true
    }
}

impl BenchHardware {
    pub fn new() -> Self {
        Self::with_ports(NoSwitches, AlwaysSafe)
    }
}

impl Default for BenchHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, S> BenchHardware<I, S> {
    pub fn with_ports(inputs: I, safety: S) -> Self {
        Self {
            inputs,
            safety,
            ra: None,
            dec: None,
        }
    }

    /// Current commanded velocity of `axis`, if running.
    pub fn velocity(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Ra => self.ra,
            Axis::Dec => self.dec,
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut Option<f64> {
        match axis {
            Axis::Ra => &mut self.ra,
            Axis::Dec => &mut self.dec,
        }
    }
}

impl<I, S> MotorPort for BenchHardware<I, S> {
    fn start_paddle(&mut self, axis: Axis, velocity: f64) {
        let slot = self.slot(axis);
        if *slot != Some(velocity) {
            *slot = Some(velocity);
            info!("bench: {:?} motor at {:.3}", axis, velocity);
        }
    }

    fn stop_paddle(&mut self, axis: Axis) {
        if self.slot(axis).take().is_some() {
            info!("bench: {:?} motor stopped", axis);
        }
    }
}

impl<I, S> LimitPort for BenchHardware<I, S> {
    fn can_move_east(&self) -> bool {
        true
    }

    fn can_move_west(&self) -> bool {
        true
    }
}

impl<I: PaddleInputPort, S> PaddleInputPort for BenchHardware<I, S> {
    fn read(&mut self) -> PaddleInputs {
        self.inputs.read()
    }
}

impl<I, S: SafetyPort> SafetyPort for BenchHardware<I, S> {
    fn motion_permitted(&self) -> bool {
        self.safety.motion_permitted()
    }
}
