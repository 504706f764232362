//! Hard-wired hand paddles.
//!
//! Each check reads both switch masks, picks the speed mode for each tier,
//! then walks fine N, S, E, W followed by coarse N, S, E, W.

use log::debug;
use serde::Serialize;

use crate::app::ports::{LimitPort, MotorPort, PaddleInputs};
use crate::config::{PaddleRates, Site};

use super::{
    COARSE_SPEED_A_MASK, COARSE_SPEED_B_MASK, FINE_GUIDE_MASK, LimitGate, PaddleDirection,
    PaddleState, Tier, Transitions, VelocityMode, rate_for,
};

/// Physical paddle state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paddles {
    #[serde(skip)]
    site: Site,
    #[serde(skip)]
    rates: PaddleRates,
    pub state: PaddleState,
    pub fine_mode: VelocityMode,
    pub coarse_mode: VelocityMode,
}

impl Paddles {
    pub fn new(site: Site, rates: PaddleRates) -> Self {
        Self {
            site,
            rates,
            state: PaddleState::default(),
            fine_mode: VelocityMode::Set,
            coarse_mode: VelocityMode::Set,
        }
    }

    /// Fine tier speed: the guide toggle selects `Guide`, otherwise `Set`.
    pub fn fine_mode_for(mask: u8) -> VelocityMode {
        if mask & FINE_GUIDE_MASK != 0 {
            VelocityMode::Guide
        } else {
            VelocityMode::Set
        }
    }

    /// Coarse tier speed, which depends on how the site wired its switches.
    pub fn coarse_mode_for(site: Site, mask: u8) -> VelocityMode {
        let a = mask & COARSE_SPEED_A_MASK != 0;
        let b = mask & COARSE_SPEED_B_MASK != 0;
        match site {
            Site::NewZealand if a && b => VelocityMode::Set,
            Site::NewZealand if b => VelocityMode::Guide,
            Site::NewZealand => VelocityMode::Slew,
            Site::Perth if a => VelocityMode::Slew,
            Site::Perth => VelocityMode::Set,
        }
    }

    /// Read the switches once and start or stop motors to match.
    pub fn check(
        &mut self,
        inputs: PaddleInputs,
        hw: &mut (impl MotorPort + LimitPort),
    ) -> Transitions {
        let mut out = Transitions::new();
        let gate = LimitGate::sample(&*hw);

        self.fine_mode = Self::fine_mode_for(inputs.fine);
        let fine_rate = rate_for(&self.rates, Tier::Fine, self.fine_mode);
        self.state.evaluate_tier(
            &PaddleDirection::FINE,
            inputs.fine,
            fine_rate,
            gate,
            hw,
            &mut out,
        );

        self.coarse_mode = Self::coarse_mode_for(self.site, inputs.coarse);
        let coarse_rate = rate_for(&self.rates, Tier::Coarse, self.coarse_mode);
        self.state.evaluate_tier(
            &PaddleDirection::COARSE,
            inputs.coarse,
            coarse_rate,
            gate,
            hw,
            &mut out,
        );

        if !out.is_empty() {
            debug!("paddle: {:?}", out);
        }
        out
    }
}
