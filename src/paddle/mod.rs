//! Hand paddle state machines.
//!
//! Two sources drive the same per-axis latch logic:
//!
//! | Source                          | Tiers         | Speed from             | E/W limit gate |
//! |---------------------------------|---------------|------------------------|----------------|
//! | [`physical::Paddles`]           | fine + coarse | paddle speed switches  | yes            |
//! | [`virtual_paddle::VirtualPaddles`] | coarse     | protocol slew code     | no             |
//!
//! Each axis holds at most one latched [`PaddleDirection`].  A direction
//! starts its motor only when the axis is free and stops it only when the
//! latch holds that exact direction, so North and South (or East and West)
//! can never be latched together.
//!
//! The two sources keep separate latches.  A virtual press on an axis the
//! physical paddle already holds starts the motor again, and releasing
//! either source stops the axis while the other may still be latched.
//!
//! ## Switch bits
//!
//! ```text
//!  fine:   bit0 N  bit1 S  bit2 E  bit3 W  bit4 guide speed
//!  coarse: bit0 N  bit1 S  bit2 E  bit3 W  bit4 speed A / slew  bit5 speed B
//! ```

pub mod physical;
pub mod virtual_paddle;

use serde::Serialize;

use crate::app::ports::MotorPort;
use crate::config::PaddleRates;

// ── Switch masks ──────────────────────────────────────────────

pub const NORTH_MASK: u8 = 0x01;
pub const SOUTH_MASK: u8 = 0x02;
pub const EAST_MASK: u8 = 0x04;
pub const WEST_MASK: u8 = 0x08;

/// Fine paddle: guide-speed toggle.
pub const FINE_GUIDE_MASK: u8 = 0x10;
/// Coarse paddle: first speed switch (the single slew switch at Perth).
pub const COARSE_SPEED_A_MASK: u8 = 0x10;
/// Coarse paddle: second speed switch (New Zealand only).
pub const COARSE_SPEED_B_MASK: u8 = 0x20;

// ── Types ─────────────────────────────────────────────────────

/// Telescope axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Ra,
    Dec,
}

/// Paddle speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    Fine,
    Coarse,
}

/// Selected paddle speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VelocityMode {
    Guide,
    Set,
    Slew,
}

/// A latched direction: which paddle tier and which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaddleDirection {
    FineNorth,
    FineSouth,
    FineEast,
    FineWest,
    CoarseNorth,
    CoarseSouth,
    CoarseEast,
    CoarseWest,
}

impl PaddleDirection {
    /// Evaluation order for one tier.
    pub const FINE: [Self; 4] = [Self::FineNorth, Self::FineSouth, Self::FineEast, Self::FineWest];
    pub const COARSE: [Self; 4] = [
        Self::CoarseNorth,
        Self::CoarseSouth,
        Self::CoarseEast,
        Self::CoarseWest,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Self::FineNorth | Self::FineSouth | Self::CoarseNorth | Self::CoarseSouth => Axis::Dec,
            _ => Axis::Ra,
        }
    }

    pub fn tier(self) -> Tier {
        match self {
            Self::FineNorth | Self::FineSouth | Self::FineEast | Self::FineWest => Tier::Fine,
            _ => Tier::Coarse,
        }
    }

    /// +1 for North/East, -1 for South/West.
    pub fn sign(self) -> f64 {
        match self {
            Self::FineNorth | Self::FineEast | Self::CoarseNorth | Self::CoarseEast => 1.0,
            _ => -1.0,
        }
    }

    /// Switch bit for this direction within its tier's mask.
    pub fn mask(self) -> u8 {
        match self {
            Self::FineNorth | Self::CoarseNorth => NORTH_MASK,
            Self::FineSouth | Self::CoarseSouth => SOUTH_MASK,
            Self::FineEast | Self::CoarseEast => EAST_MASK,
            Self::FineWest | Self::CoarseWest => WEST_MASK,
        }
    }

    fn is_east(self) -> bool {
        matches!(self, Self::FineEast | Self::CoarseEast)
    }

    fn is_west(self) -> bool {
        matches!(self, Self::FineWest | Self::CoarseWest)
    }
}

/// Rate in arcsec/s for a tier and mode.
pub fn rate_for(rates: &PaddleRates, tier: Tier, mode: VelocityMode) -> f64 {
    match (tier, mode) {
        (_, VelocityMode::Guide) => rates.guide,
        (Tier::Fine, VelocityMode::Set) => rates.fine_set,
        (Tier::Coarse, VelocityMode::Set) => rates.coarse_set,
        (_, VelocityMode::Slew) => rates.slew,
    }
}

/// A motor start or stop issued by a paddle check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PaddleTransition {
    Pressed { direction: PaddleDirection, velocity: f64 },
    Released { direction: PaddleDirection },
}

/// Transitions from one check; at most one per evaluated direction.
pub type Transitions = heapless::Vec<PaddleTransition, 8>;

/// RA limit state sampled once per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitGate {
    pub east: bool,
    pub west: bool,
}

impl LimitGate {
    /// No limit gating (virtual paddles).
    pub const OPEN: Self = Self { east: true, west: true };

    pub fn sample(limits: &impl crate::app::ports::LimitPort) -> Self {
        Self {
            east: limits.can_move_east(),
            west: limits.can_move_west(),
        }
    }
}

// ── Shared latch state ────────────────────────────────────────

/// Per-axis latches shared by both paddle kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaddleState {
    /// Accumulated guide motion, reset by the guider.
    pub ra_guide_acc: f64,
    pub dec_guide_acc: f64,
    pub ra: Option<PaddleDirection>,
    pub dec: Option<PaddleDirection>,
}

impl PaddleState {
    fn latch(&mut self, axis: Axis) -> &mut Option<PaddleDirection> {
        match axis {
            Axis::Ra => &mut self.ra,
            Axis::Dec => &mut self.dec,
        }
    }

    /// True if a button is latched on `axis`.
    pub fn pressed(&self, axis: Axis) -> bool {
        match axis {
            Axis::Ra => self.ra.is_some(),
            Axis::Dec => self.dec.is_some(),
        }
    }

    /// Apply one direction's switch state.
    ///
    /// `permitted` gates starts only; a latched direction always releases.
    pub(crate) fn evaluate(
        &mut self,
        direction: PaddleDirection,
        switch_on: bool,
        permitted: bool,
        rate: f64,
        motors: &mut impl MotorPort,
    ) -> Option<PaddleTransition> {
        let axis = direction.axis();
        let latch = self.latch(axis);
        if switch_on {
            if latch.is_none() && permitted {
                *latch = Some(direction);
                let velocity = direction.sign() * rate;
                motors.start_paddle(axis, velocity);
                return Some(PaddleTransition::Pressed { direction, velocity });
            }
        } else if *latch == Some(direction) {
            *latch = None;
            motors.stop_paddle(axis);
            return Some(PaddleTransition::Released { direction });
        }
        None
    }

    /// Evaluate one tier's four directions against `mask`.
    pub(crate) fn evaluate_tier(
        &mut self,
        directions: &[PaddleDirection; 4],
        mask: u8,
        rate: f64,
        gate: LimitGate,
        motors: &mut impl MotorPort,
        out: &mut Transitions,
    ) {
        for &direction in directions {
            let permitted = if direction.is_east() {
                gate.east
            } else if direction.is_west() {
                gate.west
            } else {
                true
            };
            let switch_on = mask & direction.mask() != 0;
            if let Some(t) = self.evaluate(direction, switch_on, permitted, rate, motors) {
                // Capacity covers every direction of both tiers.
                let _ = out.push(t);
            }
        }
    }
}
