//! Network-driven paddle.
//!
//! The four virtual buttons are set by inbound protocol letters a–e and
//! read here every tick.  Only the coarse tier exists, the speed comes from
//! the slew code carried by the last button press, and there is no RA
//! limit gate.
//!
//! A lost "release" must never leave a motor running, so the buttons carry
//! a generation counter bumped by every protocol update.  If the counter
//! has not moved for longer than the configured timeout, all four buttons
//! are cleared before evaluation.

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::MotorPort;
use crate::config::PaddleRates;

use super::{LimitGate, PaddleDirection, PaddleState, Tier, Transitions, VelocityMode, rate_for};

// ── Buttons ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VirtualButton {
    North,
    South,
    East,
    West,
}

/// Speed code sent with a virtual button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlewSpeed {
    /// Code 0; leaves the current coarse mode unchanged.
    Unspecified,
    Guide,
    Set,
    Slew,
}

impl SlewSpeed {
    pub const MAX_CODE: i64 = 3;

    /// Display names, indexed by wire code.
    pub const LABELS: [&'static str; 4] = ["", "CGuide", "CSet", "CSlew"];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unspecified),
            1 => Some(Self::Guide),
            2 => Some(Self::Set),
            3 => Some(Self::Slew),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }

    pub fn mode(self) -> Option<VelocityMode> {
        match self {
            Self::Unspecified => None,
            Self::Guide => Some(VelocityMode::Guide),
            Self::Set => Some(VelocityMode::Set),
            Self::Slew => Some(VelocityMode::Slew),
        }
    }
}

/// The virtual button map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VirtualButtons {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
    #[serde(skip)]
    generation: u32,
}

impl VirtualButtons {
    /// Press one button; its opposite on the same axis is released.
    pub fn press(&mut self, button: VirtualButton) {
        match button {
            VirtualButton::North => {
                self.north = true;
                self.south = false;
            }
            VirtualButton::South => {
                self.south = true;
                self.north = false;
            }
            VirtualButton::East => {
                self.east = true;
                self.west = false;
            }
            VirtualButton::West => {
                self.west = true;
                self.east = false;
            }
        }
        self.touch();
    }

    /// Release all four buttons (protocol `e`).
    pub fn release_all(&mut self) {
        self.clear();
        self.touch();
    }

    /// Clear without counting as a protocol update (failsafe).
    pub fn clear(&mut self) {
        self.north = false;
        self.south = false;
        self.east = false;
        self.west = false;
    }

    pub fn is_pressed(&self, button: VirtualButton) -> bool {
        match button {
            VirtualButton::North => self.north,
            VirtualButton::South => self.south,
            VirtualButton::East => self.east,
            VirtualButton::West => self.west,
        }
    }

    pub fn any_pressed(&self) -> bool {
        self.north || self.south || self.east || self.west
    }

    /// Bumped by every protocol update, pressed or released.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Buttons as a coarse switch mask.
    fn mask(&self) -> u8 {
        let mut mask = 0;
        for (on, direction) in [self.north, self.south, self.east, self.west]
            .into_iter()
            .zip(PaddleDirection::COARSE)
        {
            if on {
                mask |= direction.mask();
            }
        }
        mask
    }
}

// ── State machine ─────────────────────────────────────────────

/// Virtual paddle state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualPaddles {
    #[serde(skip)]
    rates: PaddleRates,
    #[serde(skip)]
    timeout_ms: u64,
    pub state: PaddleState,
    pub coarse_mode: VelocityMode,
    #[serde(skip)]
    seen_generation: Option<u32>,
    #[serde(skip)]
    last_activity_ms: u64,
}

impl VirtualPaddles {
    pub fn new(rates: PaddleRates, timeout_ms: u64) -> Self {
        Self {
            rates,
            timeout_ms,
            state: PaddleState::default(),
            coarse_mode: VelocityMode::Slew,
            seen_generation: None,
            last_activity_ms: 0,
        }
    }

    /// Evaluate the buttons at `now_ms`.
    ///
    /// `buttons` is cleared in place when the failsafe trips.
    pub fn check(
        &mut self,
        buttons: &mut VirtualButtons,
        speed: SlewSpeed,
        now_ms: u64,
        motors: &mut impl MotorPort,
    ) -> Transitions {
        if self.seen_generation != Some(buttons.generation()) {
            self.seen_generation = Some(buttons.generation());
            self.last_activity_ms = now_ms;
        } else if now_ms.saturating_sub(self.last_activity_ms) > self.timeout_ms {
            if buttons.any_pressed() {
                warn!(
                    "virtual paddle: no update for {} ms, releasing buttons",
                    now_ms.saturating_sub(self.last_activity_ms)
                );
            }
            buttons.clear();
        }

        if let Some(mode) = speed.mode() {
            self.coarse_mode = mode;
        }
        let rate = rate_for(&self.rates, Tier::Coarse, self.coarse_mode);

        let mut out = Transitions::new();
        self.state.evaluate_tier(
            &PaddleDirection::COARSE,
            buttons.mask(),
            rate,
            LimitGate::OPEN,
            motors,
            &mut out,
        );
        if !out.is_empty() {
            debug!("virtual paddle: {:?}", out);
        }
        out
    }
}
