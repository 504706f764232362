//! Shared safety interlock flag.
//!
//! Weather or enclosure monitors on other threads flip the flag; the
//! control loop reads it through [`SafetyPort`] when admitting dome
//! commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::ports::SafetyPort;

#[derive(Debug, Clone)]
pub struct SafetyFlag {
    permitted: Arc<AtomicBool>,
}

impl SafetyFlag {
    pub fn new(permitted: bool) -> Self {
        Self {
            permitted: Arc::new(AtomicBool::new(permitted)),
        }
    }

    pub fn set(&self, permitted: bool) {
        let was = self.permitted.swap(permitted, Ordering::AcqRel);
        if was != permitted {
            if permitted {
                info!("safety: motion permitted");
            } else {
                warn!("safety: motion inhibited");
            }
        }
    }
}

impl SafetyPort for SafetyFlag {
    fn motion_permitted(&self) -> bool {
        self.permitted.load(Ordering::Acquire)
    }
}
