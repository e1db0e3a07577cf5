//! Read-only status snapshot for the presentation layer, published at a
//! capped rate independent of the paint cadence.

#[cfg(test)]
#[path = "hud_test.rs"]
mod hud_test;

use serde::Serialize;

use crate::consts::HUD_INTERVAL_MS;
use crate::gate::AccessTier;
use crate::sync::ConnectionStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub stroke_count: usize,
    pub connection: ConnectionStatus,
    pub access: AccessTier,
    /// `None` with full access.
    pub demo_remaining: Option<u32>,
    pub holdings: Option<String>,
}

/// Lets one snapshot through per [`HUD_INTERVAL_MS`].
#[derive(Debug, Clone, Default)]
pub struct HudThrottle {
    last_ms: Option<f64>,
}

impl HudThrottle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot is due at `now_ms`. Marks it taken when it is.
    pub fn ready(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_ms {
            if now_ms - last < HUD_INTERVAL_MS {
                return false;
            }
        }
        self.last_ms = Some(now_ms);
        true
    }

    /// Let the next call through regardless of timing.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
