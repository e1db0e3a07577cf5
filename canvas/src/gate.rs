//! Access gate: demo quota plus an externally verified full-access tier.
//!
//! Gating is advisory. Nothing here is enforced by the server, and a failed
//! holdings check deliberately opens the demo tier rather than blocking
//! drawing, trading strictness for availability.

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

use serde::Serialize;

use crate::consts::DEMO_LIMIT;
use crate::holdings::{Holdings, HoldingsError};

/// Drawing rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    /// No wallet, or its check has not resolved. Quota applies.
    #[default]
    Unverified,
    /// Check resolved below threshold, or failed. Quota applies.
    Demo,
    /// Check passed. No quota.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("demo limit of {limit} strokes reached")]
    QuotaExceeded { limit: u32 },
}

/// Wallet, tier and quota usage for this session.
#[derive(Debug, Clone, Default)]
pub struct AccessState {
    wallet: Option<String>,
    tier: AccessTier,
    demo_used: u32,
    holdings: Option<String>,
}

impl AccessState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tier(&self) -> AccessTier {
        self.tier
    }

    #[must_use]
    pub fn wallet(&self) -> Option<&str> {
        self.wallet.as_deref()
    }

    #[must_use]
    pub fn demo_used(&self) -> u32 {
        self.demo_used
    }

    /// Gestures left under the quota; `None` with full access.
    #[must_use]
    pub fn demo_remaining(&self) -> Option<u32> {
        match self.tier {
            AccessTier::Full => None,
            _ => Some(DEMO_LIMIT.saturating_sub(self.demo_used)),
        }
    }

    /// Display string from the last resolved check.
    #[must_use]
    pub fn holdings(&self) -> Option<&str> {
        self.holdings.as_deref()
    }

    /// Ask to start a draw gesture. Counts one gesture against the quota
    /// unless access is full.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::QuotaExceeded`] once the quota is spent.
    pub fn try_begin_gesture(&mut self) -> Result<(), GateError> {
        if self.tier == AccessTier::Full {
            return Ok(());
        }
        if self.demo_used >= DEMO_LIMIT {
            return Err(GateError::QuotaExceeded { limit: DEMO_LIMIT });
        }
        self.demo_used += 1;
        Ok(())
    }

    /// A wallet connected. Access is unverified until its check resolves.
    pub fn wallet_connected(&mut self, address: impl Into<String>) {
        self.wallet = Some(address.into());
        self.tier = AccessTier::Unverified;
        self.holdings = None;
    }

    /// The wallet went away. Quota usage is kept.
    pub fn wallet_disconnected(&mut self) {
        self.wallet = None;
        self.tier = AccessTier::Unverified;
        self.holdings = None;
    }

    /// Connecting a wallet failed outright. Drawing continues on the quota.
    pub fn wallet_failed(&mut self) {
        self.wallet = None;
        self.tier = AccessTier::Demo;
        self.holdings = None;
    }

    /// Apply the result of the holdings check for `address`.
    ///
    /// Returns the new tier, or `None` when `address` is no longer the
    /// connected wallet and the result was dropped. A failed check lands in
    /// [`AccessTier::Demo`].
    pub fn resolve(&mut self, address: &str, result: Result<Holdings, HoldingsError>) -> Option<AccessTier> {
        if self.wallet.as_deref() != Some(address) {
            log::debug!("dropping stale holdings result for {address}");
            return None;
        }
        match result {
            Ok(holdings) => {
                self.tier = if holdings.meets_threshold { AccessTier::Full } else { AccessTier::Demo };
                self.holdings = Some(holdings.display);
            }
            Err(e) => {
                log::warn!("holdings check failed for {address}, falling back to demo: {e}");
                self.tier = AccessTier::Demo;
                self.holdings = None;
            }
        }
        Some(self.tier)
    }
}
