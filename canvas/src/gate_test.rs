use async_trait::async_trait;
use futures::executor::block_on;

use super::*;
use crate::holdings::HoldingsChecker;

fn holdings(meets_threshold: bool) -> Holdings {
    Holdings { meets_threshold, display: "42 (0.500% of supply)".into() }
}

struct FixedChecker(bool);

#[async_trait(?Send)]
impl HoldingsChecker for FixedChecker {
    async fn check(&self, _address: &str) -> Result<Holdings, HoldingsError> {
        Ok(holdings(self.0))
    }
}

struct DownChecker;

#[async_trait(?Send)]
impl HoldingsChecker for DownChecker {
    async fn check(&self, _address: &str) -> Result<Holdings, HoldingsError> {
        Err(HoldingsError::Status { status: 503, body: "unavailable".into() })
    }
}

// --- quota ---

#[test]
fn starts_unverified_with_full_quota() {
    let access = AccessState::new();
    assert_eq!(access.tier(), AccessTier::Unverified);
    assert_eq!(access.demo_remaining(), Some(DEMO_LIMIT));
    assert_eq!(access.wallet(), None);
}

#[test]
fn eleventh_gesture_is_rejected() {
    let mut access = AccessState::new();
    for _ in 0..10 {
        access.try_begin_gesture().unwrap();
    }
    assert_eq!(access.demo_used(), 10);
    assert_eq!(access.try_begin_gesture(), Err(GateError::QuotaExceeded { limit: 10 }));
    assert_eq!(access.demo_used(), 10);
    assert_eq!(access.demo_remaining(), Some(0));
}

#[test]
fn demo_usage_never_decreases() {
    let mut access = AccessState::new();
    let mut last = 0;
    for i in 0..25 {
        if i % 7 == 0 {
            access.wallet_connected("W1");
        }
        if i % 5 == 0 {
            access.wallet_disconnected();
        }
        let _ = access.try_begin_gesture();
        assert!(access.demo_used() >= last);
        assert!(access.demo_used() <= DEMO_LIMIT);
        last = access.demo_used();
    }
}

#[test]
fn full_access_skips_the_quota() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    access.resolve("W1", Ok(holdings(true)));
    for _ in 0..50 {
        access.try_begin_gesture().unwrap();
    }
    assert_eq!(access.demo_used(), 0);
    assert_eq!(access.demo_remaining(), None);
}

// --- holdings resolution ---

#[test]
fn passing_check_grants_full() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    assert_eq!(access.resolve("W1", Ok(holdings(true))), Some(AccessTier::Full));
    assert_eq!(access.holdings(), Some("42 (0.500% of supply)"));
}

#[test]
fn failing_threshold_is_demo() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    assert_eq!(access.resolve("W1", Ok(holdings(false))), Some(AccessTier::Demo));
}

#[test]
fn check_error_fails_open_to_demo() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    let tier = access.resolve("W1", Err(HoldingsError::EmptyAddress));
    assert_eq!(tier, Some(AccessTier::Demo));
    assert!(access.try_begin_gesture().is_ok());
}

#[test]
fn stale_result_is_ignored() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    access.wallet_connected("W2");
    assert_eq!(access.resolve("W1", Ok(holdings(true))), None);
    assert_eq!(access.tier(), AccessTier::Unverified);
}

#[test]
fn result_after_disconnect_is_ignored() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    access.wallet_disconnected();
    assert_eq!(access.resolve("W1", Ok(holdings(true))), None);
    assert_eq!(access.tier(), AccessTier::Unverified);
}

#[test]
fn disconnect_drops_full_access_but_keeps_usage() {
    let mut access = AccessState::new();
    access.try_begin_gesture().unwrap();
    access.wallet_connected("W1");
    access.resolve("W1", Ok(holdings(true)));
    access.wallet_disconnected();
    assert_eq!(access.tier(), AccessTier::Unverified);
    assert_eq!(access.demo_used(), 1);
    assert_eq!(access.holdings(), None);
}

#[test]
fn resolve_from_async_checkers() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    let result = block_on(FixedChecker(true).check("W1"));
    assert_eq!(access.resolve("W1", result), Some(AccessTier::Full));

    access.wallet_connected("W2");
    let result = block_on(DownChecker.check("W2"));
    assert_eq!(access.resolve("W2", result), Some(AccessTier::Demo));
}

#[test]
fn tier_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&AccessTier::Full).unwrap(), "\"full\"");
}

#[test]
fn wallet_failure_lands_in_demo() {
    let mut access = AccessState::new();
    access.wallet_connected("W1");
    access.wallet_failed();
    assert_eq!(access.tier(), AccessTier::Demo);
    assert_eq!(access.wallet(), None);
    assert_eq!(access.resolve("W1", Ok(holdings(true))), None);
}
