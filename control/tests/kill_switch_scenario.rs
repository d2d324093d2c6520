//! Seed end-to-end scenario 4 (spec.md §8): the kill switch blocks new commands the instant
//! it's enabled, and commands succeed again once it's disabled.

use orion_control::{
    evaluate, CallerLimits, CommandKind, ControlError, Entitlement, KillSwitchState,
    RateLimitConfig, RateLimiters,
};
use rust_decimal_macros::dec;

fn limits() -> CallerLimits {
    CallerLimits {
        entitlement: Entitlement::unrestricted(),
        max_notional: None,
    }
}

#[test]
fn kill_switch_blocks_then_unblocks_commands_for_the_tenant() {
    let mut kill_switch = KillSwitchState::default();
    let rate_limiters = RateLimiters::new(RateLimitConfig::default());

    assert!(evaluate(
        &kill_switch,
        &rate_limiters,
        "t1",
        "trader-1",
        CommandKind::Rfq,
        &limits(),
        "fx_spot",
        "EURUSD",
        None,
        dec!(1_000_000),
        dec!(1.08),
    )
    .is_ok());

    kill_switch.enable(Some("t1"));
    let err = evaluate(
        &kill_switch,
        &rate_limiters,
        "t1",
        "trader-1",
        CommandKind::Rfq,
        &limits(),
        "fx_spot",
        "EURUSD",
        None,
        dec!(1_000_000),
        dec!(1.08),
    )
    .unwrap_err();
    assert_eq!(err, ControlError::KillSwitchActive);

    // A different tenant is unaffected by a per-tenant kill switch.
    assert!(evaluate(
        &kill_switch,
        &rate_limiters,
        "t2",
        "trader-2",
        CommandKind::Rfq,
        &limits(),
        "fx_spot",
        "EURUSD",
        None,
        dec!(1_000_000),
        dec!(1.08),
    )
    .is_ok());

    kill_switch.disable(Some("t1"));
    assert!(evaluate(
        &kill_switch,
        &rate_limiters,
        "t1",
        "trader-1",
        CommandKind::Rfq,
        &limits(),
        "fx_spot",
        "EURUSD",
        None,
        dec!(1_000_000),
        dec!(1.08),
    )
    .is_ok());
}
