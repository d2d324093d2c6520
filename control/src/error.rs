use orion_macros::IntoCommandError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoCommandError)]
pub enum ControlError {
    #[code(KillSwitchActive)]
    #[error("kill switch active")]
    KillSwitchActive,

    #[code(Forbidden)]
    #[error("caller is not entitled to {0}")]
    NotEntitled(String),

    #[code(RateLimited)]
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[code(ValidationFailed)]
    #[error("notional {notional} exceeds ceiling {ceiling}")]
    NotionalExceeded {
        notional: rust_decimal::Decimal,
        ceiling: rust_decimal::Decimal,
    },
}
