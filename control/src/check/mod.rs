pub mod util;

pub use util::*;

use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// General interface for a single, composable risk check.
///
/// See [`CheckHigherThan`] for a simple example. The control-plane gate (`crate::gate`) composes
/// several such checks in a fixed order.
pub trait RiskCheck {
    type Input;
    type Error;

    fn name() -> &'static str;

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error>;
}

/// Validates that an input value does not exceed an upper limit. Used for the max-notional gate
/// (spec.md §4.8).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Deserialize, Serialize, Constructor)]
pub struct CheckHigherThan<T> {
    pub limit: T,
}

impl<T> RiskCheck for CheckHigherThan<T>
where
    T: Clone + PartialOrd,
{
    type Input = T;
    type Error = CheckHigherThanError<T>;

    fn name() -> &'static str {
        "CheckHigherThan"
    }

    fn check(&self, input: &Self::Input) -> Result<(), Self::Error> {
        if input > &self.limit {
            Err(CheckHigherThanError {
                input: input.clone(),
                limit: self.limit.clone(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Error, Constructor,
)]
#[error("CheckHigherThan failed: input {input:?} > limit {limit:?}")]
pub struct CheckHigherThanError<T> {
    pub input: T,
    pub limit: T,
}
