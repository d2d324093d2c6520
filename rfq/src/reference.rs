//! Instrument & venue reference data (supplemented feature: §4.4's `createRFQ` validates
//! "instrument exists and is active" and size against min/max/lot-size, which requires a
//! reference-data store even though the distilled spec never names one explicitly).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRef {
    pub instrument_id: String,
    pub asset_class: String,
    pub lot_size: Decimal,
    pub min_size: Decimal,
    pub max_size: Decimal,
    pub active: bool,
    /// Whether quotes for this instrument must be two-way (carry both a bid and an ask).
    /// Resolves the "for two-way RFQs, missing bid or ask" rejection reason to a per-instrument
    /// property rather than a per-command flag.
    pub requires_two_way: bool,
    pub updated_at: DateTime<Utc>,
}

impl InstrumentRef {
    pub fn new(
        instrument_id: impl Into<String>,
        asset_class: impl Into<String>,
        lot_size: Decimal,
        min_size: Decimal,
        max_size: Decimal,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            asset_class: asset_class.into(),
            lot_size,
            min_size,
            max_size,
            active: true,
            requires_two_way: false,
            updated_at: Utc::now(),
        }
    }

    pub fn with_two_way(mut self, requires_two_way: bool) -> Self {
        self.requires_two_way = requires_two_way;
        self
    }

    /// Validates a requested RFQ size against this instrument's bounds. Non-multiple-of-lot
    /// sizes are a warning only, not a rejection (spec.md §4.4).
    pub fn validate_size(&self, size: Decimal) -> Result<Vec<SizeWarning>, SizeViolation> {
        if size < self.min_size {
            return Err(SizeViolation::BelowMinimum {
                min: self.min_size,
            });
        }
        if size > self.max_size {
            return Err(SizeViolation::AboveMaximum {
                max: self.max_size,
            });
        }

        let mut warnings = Vec::new();
        if !self.lot_size.is_zero() && size % self.lot_size != Decimal::ZERO {
            warnings.push(SizeWarning::NotLotMultiple {
                lot_size: self.lot_size,
            });
        }
        Ok(warnings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SizeViolation {
    #[error("size below instrument minimum {min}")]
    BelowMinimum { min: Decimal },
    #[error("size above instrument maximum {max}")]
    AboveMaximum { max: Decimal },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeWarning {
    NotLotMultiple { lot_size: Decimal },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRef {
    pub venue_id: String,
    pub name: String,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn instrument() -> InstrumentRef {
        InstrumentRef::new("EURUSD", "fx_spot", dec!(1000), dec!(1000), dec!(10_000_000))
    }

    #[test]
    fn rejects_size_below_minimum() {
        assert_eq!(
            instrument().validate_size(dec!(500)),
            Err(SizeViolation::BelowMinimum { min: dec!(1000) })
        );
    }

    #[test]
    fn warns_but_accepts_non_lot_multiple() {
        let warnings = instrument().validate_size(dec!(1500)).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn accepts_lot_multiple_with_no_warnings() {
        let warnings = instrument().validate_size(dec!(2000)).unwrap();
        assert!(warnings.is_empty());
    }
}
