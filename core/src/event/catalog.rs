//! The closed(-ish) set of recognised `eventType`/`entityType` values.
//!
//! [`EventType`] is deliberately *not* a plain `#[derive(Serialize, Deserialize)]` enum: the
//! wire format requires forward compatibility ("Unknown types on deserialization are preserved
//! as opaque strings so consumers may ignore them"), so serialization round-trips through a
//! plain string and an unrecognised value is kept as [`EventType::Other`] rather than failing to
//! deserialize.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! event_type_catalog {
    ($($variant:ident => $wire:literal),+ $(,)?) => {
        /// A recognised (or, via [`EventType::Other`], unrecognised-but-preserved) domain event
        /// type. See spec.md §4.1 for the canonical catalog this enumerates.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum EventType {
            $($variant,)+
            /// Any `eventType` string not in the catalog above. Preserved verbatim so that
            /// consumers built against an older catalog version can safely ignore additive
            /// event types introduced later (schema evolution rule, spec.md §4.1).
            Other(String),
        }

        impl EventType {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(s) => s.as_str(),
                }
            }
        }

        impl From<&str> for EventType {
            fn from(value: &str) -> Self {
                match value {
                    $($wire => Self::$variant,)+
                    other => Self::Other(other.to_owned()),
                }
            }
        }
    };
}

event_type_catalog! {
    // Market data
    MarketTickReceived => "MarketTickReceived",
    MarketSnapshotUpdated => "MarketSnapshotUpdated",
    MarketDataStaleDetected => "MarketDataStaleDetected",
    // RFQ
    RfqCreated => "RFQCreated",
    RfqSent => "RFQSent",
    QuoteReceived => "QuoteReceived",
    RfqQuoteRanking => "RFQQuoteRanking",
    QuoteAccepted => "QuoteAccepted",
    RfqExpired => "RFQExpired",
    RfqCancelled => "RFQCancelled",
    QuoteAcceptanceRejected => "QuoteAcceptanceRejected",
    // Order
    OrderPlaced => "OrderPlaced",
    OrderAcknowledged => "OrderAcknowledged",
    OrderRejected => "OrderRejected",
    OrderCancelled => "OrderCancelled",
    OrderAmended => "OrderAmended",
    OrderFilled => "OrderFilled",
    // Execution
    TradeExecuted => "TradeExecuted",
    // Post-trade
    TradeConfirmed => "TradeConfirmed",
    SettlementRequested => "SettlementRequested",
    SettlementCompleted => "SettlementCompleted",
    SettlementFailed => "SettlementFailed",
    // Risk / admin
    RiskLimitBreached => "RiskLimitBreached",
    KillSwitchEnabled => "KillSwitchEnabled",
    KillSwitchDisabled => "KillSwitchDisabled",
    InstrumentUpdated => "InstrumentUpdated",
    VenueUpdated => "VenueUpdated",
    LpConfigUpdated => "LPConfigUpdated",
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(EventType::from(raw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_type_round_trips() {
        let t = EventType::TradeExecuted;
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"TradeExecuted\"");
        let back: EventType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn unknown_type_is_preserved_not_rejected() {
        let json = "\"SomeFutureEventType\"";
        let parsed: EventType = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, EventType::Other("SomeFutureEventType".to_owned()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }
}
