//! Quote type and the ranking algorithm from spec.md §4.4.

use chrono::{DateTime, Utc};
use orion_core::command::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A liquidity provider's response to an RFQ. One-way quotes populate only the side the
/// requester needs (`ask` for a BUY RFQ, `bid` for a SELL RFQ); two-way quotes populate both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: String,
    pub rfq_id: String,
    pub lp_id: String,
    pub bid: Option<Decimal>,
    pub ask: Option<Decimal>,
    pub size: Decimal,
    pub received_at: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Quote {
    /// The price relevant to a requester trading on `side`: the ask for a BUY (they lift the
    /// offer), the bid for a SELL (they hit the bid).
    pub fn price_for(&self, side: Side) -> Option<Decimal> {
        match side {
            Side::Buy => self.ask,
            Side::Sell => self.bid,
        }
    }

    pub fn is_two_way(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }

    pub fn spread(&self) -> Option<Decimal> {
        match (self.ask, self.bid) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|until| now > until)
    }
}

/// A quote's position in the current ranking for its RFQ, published as a derived projection
/// update on every re-rank (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRank {
    pub is_best_bid: bool,
    pub is_best_ask: bool,
    pub is_best_for_side: bool,
}

/// Ranks `quotes` for `side`: primary key is best price for the requester's side (lowest ask
/// for BUY, highest bid for SELL), with tightest-spread as the two-way tie-break and earliest
/// `receivedAt` as the final tie-break. Returns `(quote_id, rank)` pairs in best-to-worst order
/// for `side`; `quotes` with no price on that side are omitted from the ordering but still get
/// `is_best_bid`/`is_best_ask` flags.
pub fn rank_quotes(quotes: &[Quote], side: Side) -> Vec<(String, QuoteRank)> {
    let best_bid_id = quotes
        .iter()
        .filter(|q| q.bid.is_some())
        .min_by(|a, b| {
            b.bid
                .cmp(&a.bid)
                .then_with(|| a.received_at.cmp(&b.received_at))
        })
        .map(|q| q.quote_id.clone());

    let best_ask_id = quotes
        .iter()
        .filter(|q| q.ask.is_some())
        .min_by(|a, b| {
            a.ask
                .cmp(&b.ask)
                .then_with(|| a.received_at.cmp(&b.received_at))
        })
        .map(|q| q.quote_id.clone());

    let mut ordered: Vec<&Quote> = quotes.iter().filter(|q| q.price_for(side).is_some()).collect();
    ordered.sort_by(|a, b| {
        let primary = match side {
            Side::Buy => a.price_for(side).cmp(&b.price_for(side)),
            Side::Sell => b.price_for(side).cmp(&a.price_for(side)),
        };
        primary
            .then_with(|| a.spread().cmp(&b.spread()))
            .then_with(|| a.received_at.cmp(&b.received_at))
    });

    let best_for_side_id = ordered.first().map(|q| q.quote_id.clone());

    quotes
        .iter()
        .map(|q| {
            let rank = QuoteRank {
                is_best_bid: best_bid_id.as_deref() == Some(q.quote_id.as_str()),
                is_best_ask: best_ask_id.as_deref() == Some(q.quote_id.as_str()),
                is_best_for_side: best_for_side_id.as_deref() == Some(q.quote_id.as_str()),
            };
            (q.quote_id.clone(), rank)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(id: &str, bid: Option<Decimal>, ask: Option<Decimal>, secs: i64) -> Quote {
        Quote {
            quote_id: id.to_string(),
            rfq_id: "rfq-1".to_string(),
            lp_id: "lp-1".to_string(),
            bid,
            ask,
            size: dec!(1_000_000),
            received_at: DateTime::UNIX_EPOCH + chrono::Duration::seconds(secs),
            valid_until: None,
        }
    }

    #[test]
    fn buy_side_ranks_lowest_ask_best() {
        let quotes = vec![
            quote("q1", None, Some(dec!(1.1010)), 0),
            quote("q2", None, Some(dec!(1.1005)), 1),
        ];
        let ranking = rank_quotes(&quotes, Side::Buy);
        let q2 = ranking.iter().find(|(id, _)| id == "q2").unwrap();
        assert!(q2.1.is_best_for_side);
    }

    #[test]
    fn tie_break_is_earliest_received_at() {
        let quotes = vec![
            quote("q1", None, Some(dec!(1.1000)), 5),
            quote("q2", None, Some(dec!(1.1000)), 1),
        ];
        let ranking = rank_quotes(&quotes, Side::Buy);
        let q2 = ranking.iter().find(|(id, _)| id == "q2").unwrap();
        assert!(q2.1.is_best_for_side);
    }

    #[test]
    fn best_bid_and_best_ask_are_tracked_independently_of_side() {
        let quotes = vec![
            quote("q1", Some(dec!(1.0990)), Some(dec!(1.1010)), 0),
            quote("q2", Some(dec!(1.0995)), Some(dec!(1.1005)), 1),
        ];
        let ranking = rank_quotes(&quotes, Side::Buy);
        let q2 = ranking.iter().find(|(id, _)| id == "q2").unwrap().1;
        assert!(q2.is_best_bid);
        assert!(q2.is_best_ask);
    }
}
