use rust_decimal::Decimal;

/// Notional value of an order or RFQ in quote currency, for the max-notional gate.
pub fn calculate_notional(qty: Decimal, price: Decimal) -> Decimal {
    qty * price
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn notional_is_qty_times_price() {
        assert_eq!(calculate_notional(dec!(1_000_000), dec!(1.10)), dec!(1_100_000.00));
    }
}
