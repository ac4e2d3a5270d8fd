use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Tax percent applied when neither the caller nor the agency settings
/// supply one.
pub const FALLBACK_TAX_PERCENT: Decimal = dec!(18);

/// Round a monetary value half-up to two decimal places.
///
/// Applied independently at every aggregation step (line total,
/// subtotal, tax, grand total), never deferred to the end.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn leaves_exact_values_untouched() {
        assert_eq!(round_money(dec!(59000)), dec!(59000));
        assert_eq!(round_money(dec!(0.10)), dec!(0.10));
    }
}
