use rust_decimal::Decimal;

use super::money::{round_money, FALLBACK_TAX_PERCENT};
use super::resolver::ResolvedLine;

/// How the effective tax percent for a document is chosen.
///
/// Precedence: an explicit caller-supplied percent, then the document's
/// GST flag (disabled means no tax at all), then the agency-wide
/// default, then the hardcoded fallback of 18.
#[derive(Debug, Clone, Default)]
pub struct TaxPolicy {
    pub explicit_percent: Option<Decimal>,
    pub gst_enabled: bool,
    pub default_percent: Option<Decimal>,
}

impl TaxPolicy {
    /// Policy for repricing an existing document. Only a percent the
    /// caller actually sent counts as explicit; the document's stored
    /// percent serves as the default, so turning the GST flag off
    /// without sending a percent zeroes the tax instead of silently
    /// keeping the stored rate.
    pub fn for_existing(
        caller_percent: Option<Decimal>,
        gst_enabled: bool,
        stored_percent: Decimal,
    ) -> Self {
        TaxPolicy {
            explicit_percent: caller_percent,
            gst_enabled,
            default_percent: Some(stored_percent),
        }
    }

    pub fn effective_percent(&self) -> Decimal {
        if let Some(percent) = self.explicit_percent {
            return percent;
        }
        if !self.gst_enabled {
            return Decimal::ZERO;
        }
        self.default_percent.unwrap_or(FALLBACK_TAX_PERCENT)
    }
}

/// Aggregated totals for a quotation or invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Aggregate resolved lines into subtotal, tax and grand total.
///
/// Each aggregation step is rounded independently; this is part of the
/// observable contract, so a cent of drift against it is a bug.
pub fn calculate_totals(lines: &[ResolvedLine], policy: &TaxPolicy) -> DocumentTotals {
    let subtotal = round_money(lines.iter().map(|line| line.line_total).sum());
    let tax_percent = policy.effective_percent();
    let tax_amount = round_money(subtotal * tax_percent / Decimal::ONE_HUNDRED);
    let total = round_money(subtotal + tax_amount);

    DocumentTotals {
        subtotal,
        tax_percent,
        tax_amount,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(total: Decimal) -> ResolvedLine {
        ResolvedLine {
            service_id: None,
            description: "x".to_string(),
            quantity: 1,
            unit_price: total,
            line_total: total,
        }
    }

    #[test]
    fn explicit_percent_wins() {
        let policy = TaxPolicy {
            explicit_percent: Some(dec!(5)),
            gst_enabled: true,
            default_percent: Some(dec!(12)),
        };
        assert_eq!(policy.effective_percent(), dec!(5));
    }

    #[test]
    fn disabled_gst_zeroes_tax() {
        let policy = TaxPolicy {
            explicit_percent: None,
            gst_enabled: false,
            default_percent: Some(dec!(12)),
        };
        assert_eq!(policy.effective_percent(), Decimal::ZERO);
    }

    #[test]
    fn settings_default_applies_before_fallback() {
        let policy = TaxPolicy {
            explicit_percent: None,
            gst_enabled: true,
            default_percent: Some(dec!(12)),
        };
        assert_eq!(policy.effective_percent(), dec!(12));

        let bare = TaxPolicy {
            explicit_percent: None,
            gst_enabled: true,
            default_percent: None,
        };
        assert_eq!(bare.effective_percent(), dec!(18));
    }

    #[test]
    fn stored_percent_ranks_below_the_gst_flag() {
        let policy = TaxPolicy::for_existing(None, false, dec!(18));
        assert_eq!(policy.effective_percent(), Decimal::ZERO);

        let kept = TaxPolicy::for_existing(None, true, dec!(18));
        assert_eq!(kept.effective_percent(), dec!(18));

        let overridden = TaxPolicy::for_existing(Some(dec!(5)), false, dec!(18));
        assert_eq!(overridden.effective_percent(), dec!(5));
    }

    #[test]
    fn totals_round_at_each_step() {
        // Two lines of 10.004 each: already-rounded line totals sum to
        // 20.008, rounded to 20.01 before tax is applied.
        let lines = [line(dec!(10.004)), line(dec!(10.004))];
        let policy = TaxPolicy {
            explicit_percent: Some(dec!(18)),
            gst_enabled: true,
            default_percent: None,
        };

        let totals = calculate_totals(&lines, &policy);
        assert_eq!(totals.subtotal, dec!(20.01));
        // 20.01 * 18% = 3.6018 -> 3.60
        assert_eq!(totals.tax_amount, dec!(3.60));
        assert_eq!(totals.total, dec!(23.61));
    }
}
