use rust_decimal::Decimal;

use service_core::AppError;

use crate::models::{InvoiceStatus, PaymentStatus};

use super::money::round_money;

/// Result of applying a payment to an invoice's running totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub amount_received: Decimal,
    pub balance: Decimal,
    pub status: InvoiceStatus,
    pub payment_status: PaymentStatus,
}

/// Apply a received amount to an invoice.
///
/// The cumulative amount received is capped at the invoice total;
/// excess is silently dropped rather than rejected. The caller is
/// responsible for rejecting payments against cancelled invoices.
pub fn apply_payment(
    total: Decimal,
    current_received: Decimal,
    amount: Decimal,
) -> Result<PaymentOutcome, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(anyhow::anyhow!(
            "Payment amount must be greater than zero"
        )));
    }

    let amount_received = round_money(current_received + amount).min(total);
    let balance = round_money(total - amount_received);

    let (status, payment_status) = if amount_received >= total {
        (InvoiceStatus::Paid, PaymentStatus::Paid)
    } else if amount_received > Decimal::ZERO {
        (InvoiceStatus::PartiallyPaid, PaymentStatus::Partial)
    } else {
        (InvoiceStatus::Sent, PaymentStatus::Pending)
    };

    Ok(PaymentOutcome {
        amount_received,
        balance,
        status,
        payment_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn partial_payment() {
        let outcome = apply_payment(dec!(59000), Decimal::ZERO, dec!(30000)).unwrap();
        assert_eq!(outcome.amount_received, dec!(30000));
        assert_eq!(outcome.balance, dec!(29000));
        assert_eq!(outcome.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(outcome.payment_status, PaymentStatus::Partial);
    }

    #[test]
    fn exact_settlement() {
        let outcome = apply_payment(dec!(59000), dec!(30000), dec!(29000)).unwrap();
        assert_eq!(outcome.amount_received, dec!(59000));
        assert_eq!(outcome.balance, Decimal::ZERO);
        assert_eq!(outcome.status, InvoiceStatus::Paid);
        assert_eq!(outcome.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn overpayment_is_capped_at_total() {
        let outcome = apply_payment(dec!(1000), dec!(900), dec!(500)).unwrap();
        assert_eq!(outcome.amount_received, dec!(1000));
        assert_eq!(outcome.balance, Decimal::ZERO);
        assert_eq!(outcome.status, InvoiceStatus::Paid);
    }

    #[test]
    fn zero_or_negative_amount_is_rejected() {
        assert!(apply_payment(dec!(1000), Decimal::ZERO, Decimal::ZERO).is_err());
        assert!(apply_payment(dec!(1000), Decimal::ZERO, dec!(-5)).is_err());
    }

    #[test]
    fn received_plus_balance_equals_total() {
        let mut received = Decimal::ZERO;
        for amount in [dec!(123.45), dec!(0.01), dec!(876.54), dec!(5000)] {
            let outcome = apply_payment(dec!(1000), received, amount).unwrap();
            assert_eq!(
                round_money(outcome.amount_received + outcome.balance),
                dec!(1000)
            );
            assert!(outcome.amount_received >= received, "never decreases");
            received = outcome.amount_received;
        }
    }
}
