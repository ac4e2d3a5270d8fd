use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{CommissionStatus, CommissionSummary, SummaryRow};

use super::money::round_money;

/// Commission owed for a cumulative received amount at a given rate.
pub fn commission_amount(base_amount: Decimal, commission_percent: Decimal) -> Decimal {
    round_money(base_amount * commission_percent / Decimal::ONE_HUNDRED)
}

/// Status assigned on (re)accrual. A zero-amount accrual stays PENDING.
pub fn accrual_status(commission_amount: Decimal) -> CommissionStatus {
    if commission_amount > Decimal::ZERO {
        CommissionStatus::Earned
    } else {
        CommissionStatus::Pending
    }
}

/// Group commissions by sales person, totalling earned, paid and
/// pending amounts. `total_earned` counts every accrual regardless of
/// status; PENDING and EARNED both count as outstanding.
pub fn summarize(rows: &[SummaryRow]) -> Vec<CommissionSummary> {
    let mut by_person: BTreeMap<Uuid, CommissionSummary> = BTreeMap::new();

    for row in rows {
        let entry = by_person
            .entry(row.sales_person_id)
            .or_insert_with(|| CommissionSummary {
                sales_person_id: row.sales_person_id,
                sales_person_name: row.sales_person_name.clone(),
                total_earned: Decimal::ZERO,
                total_paid: Decimal::ZERO,
                total_pending: Decimal::ZERO,
            });

        entry.total_earned += row.commission_amount;

        match CommissionStatus::parse(&row.status) {
            Some(CommissionStatus::Paid) => entry.total_paid += row.commission_amount,
            Some(CommissionStatus::Pending) | Some(CommissionStatus::Earned) => {
                entry.total_pending += row.commission_amount
            }
            None => {}
        }
    }

    by_person.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_is_rounded_half_up() {
        assert_eq!(commission_amount(dec!(30000), dec!(8)), dec!(2400));
        // 333.33 * 7.5% = 24.99975 -> 25.00
        assert_eq!(commission_amount(dec!(333.33), dec!(7.5)), dec!(25.00));
    }

    #[test]
    fn zero_amount_stays_pending() {
        assert_eq!(accrual_status(Decimal::ZERO), CommissionStatus::Pending);
        assert_eq!(accrual_status(dec!(0.01)), CommissionStatus::Earned);
    }

    #[test]
    fn summary_groups_by_sales_person() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let rows = [
            SummaryRow {
                sales_person_id: alice,
                sales_person_name: "Alice".to_string(),
                commission_amount: dec!(2400),
                status: "EARNED".to_string(),
            },
            SummaryRow {
                sales_person_id: alice,
                sales_person_name: "Alice".to_string(),
                commission_amount: dec!(1000),
                status: "PAID".to_string(),
            },
            SummaryRow {
                sales_person_id: bob,
                sales_person_name: "Bob".to_string(),
                commission_amount: dec!(500),
                status: "PENDING".to_string(),
            },
        ];

        let summary = summarize(&rows);
        assert_eq!(summary.len(), 2);

        let for_alice = summary
            .iter()
            .find(|s| s.sales_person_id == alice)
            .unwrap();
        assert_eq!(for_alice.total_earned, dec!(3400));
        assert_eq!(for_alice.total_paid, dec!(1000));
        assert_eq!(for_alice.total_pending, dec!(2400));

        let for_bob = summary.iter().find(|s| s.sales_person_id == bob).unwrap();
        assert_eq!(for_bob.total_earned, dec!(500));
        assert_eq!(for_bob.total_pending, dec!(500));
        assert_eq!(for_bob.total_paid, Decimal::ZERO);
    }
}
