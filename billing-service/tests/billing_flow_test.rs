//! End-to-end pricing flows over the pure calculation layer: resolve
//! lines, total them, apply payments, accrue commission.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use service_core::AppError;
use uuid::Uuid;

use billing_service::models::{CommissionStatus, InvoiceStatus, LineInput, PaymentStatus, Service};
use billing_service::pricing::{
    accrual_status, apply_payment, calculate_totals, commission_amount, resolve_lines,
    round_money, TaxPolicy,
};

fn catalog_with(service: Service) -> HashMap<Uuid, Service> {
    let mut map = HashMap::new();
    map.insert(service.id, service);
    map
}

fn sample_service(name: &str, base_price: Decimal) -> Service {
    Service {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        base_price,
        tax_percent: dec!(18),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn line(description: &str, quantity: i32, unit_price: Decimal) -> LineInput {
    LineInput {
        service_id: None,
        description: Some(description.to_string()),
        quantity: Some(quantity),
        unit_price: Some(unit_price),
    }
}

fn gst_policy(percent: Decimal) -> TaxPolicy {
    TaxPolicy {
        explicit_percent: Some(percent),
        gst_enabled: true,
        default_percent: None,
    }
}

#[test]
fn two_units_at_twenty_five_thousand_with_gst() {
    let lines = vec![line("Website development", 2, dec!(25000))];
    let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();
    let totals = calculate_totals(&resolved, &gst_policy(dec!(18)));

    assert_eq!(resolved[0].line_total, dec!(50000.00));
    assert_eq!(totals.subtotal, dec!(50000.00));
    assert_eq!(totals.tax_amount, dec!(9000.00));
    assert_eq!(totals.total, dec!(59000.00));
}

#[test]
fn partial_payment_leaves_balance_and_partial_status() {
    let outcome = apply_payment(dec!(59000), Decimal::ZERO, dec!(30000)).unwrap();

    assert_eq!(outcome.amount_received, dec!(30000.00));
    assert_eq!(outcome.balance, dec!(29000.00));
    assert_eq!(outcome.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(outcome.payment_status, PaymentStatus::Partial);
}

#[test]
fn commission_accrues_on_amount_received() {
    let outcome = apply_payment(dec!(59000), Decimal::ZERO, dec!(30000)).unwrap();

    let amount = commission_amount(outcome.amount_received, dec!(8));
    assert_eq!(amount, dec!(2400.00));
    assert_eq!(accrual_status(amount), CommissionStatus::Earned);
}

#[test]
fn settling_payment_recomputes_commission_from_cumulative_base() {
    let first = apply_payment(dec!(59000), Decimal::ZERO, dec!(30000)).unwrap();
    let second = apply_payment(dec!(59000), first.amount_received, dec!(29000)).unwrap();

    assert_eq!(second.amount_received, dec!(59000.00));
    assert_eq!(second.balance, dec!(0.00));
    assert_eq!(second.status, InvoiceStatus::Paid);
    assert_eq!(second.payment_status, PaymentStatus::Paid);

    // Base is the cumulative amount received, not the increment. A
    // commission previously marked PAID would revert to EARNED here;
    // its paid_amount/paid_at snapshot survives the recompute.
    let amount = commission_amount(second.amount_received, dec!(8));
    assert_eq!(amount, dec!(4720.00));
    assert_eq!(accrual_status(amount), CommissionStatus::Earned);
}

#[test]
fn empty_item_list_is_rejected() {
    let err = resolve_lines(&[], &HashMap::new()).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn unknown_service_id_is_named_in_error() {
    let missing = Uuid::new_v4();
    let lines = vec![LineInput {
        service_id: Some(missing),
        ..Default::default()
    }];

    let err = resolve_lines(&lines, &HashMap::new()).unwrap_err();
    match err {
        AppError::NotFound(source) => {
            assert!(source.to_string().contains(&missing.to_string()));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn snapshot_price_survives_catalog_edits() {
    let mut service = sample_service("SEO audit", dec!(12000));
    let service_id = service.id;

    let lines = vec![LineInput {
        service_id: Some(service_id),
        ..Default::default()
    }];
    let before = resolve_lines(&lines, &catalog_with(service.clone())).unwrap();
    assert_eq!(before[0].unit_price, dec!(12000));
    assert_eq!(before[0].description, "SEO audit");

    // A catalog price change must not leak into lines that carry an
    // explicit snapshot.
    service.base_price = dec!(15000);
    let snapshot: Vec<LineInput> = before
        .iter()
        .map(|r| LineInput {
            service_id: r.service_id,
            description: Some(r.description.clone()),
            quantity: Some(r.quantity),
            unit_price: Some(r.unit_price),
        })
        .collect();
    let after = resolve_lines(&snapshot, &catalog_with(service)).unwrap();
    assert_eq!(after[0].unit_price, dec!(12000));
}

#[test]
fn received_plus_balance_always_equals_total() {
    let total = dec!(10000);
    let mut received = Decimal::ZERO;

    for amount in [dec!(1234.56), dec!(0.01), dec!(5000), dec!(9999.99)] {
        let outcome = apply_payment(total, received, amount).unwrap();
        assert_eq!(
            round_money(outcome.amount_received + outcome.balance),
            total
        );
        assert!(outcome.amount_received >= received);
        received = outcome.amount_received;
    }

    assert_eq!(received, total);
}

#[test]
fn overpayment_caps_at_total_exactly() {
    let outcome = apply_payment(dec!(1000), dec!(900), dec!(500)).unwrap();

    assert_eq!(outcome.amount_received, dec!(1000.00));
    assert_eq!(outcome.balance, dec!(0.00));
    assert_eq!(outcome.status, InvoiceStatus::Paid);
}

#[test]
fn repricing_unchanged_lines_is_idempotent() {
    let lines = vec![
        line("Logo design", 1, dec!(7999.99)),
        line("Hosting (annual)", 3, dec!(1500)),
    ];
    let policy = gst_policy(dec!(18));

    let first = calculate_totals(&resolve_lines(&lines, &HashMap::new()).unwrap(), &policy);
    let second = calculate_totals(&resolve_lines(&lines, &HashMap::new()).unwrap(), &policy);

    assert_eq!(first, second);
}

#[test]
fn disabling_gst_on_update_zeroes_tax() {
    // A quotation stored at 18% is updated with gst_enabled = false and
    // no tax percent of its own. The stored percent is only a default,
    // so the flag wins and tax drops to zero.
    let lines = vec![line("Brand retainer", 1, dec!(50000))];
    let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();

    let totals = calculate_totals(&resolved, &TaxPolicy::for_existing(None, false, dec!(18)));
    assert_eq!(totals.tax_percent, Decimal::ZERO);
    assert_eq!(totals.tax_amount, Decimal::ZERO);
    assert_eq!(totals.total, dec!(50000.00));
}

#[test]
fn update_without_tax_fields_keeps_stored_percent() {
    let lines = vec![line("Brand retainer", 1, dec!(50000))];
    let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();

    let totals = calculate_totals(&resolved, &TaxPolicy::for_existing(None, true, dec!(18)));
    assert_eq!(totals.tax_percent, dec!(18));
    assert_eq!(totals.tax_amount, dec!(9000.00));
    assert_eq!(totals.total, dec!(59000.00));
}

#[test]
fn reenabling_gst_needs_an_explicit_percent_to_restore_tax() {
    // A document created with GST off stored a 0% rate. Re-enabling the
    // flag alone keeps 0% until the caller sends a percent.
    let lines = vec![line("Brand retainer", 1, dec!(50000))];
    let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();

    let reenabled = calculate_totals(
        &resolved,
        &TaxPolicy::for_existing(None, true, Decimal::ZERO),
    );
    assert_eq!(reenabled.tax_amount, Decimal::ZERO);

    let restored = calculate_totals(
        &resolved,
        &TaxPolicy::for_existing(Some(dec!(18)), true, Decimal::ZERO),
    );
    assert_eq!(restored.tax_percent, dec!(18));
    assert_eq!(restored.tax_amount, dec!(9000.00));
}

#[test]
fn disabled_gst_zeroes_tax_unless_percent_is_explicit() {
    let lines = vec![line("Consulting", 1, dec!(1000))];
    let resolved = resolve_lines(&lines, &HashMap::new()).unwrap();

    let no_gst = calculate_totals(
        &resolved,
        &TaxPolicy {
            explicit_percent: None,
            gst_enabled: false,
            default_percent: Some(dec!(18)),
        },
    );
    assert_eq!(no_gst.tax_amount, dec!(0));
    assert_eq!(no_gst.total, dec!(1000.00));

    let explicit = calculate_totals(
        &resolved,
        &TaxPolicy {
            explicit_percent: Some(dec!(12)),
            gst_enabled: false,
            default_percent: Some(dec!(18)),
        },
    );
    assert_eq!(explicit.tax_percent, dec!(12));
    assert_eq!(explicit.tax_amount, dec!(120.00));
}
