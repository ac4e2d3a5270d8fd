//! The pricing core: line-item resolution, document totals, the payment
//! state machine and commission arithmetic.
//!
//! Everything in this module is a pure function of its inputs. The
//! agency-wide default tax percent is passed in explicitly rather than
//! read from the settings store, and all monetary values are
//! `rust_decimal::Decimal` rounded half-up to two decimal places after
//! every aggregation step.

mod commission;
mod money;
mod payment;
mod resolver;
mod totals;

pub use commission::{accrual_status, commission_amount, summarize};
pub use money::{round_money, FALLBACK_TAX_PERCENT};
pub use payment::{apply_payment, PaymentOutcome};
pub use resolver::{resolve_lines, ResolvedLine};
pub use totals::{calculate_totals, DocumentTotals, TaxPolicy};
