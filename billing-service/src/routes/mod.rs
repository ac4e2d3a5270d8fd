use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{
    catalog::{create_service, delete_service, get_service, list_services, update_service},
    commissions::{commission_summary, list_commissions, mark_commission_paid},
    invoices::{
        create_invoice, delete_invoice, get_invoice, list_invoices, record_payment, update_invoice,
    },
    quotations::{
        create_quotation, delete_quotation, get_quotation, list_quotations, update_quotation,
    },
    settings::{get_settings, update_settings},
};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Service catalog
        .route("/services", post(create_service).get(list_services))
        .route(
            "/services/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
        // Quotations
        .route("/quotations", post(create_quotation).get(list_quotations))
        .route(
            "/quotations/:id",
            get(get_quotation)
                .put(update_quotation)
                .delete(delete_quotation),
        )
        // Invoices
        .route("/invoices", post(create_invoice).get(list_invoices))
        .route(
            "/invoices/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/:id/payments", post(record_payment))
        // Commissions
        .route("/commissions", get(list_commissions))
        .route("/commissions/summary", get(commission_summary))
        .route("/commissions/:id/mark-paid", post(mark_commission_paid))
        // Settings
        .route("/settings", get(get_settings).put(update_settings))
}
