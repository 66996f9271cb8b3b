/// Payment endpoints
///
/// # Endpoints
///
/// - `POST /v1/payments` - Record a payment against an invoice
/// - `GET /v1/payments` - List payments
/// - `GET /v1/invoices/:id/payments` - Payments for one invoice

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PaginationParams,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::{
        invoice::Invoice,
        payment::{CreatePayment, Payment, PaymentMethod},
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record payment request
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub provider_reference: Option<String>,
    pub notes: Option<String>,
}

/// Record payment response: the payment plus the updated invoice
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub payment: Payment,
    pub invoice: Invoice,
}

/// Record a payment
///
/// The invoice's `amount_paid` accumulates and the invoice flips to
/// `paid` when payments cover the total.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<RecordPaymentRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<RecordPaymentResponse>)> {
    auth.require("payments:write")?;

    let (payment, invoice) = Payment::record(
        &state.db,
        auth.company_id,
        Some(auth.user_id),
        CreatePayment {
            invoice_id: req.invoice_id,
            amount: req.amount,
            method: req.method,
            provider_reference: req.provider_reference,
            notes: req.notes,
        },
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(RecordPaymentResponse { payment, invoice }),
    ))
}

/// List payments (paginated)
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Payment>>> {
    auth.require("payments:read")?;

    let (limit, offset) = pagination.bounds();
    let payments = Payment::list(&state.db, auth.company_id, limit, offset).await?;

    Ok(Json(payments))
}

/// List payments for one invoice
pub async fn list_invoice_payments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invoice_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Payment>>> {
    auth.require("payments:read")?;

    // 404 for invoices outside the caller's company
    Invoice::find_by_id(&state.db, auth.company_id, invoice_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invoice not found".to_string()))?;

    let payments = Payment::list_by_invoice(&state.db, auth.company_id, invoice_id).await?;

    Ok(Json(payments))
}
