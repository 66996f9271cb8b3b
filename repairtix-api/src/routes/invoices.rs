/// Invoice endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/invoices`
/// - `GET|DELETE /v1/invoices/:id`
/// - `POST /v1/invoices/:id/send`
/// - `POST /v1/invoices/:id/void`

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
    routes::PaginationParams,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::{
        customer::Customer,
        invoice::{
            CreateInvoice, CreateInvoiceLine, Invoice, InvoiceLine, InvoiceStatus,
        },
        location::Location,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One line in a create request
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Create invoice request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    pub location_id: Uuid,
    pub customer_id: Uuid,
    pub ticket_id: Option<Uuid>,

    /// Tax rate in percent (e.g. 8.25); defaults to 0
    pub tax_rate: Option<Decimal>,

    pub notes: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub lines: Vec<CreateLineRequest>,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Invoice with its lines
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub lines: Vec<InvoiceLine>,
}

/// Create an invoice
///
/// Totals are computed server-side from the lines and the tax rate.
pub async fn create_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateInvoiceRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<InvoiceResponse>)> {
    auth.require("invoices:write")?;
    req.validate().map_err(validation_errors)?;

    if req.lines.is_empty() {
        return Err(ApiError::BadRequest(
            "An invoice needs at least one line".to_string(),
        ));
    }

    for line in &req.lines {
        if line.quantity <= 0 {
            return Err(ApiError::BadRequest("Quantity must be positive".to_string()));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ApiError::BadRequest(
                "Unit price cannot be negative".to_string(),
            ));
        }
    }

    if let Some(tax_rate) = req.tax_rate {
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::from(100) {
            return Err(ApiError::BadRequest(
                "Tax rate must be between 0 and 100".to_string(),
            ));
        }
    }

    Customer::find_by_id(&state.db, auth.company_id, req.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Location::find_by_id(&state.db, auth.company_id, req.location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    let lines = req
        .lines
        .into_iter()
        .map(|l| CreateInvoiceLine {
            inventory_item_id: l.inventory_item_id,
            description: l.description,
            quantity: l.quantity,
            unit_price: l.unit_price,
        })
        .collect();

    let (invoice, lines) = Invoice::create(
        &state.db,
        auth.company_id,
        CreateInvoice {
            location_id: req.location_id,
            customer_id: req.customer_id,
            ticket_id: req.ticket_id,
            tax_rate: req.tax_rate,
            notes: req.notes,
            due_at: req.due_at,
            lines,
        },
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(InvoiceResponse { invoice, lines }),
    ))
}

/// List invoices (paginated, optional filters)
pub async fn list_invoices(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<InvoiceListParams>,
) -> ApiResult<Json<Vec<Invoice>>> {
    auth.require("invoices:read")?;

    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .bounds();

    let invoices = Invoice::list(
        &state.db,
        auth.company_id,
        params.status,
        params.customer_id,
        limit,
        offset,
    )
    .await?;

    Ok(Json(invoices))
}

/// Get an invoice with its lines
pub async fn get_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceResponse>> {
    auth.require("invoices:read")?;

    let invoice = Invoice::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invoice not found".to_string()))?;

    let lines = Invoice::lines(&state.db, invoice.id).await?;

    Ok(Json(InvoiceResponse { invoice, lines }))
}

/// Mark a draft invoice as sent
pub async fn send_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Invoice>> {
    auth.require("invoices:write")?;

    let invoice = Invoice::mark_sent(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Invoice is not in draft status".to_string()))?;

    Ok(Json(invoice))
}

/// Void an unpaid invoice
pub async fn void_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Invoice>> {
    auth.require("invoices:write")?;

    let invoice = Invoice::void(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::Conflict("Invoice cannot be voided".to_string()))?;

    Ok(Json(invoice))
}

/// Soft-delete an invoice
pub async fn delete_invoice(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("invoices:write")?;

    let deleted = Invoice::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Invoice not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
