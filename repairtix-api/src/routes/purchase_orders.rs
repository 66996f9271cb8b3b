/// Purchase order endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/purchase-orders`
/// - `GET|DELETE /v1/purchase-orders/:id`
/// - `POST /v1/purchase-orders/:id/order` - Mark placed with the supplier
/// - `POST /v1/purchase-orders/:id/receive` - Record a delivery
/// - `POST /v1/purchase-orders/:id/cancel`

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
    routes::PaginationParams,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::{
        inventory::InventoryItem,
        location::Location,
        purchase_order::{
            CreatePurchaseOrder, CreatePurchaseOrderItem, PurchaseOrder, PurchaseOrderItem,
            PurchaseOrderStatus, ReceiveLine,
        },
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One line in a create request
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    pub inventory_item_id: Uuid,
    pub description: Option<String>,
    pub quantity_ordered: i32,
    pub unit_cost: Decimal,
}

/// Create purchase order request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseOrderRequest {
    pub location_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Supplier name must be 1-255 characters"))]
    pub supplier_name: String,

    pub reference: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<CreateLineRequest>,
}

/// Receive request: quantities that arrived per line
#[derive(Debug, Deserialize)]
pub struct ReceiveRequest {
    pub lines: Vec<ReceiveLine>,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct PoListParams {
    pub status: Option<PurchaseOrderStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Purchase order with its lines
#[derive(Debug, Serialize)]
pub struct PurchaseOrderResponse {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreatePurchaseOrderRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<PurchaseOrderResponse>)> {
    auth.require("purchase-orders:write")?;
    req.validate().map_err(validation_errors)?;

    if req.items.is_empty() {
        return Err(ApiError::BadRequest(
            "A purchase order needs at least one line".to_string(),
        ));
    }

    Location::find_by_id(&state.db, auth.company_id, req.location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    let mut items = Vec::with_capacity(req.items.len());
    for line in req.items {
        if line.quantity_ordered <= 0 {
            return Err(ApiError::BadRequest(
                "Ordered quantity must be positive".to_string(),
            ));
        }

        // Every line must reference an item in this company
        InventoryItem::find_by_id(&state.db, auth.company_id, line.inventory_item_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

        items.push(CreatePurchaseOrderItem {
            inventory_item_id: line.inventory_item_id,
            description: line.description,
            quantity_ordered: line.quantity_ordered,
            unit_cost: line.unit_cost,
        });
    }

    let (order, items) = PurchaseOrder::create(
        &state.db,
        auth.company_id,
        CreatePurchaseOrder {
            location_id: req.location_id,
            supplier_name: req.supplier_name,
            reference: req.reference,
            notes: req.notes,
            items,
        },
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(PurchaseOrderResponse { order, items }),
    ))
}

/// List purchase orders (paginated, optional status filter)
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PoListParams>,
) -> ApiResult<Json<Vec<PurchaseOrder>>> {
    auth.require("purchase-orders:read")?;

    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .bounds();

    let orders =
        PurchaseOrder::list(&state.db, auth.company_id, params.status, limit, offset).await?;

    Ok(Json(orders))
}

/// Get a purchase order with its lines
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrderResponse>> {
    auth.require("purchase-orders:read")?;

    let order = PurchaseOrder::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Purchase order not found".to_string()))?;

    let items = PurchaseOrder::items(&state.db, order.id).await?;

    Ok(Json(PurchaseOrderResponse { order, items }))
}

/// Mark a draft order as placed with the supplier
pub async fn mark_ordered(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("purchase-orders:write")?;

    let order = PurchaseOrder::mark_ordered(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Purchase order is not in draft status".to_string())
        })?;

    Ok(Json(order))
}

/// Record a delivery
///
/// Receiving increments inventory on-hand for each line in the same
/// transaction and derives the order status (partially_received or
/// received).
pub async fn receive(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReceiveRequest>,
) -> ApiResult<Json<PurchaseOrderResponse>> {
    auth.require("purchase-orders:write")?;

    if req.lines.is_empty() {
        return Err(ApiError::BadRequest(
            "A receipt needs at least one line".to_string(),
        ));
    }

    let order = PurchaseOrder::receive(&state.db, auth.company_id, id, req.lines)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Purchase order is not receivable".to_string())
        })?;

    let items = PurchaseOrder::items(&state.db, order.id).await?;

    Ok(Json(PurchaseOrderResponse { order, items }))
}

/// Cancel an order that has not received stock
pub async fn cancel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PurchaseOrder>> {
    auth.require("purchase-orders:write")?;

    let order = PurchaseOrder::cancel(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(
                "Purchase order cannot be canceled after receiving stock".to_string(),
            )
        })?;

    Ok(Json(order))
}

/// Soft-delete a purchase order
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("purchase-orders:write")?;

    let deleted = PurchaseOrder::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Purchase order not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
