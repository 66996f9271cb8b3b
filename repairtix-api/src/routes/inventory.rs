/// Inventory endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/inventory`
/// - `GET /v1/inventory/low-stock`
/// - `GET|PUT|DELETE /v1/inventory/:id`
/// - `POST /v1/inventory/:id/adjust`

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
    models::inventory::{CreateInventoryItem, InventoryItem, UpdateInventoryItem},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create item request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 100, message = "SKU must be 1-100 characters"))]
    pub sku: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,

    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity_on_hand: Option<i32>,

    #[validate(range(min = 0, message = "Reorder level cannot be negative"))]
    pub reorder_level: Option<i32>,

    pub cost_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

/// Update item request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 100, message = "SKU must be 1-100 characters"))]
    pub sku: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,

    #[validate(range(min = 0, message = "Reorder level cannot be negative"))]
    pub reorder_level: Option<i32>,

    pub cost_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

/// Stock adjustment request
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    /// Signed delta; negative consumes stock
    pub delta: i32,
}

/// Item list query parameters
#[derive(Debug, Deserialize)]
pub struct ItemListParams {
    /// Search over SKU and name
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create an inventory item
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<InventoryItem>)> {
    auth.require("inventory:write")?;
    req.validate().map_err(validation_errors)?;

    let item = InventoryItem::create(
        &state.db,
        auth.company_id,
        CreateInventoryItem {
            sku: req.sku,
            name: req.name,
            description: req.description,
            category_id: req.category_id,
            subcategory_id: req.subcategory_id,
            brand_id: req.brand_id,
            model_id: req.model_id,
            quantity_on_hand: req.quantity_on_hand,
            reorder_level: req.reorder_level,
            cost_price: req.cost_price,
            retail_price: req.retail_price,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(item)))
}

/// List items (paginated, optional search)
pub async fn list_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ItemListParams>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    auth.require("inventory:read")?;

    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .bounds();

    let items =
        InventoryItem::list(&state.db, auth.company_id, params.q.as_deref(), limit, offset)
            .await?;

    Ok(Json(items))
}

/// List items at or below their reorder level
pub async fn list_low_stock(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    auth.require("inventory:read")?;

    let items = InventoryItem::list_below_reorder(&state.db, auth.company_id).await?;

    Ok(Json(items))
}

/// Get one item
pub async fn get_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InventoryItem>> {
    auth.require("inventory:read")?;

    let item = InventoryItem::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

    Ok(Json(item))
}

/// Update an item's descriptive fields
pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<InventoryItem>> {
    auth.require("inventory:write")?;
    req.validate().map_err(validation_errors)?;

    let item = InventoryItem::update(
        &state.db,
        auth.company_id,
        id,
        UpdateInventoryItem {
            sku: req.sku,
            name: req.name,
            description: req.description,
            category_id: req.category_id,
            subcategory_id: req.subcategory_id,
            brand_id: req.brand_id,
            model_id: req.model_id,
            reorder_level: req.reorder_level,
            cost_price: req.cost_price,
            retail_price: req.retail_price,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

    Ok(Json(item))
}

/// Adjust stock by a signed delta
///
/// Over-drawing (a delta that would take the quantity below zero) is a
/// 409, not a clamp to zero.
pub async fn adjust_quantity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustRequest>,
) -> ApiResult<Json<InventoryItem>> {
    auth.require("inventory:write")?;

    if req.delta == 0 {
        return Err(ApiError::BadRequest("Delta cannot be zero".to_string()));
    }

    // Distinguish "not found" from "would go negative" for the error code
    let existing = InventoryItem::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Inventory item not found".to_string()))?;

    let item = InventoryItem::adjust_quantity(&state.db, auth.company_id, id, req.delta)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict(format!(
                "Adjustment would take quantity below zero (on hand: {})",
                existing.quantity_on_hand
            ))
        })?;

    Ok(Json(item))
}

/// Soft-delete an item
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("inventory:write")?;

    let deleted = InventoryItem::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Inventory item not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
