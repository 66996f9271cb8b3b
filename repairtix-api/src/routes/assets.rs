/// Asset (customer device) endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/assets`
/// - `GET|PUT|DELETE /v1/assets/:id`
/// - `GET /v1/customers/:id/assets`

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
        asset::{Asset, CreateAsset, UpdateAsset},
        customer::Customer,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create asset request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssetRequest {
    pub customer_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Asset type must be 1-100 characters"))]
    pub asset_type: String,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub imei: Option<String>,
    pub notes: Option<String>,
}

/// Update asset request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, max = 100, message = "Asset type must be 1-100 characters"))]
    pub asset_type: Option<String>,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub imei: Option<String>,
    pub notes: Option<String>,
}

/// Create an asset
///
/// The customer must exist in the caller's company; referencing another
/// company's customer is a 404, not a cross-tenant write.
pub async fn create_asset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateAssetRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Asset>)> {
    auth.require("assets:write")?;
    req.validate().map_err(validation_errors)?;

    Customer::find_by_id(&state.db, auth.company_id, req.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    let asset = Asset::create(
        &state.db,
        auth.company_id,
        CreateAsset {
            customer_id: req.customer_id,
            asset_type: req.asset_type,
            brand: req.brand,
            model: req.model,
            serial_number: req.serial_number,
            imei: req.imei,
            notes: req.notes,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(asset)))
}

/// List assets (paginated)
pub async fn list_assets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Asset>>> {
    auth.require("assets:read")?;

    let (limit, offset) = pagination.bounds();
    let assets = Asset::list(&state.db, auth.company_id, limit, offset).await?;

    Ok(Json(assets))
}

/// List one customer's assets
pub async fn list_customer_assets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Asset>>> {
    auth.require("assets:read")?;

    let assets = Asset::list_by_customer(&state.db, auth.company_id, customer_id).await?;

    Ok(Json(assets))
}

/// Get one asset
pub async fn get_asset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Asset>> {
    auth.require("assets:read")?;

    let asset = Asset::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Asset not found".to_string()))?;

    Ok(Json(asset))
}

/// Update an asset
pub async fn update_asset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssetRequest>,
) -> ApiResult<Json<Asset>> {
    auth.require("assets:write")?;
    req.validate().map_err(validation_errors)?;

    let asset = Asset::update(
        &state.db,
        auth.company_id,
        id,
        UpdateAsset {
            asset_type: req.asset_type,
            brand: req.brand,
            model: req.model,
            serial_number: req.serial_number,
            imei: req.imei,
            notes: req.notes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Asset not found".to_string()))?;

    Ok(Json(asset))
}

/// Soft-delete an asset
pub async fn delete_asset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("assets:write")?;

    let deleted = Asset::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Asset not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
