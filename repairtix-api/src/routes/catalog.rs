/// Inventory catalog endpoints: brands, device models, categories,
/// subcategories.
///
/// # Endpoints
///
/// - `POST|GET /v1/catalog/brands`, `DELETE /v1/catalog/brands/:id`
/// - `POST|GET /v1/catalog/brands/:id/models`, `DELETE /v1/catalog/models/:id`
/// - `POST|GET /v1/catalog/categories`, `DELETE /v1/catalog/categories/:id`
/// - `POST|GET /v1/catalog/categories/:id/subcategories`,
///   `DELETE /v1/catalog/subcategories/:id`

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::catalog::{Brand, Category, DeviceModel, Subcategory},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Shared request body: everything in the catalog is just a name
#[derive(Debug, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

pub async fn create_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Brand>)> {
    auth.require("catalog:write")?;
    req.validate().map_err(validation_errors)?;

    let brand = Brand::create(&state.db, auth.company_id, &req.name).await?;
    Ok((axum::http::StatusCode::CREATED, Json(brand)))
}

pub async fn list_brands(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Brand>>> {
    auth.require("catalog:read")?;

    let brands = Brand::list_by_company(&state.db, auth.company_id).await?;
    Ok(Json(brands))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("catalog:write")?;

    if !Brand::delete(&state.db, auth.company_id, id).await? {
        return Err(ApiError::NotFound("Brand not found".to_string()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn create_model(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(brand_id): Path<Uuid>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<DeviceModel>)> {
    auth.require("catalog:write")?;
    req.validate().map_err(validation_errors)?;

    let model = DeviceModel::create(&state.db, auth.company_id, brand_id, &req.name).await?;
    Ok((axum::http::StatusCode::CREATED, Json(model)))
}

pub async fn list_models(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(brand_id): Path<Uuid>,
) -> ApiResult<Json<Vec<DeviceModel>>> {
    auth.require("catalog:read")?;

    let models = DeviceModel::list_by_brand(&state.db, auth.company_id, brand_id).await?;
    Ok(Json(models))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("catalog:write")?;

    if !DeviceModel::delete(&state.db, auth.company_id, id).await? {
        return Err(ApiError::NotFound("Model not found".to_string()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Category>)> {
    auth.require("catalog:write")?;
    req.validate().map_err(validation_errors)?;

    let category = Category::create(&state.db, auth.company_id, &req.name).await?;
    Ok((axum::http::StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Category>>> {
    auth.require("catalog:read")?;

    let categories = Category::list_by_company(&state.db, auth.company_id).await?;
    Ok(Json(categories))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("catalog:write")?;

    if !Category::delete(&state.db, auth.company_id, id).await? {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn create_subcategory(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(category_id): Path<Uuid>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Subcategory>)> {
    auth.require("catalog:write")?;
    req.validate().map_err(validation_errors)?;

    let subcategory =
        Subcategory::create(&state.db, auth.company_id, category_id, &req.name).await?;
    Ok((axum::http::StatusCode::CREATED, Json(subcategory)))
}

pub async fn list_subcategories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(category_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Subcategory>>> {
    auth.require("catalog:read")?;

    let subcategories =
        Subcategory::list_by_category(&state.db, auth.company_id, category_id).await?;
    Ok(Json(subcategories))
}

pub async fn delete_subcategory(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("catalog:write")?;

    if !Subcategory::delete(&state.db, auth.company_id, id).await? {
        return Err(ApiError::NotFound("Subcategory not found".to_string()));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}
