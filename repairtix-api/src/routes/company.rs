/// Company profile and location endpoints
///
/// # Endpoints
///
/// - `GET|PUT /v1/company` - Current company profile
/// - `POST|GET /v1/locations` - Create/list locations
/// - `GET|PUT|DELETE /v1/locations/:id`

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
    models::{
        company::{Company, UpdateCompany},
        location::{CreateLocation, Location, UpdateLocation},
    },
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

/// Update company request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub settings: Option<JsonValue>,
}

/// Create location request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Update location request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Get the authenticated user's company
pub async fn get_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Company>> {
    auth.require("company:read")?;

    let company = Company::find_by_id(&state.db, auth.company_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(company))
}

/// Update the company profile
pub async fn update_company(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<Company>> {
    auth.require("company:manage")?;
    req.validate().map_err(validation_errors)?;

    let company = Company::update(
        &state.db,
        auth.company_id,
        UpdateCompany {
            name: req.name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            settings: req.settings,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(company))
}

/// Create a location
pub async fn create_location(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateLocationRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Location>)> {
    auth.require("locations:write")?;
    req.validate().map_err(validation_errors)?;

    let location = Location::create(
        &state.db,
        auth.company_id,
        CreateLocation {
            name: req.name,
            address: req.address,
            phone: req.phone,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(location)))
}

/// List the company's locations
pub async fn list_locations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Location>>> {
    auth.require("locations:read")?;

    let locations = Location::list_by_company(&state.db, auth.company_id).await?;

    Ok(Json(locations))
}

/// Get one location
pub async fn get_location(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Location>> {
    auth.require("locations:read")?;

    let location = Location::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

/// Update a location
pub async fn update_location(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateLocationRequest>,
) -> ApiResult<Json<Location>> {
    auth.require("locations:write")?;
    req.validate().map_err(validation_errors)?;

    let location = Location::update(
        &state.db,
        auth.company_id,
        id,
        UpdateLocation {
            name: req.name,
            address: req.address,
            phone: req.phone,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

/// Soft-delete a location
pub async fn delete_location(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("locations:write")?;

    let deleted = Location::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Location not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
