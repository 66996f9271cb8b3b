/// Customer endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/customers`
/// - `GET /v1/customers/search?q=...`
/// - `GET|PUT|DELETE /v1/customers/:id`

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
    models::customer::{CreateCustomer, Customer, UpdateCustomer},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create customer request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Update customer request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCustomerRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Customer>)> {
    auth.require("customers:write")?;
    req.validate().map_err(validation_errors)?;

    let customer = Customer::create(
        &state.db,
        auth.company_id,
        CreateCustomer {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            notes: req.notes,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(customer)))
}

/// List customers (paginated)
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    auth.require("customers:read")?;

    let (limit, offset) = pagination.bounds();
    let customers = Customer::list(&state.db, auth.company_id, limit, offset).await?;

    Ok(Json(customers))
}

/// Search customers by name, email, or phone
pub async fn search_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Customer>>> {
    auth.require("customers:read")?;

    let customers = Customer::search(&state.db, auth.company_id, &params.q, 50).await?;

    Ok(Json(customers))
}

/// Get one customer
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Customer>> {
    auth.require("customers:read")?;

    let customer = Customer::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCustomerRequest>,
) -> ApiResult<Json<Customer>> {
    auth.require("customers:write")?;
    req.validate().map_err(validation_errors)?;

    let customer = Customer::update(
        &state.db,
        auth.company_id,
        id,
        UpdateCustomer {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            address: req.address,
            notes: req.notes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer))
}

/// Soft-delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("customers:write")?;

    let deleted = Customer::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
