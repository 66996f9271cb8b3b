/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a company with its owner account
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
///
/// Registration bootstraps the whole tenant: the company, the owner user,
/// a default location, and a trial subscription for that location.

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use repairtix_shared::{
    auth::{jwt, password, permissions::UserRole},
    models::{
        company::{Company, CreateCompany},
        location::{CreateLocation, Location},
        subscription::{CreateSubscription, Subscription, SubscriptionPlan},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Shop/business name
    #[validate(length(min = 1, max = 255, message = "Company name must be 1-255 characters"))]
    pub company_name: String,

    /// Owner email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Owner password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Owner display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub company_id: String,
    pub location_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub company_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Register a new company and its owner
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(validation_errors)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let company = Company::create(
        &state.db,
        CreateCompany {
            name: req.company_name,
            email: Some(req.email.clone()),
            phone: None,
        },
    )
    .await?;

    let user = User::create(
        &state.db,
        CreateUser {
            company_id: company.id,
            email: req.email,
            password_hash,
            full_name: req.full_name,
            role: UserRole::Owner,
        },
    )
    .await?;

    // Every company starts with one location and a trial subscription on it
    let location = Location::create(
        &state.db,
        company.id,
        CreateLocation {
            name: "Main".to_string(),
            address: None,
            phone: None,
        },
    )
    .await?;

    Subscription::create(
        &state.db,
        company.id,
        CreateSubscription {
            location_id: location.id,
            plan: SubscriptionPlan::Trial,
        },
    )
    .await?;

    let access_claims = jwt::Claims::new(user.id, company.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, company.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        company_id: company.id.to_string(),
        location_id: location.id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Login endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials or deactivated account
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_errors)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::Unauthorized("Account is disabled".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.company_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.company_id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        company_id: user.company_id.to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
