/// Team member and invitation endpoints
///
/// # Endpoints
///
/// - `GET /v1/users` - List team members
/// - `PUT /v1/users/:id/role` - Change a member's role
/// - `DELETE /v1/users/:id` - Deactivate a member
/// - `POST|GET /v1/invitations` - Invite / list invitations
/// - `POST /v1/invitations/:id/revoke` - Revoke an invitation
/// - `POST /v1/invitations/accept` - Accept an invitation (public)
///
/// The plaintext invitation token is returned once on creation; the
/// production deployment emails it to the invitee. A revoked, expired,
/// or already-used token is rejected by the accept endpoint.

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use repairtix_shared::{
    auth::{jwt, middleware::AuthContext, password, permissions::UserRole},
    models::{
        invitation::{CreateInvitation, Invitation},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Team member as exposed by the API (no password hash)
#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserListItem {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Change role request
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

/// Create invitation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: UserRole,
}

/// Create invitation response
#[derive(Debug, Serialize)]
pub struct CreateInvitationResponse {
    pub id: String,
    pub email: String,
    pub role: UserRole,

    /// The plaintext token (ONLY returned on creation)
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

/// Invitation list item (no token)
#[derive(Debug, Serialize)]
pub struct InvitationListItem {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Accept invitation request
#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Accept invitation response
#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    pub user_id: String,
    pub company_id: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// List team members
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<UserListItem>>> {
    auth.require("users:read")?;

    let users = User::list_by_company(&state.db, auth.company_id).await?;

    Ok(Json(users.into_iter().map(UserListItem::from).collect()))
}

/// Change a team member's role
///
/// A user cannot change their own role; demoting the last owner would
/// lock the company out.
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<Json<UserListItem>> {
    auth.require("users:manage")?;

    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot change your own role".to_string(),
        ));
    }

    let user = User::set_role(&state.db, auth.company_id, id, req.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Deactivate a team member
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("users:manage")?;

    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    let deactivated = User::deactivate(&state.db, auth.company_id, id).await?;
    if !deactivated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}

/// Invite a new team member
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateInvitationRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<CreateInvitationResponse>)> {
    auth.require("users:manage")?;
    req.validate().map_err(validation_errors)?;

    // Only owners can hand out the owner role
    if req.role == UserRole::Owner {
        auth.require("company:manage")?;
    }

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let (invitation, token) = Invitation::create(
        &state.db,
        CreateInvitation {
            company_id: auth.company_id,
            email: req.email,
            role: req.role,
            invited_by: auth.user_id,
        },
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateInvitationResponse {
            id: invitation.id.to_string(),
            email: invitation.email,
            role: invitation.role,
            token,
            expires_at: invitation.expires_at,
        }),
    ))
}

/// List the company's invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<InvitationListItem>>> {
    auth.require("users:read")?;

    let invitations = Invitation::list_by_company(&state.db, auth.company_id).await?;

    let items = invitations
        .into_iter()
        .map(|inv| InvitationListItem {
            id: inv.id.to_string(),
            email: inv.email,
            role: inv.role,
            expires_at: inv.expires_at,
            accepted_at: inv.accepted_at,
            revoked_at: inv.revoked_at,
            created_at: inv.created_at,
        })
        .collect();

    Ok(Json(items))
}

/// Revoke an invitation
///
/// A revoked invitation can never be accepted, even if the token is
/// already in the invitee's inbox.
pub async fn revoke_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require("users:manage")?;

    let revoked = Invitation::revoke(&state.db, auth.company_id, id).await?;
    if !revoked {
        return Err(ApiError::NotFound("Invitation not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "revoked": true })))
}

/// Accept an invitation (public endpoint)
///
/// Creates the user with the invited role and returns tokens so the new
/// member lands signed in.
pub async fn accept_invitation(
    State(state): State<AppState>,
    Json(req): Json<AcceptInvitationRequest>,
) -> ApiResult<Json<AcceptInvitationResponse>> {
    req.validate().map_err(validation_errors)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let invitation = Invitation::find_acceptable(&state.db, &req.token)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invitation is invalid, expired, or revoked".to_string())
        })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            company_id: invitation.company_id,
            email: invitation.email.clone(),
            password_hash,
            full_name: req.full_name,
            role: invitation.role,
        },
    )
    .await?;

    Invitation::mark_accepted(&state.db, invitation.id).await?;

    let access_claims = jwt::Claims::new(user.id, user.company_id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, user.company_id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(AcceptInvitationResponse {
        user_id: user.id.to_string(),
        company_id: user.company_id.to_string(),
        access_token,
        refresh_token,
    }))
}
