/// Authentication middleware for Axum
///
/// Validates the bearer token, loads the user row, and injects an
/// [`AuthContext`] into request extensions. The context carries the
/// company id that every tenant-scoped query is filtered by, and the
/// role that permission checks run against.
///
/// Token validation alone is not enough: a user who was deactivated or
/// soft-deleted after their token was issued must still be rejected, so
/// the middleware re-reads the user row on every request.
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, routing::get};
/// use repairtix_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, Company: {}", auth.user_id, auth.company_id)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use super::permissions::UserRole;
use crate::models::user::User;

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Company (tenant) the user belongs to
    pub company_id: Uuid,

    /// The user's role, driving permission checks
    pub role: UserRole,
}

impl AuthContext {
    /// Creates an auth context
    pub fn new(user_id: Uuid, company_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            company_id,
            role,
        }
    }

    /// Checks that this context holds a permission
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::MissingPermission`] when the role's grants do
    /// not cover the permission.
    pub fn require(&self, permission: &str) -> Result<(), AuthzError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthzError::MissingPermission(permission.to_string()))
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The role's grants do not cover the required permission
    #[error("Missing required permission: {0}")]
    MissingPermission(String),
}

/// Error type for the authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// User no longer exists or was deactivated
    AccountDisabled,

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::AccountDisabled => {
                (StatusCode::UNAUTHORIZED, "Account is disabled").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header, confirms the user
/// still exists, is active, and belongs to the company named in the token,
/// then adds an [`AuthContext`] to request extensions.
pub async fn jwt_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = User::find_by_id(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::AccountDisabled)?;

    if !user.is_active || user.company_id != claims.company_id {
        return Err(AuthError::AccountDisabled);
    }

    let auth_context = AuthContext::new(user.id, user.company_id, user.role);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_context_require() {
        let auth = AuthContext::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::Technician);

        assert!(auth.require("tickets:write").is_ok());
        assert!(auth.require("billing:manage").is_err());
    }

    #[test]
    fn test_auth_error_into_response() {
        let err = AuthError::MissingCredentials;
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let err = AuthError::InvalidFormat("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let err = AuthError::DatabaseError("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
