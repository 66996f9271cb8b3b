/// Third-party integration endpoints
///
/// # Endpoints
///
/// - `GET /v1/integrations` - List configured providers (no secrets)
/// - `PUT /v1/integrations/:provider` - Set credentials for a provider
/// - `DELETE /v1/integrations/:provider`
///
/// Credentials are sealed with AES-256-GCM before they touch the
/// database and are never returned by any endpoint.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use repairtix_shared::{auth::middleware::AuthContext, models::integration::Integration};
use serde::{Deserialize, Serialize};

/// Upsert request: the provider's credential document
///
/// Shape is provider-specific, e.g. `{"secret_key": "sk_live_..."}` for
/// Stripe or `{"api_key": "SG...."}` for SendGrid.
#[derive(Debug, Deserialize)]
pub struct UpsertIntegrationRequest {
    pub credentials: serde_json::Value,
}

/// Integration as exposed by the API (no credential material)
#[derive(Debug, Serialize)]
pub struct IntegrationListItem {
    pub id: String,
    pub provider: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Integration> for IntegrationListItem {
    fn from(integration: Integration) -> Self {
        Self {
            id: integration.id.to_string(),
            provider: integration.provider,
            enabled: integration.enabled,
            created_at: integration.created_at,
            updated_at: integration.updated_at,
        }
    }
}

/// List configured integrations
pub async fn list_integrations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<IntegrationListItem>>> {
    auth.require("integrations:manage")?;

    let integrations = Integration::list_by_company(&state.db, auth.company_id).await?;

    Ok(Json(
        integrations
            .into_iter()
            .map(IntegrationListItem::from)
            .collect(),
    ))
}

/// Set (or replace) a provider's credentials
pub async fn upsert_integration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(provider): Path<String>,
    Json(req): Json<UpsertIntegrationRequest>,
) -> ApiResult<Json<IntegrationListItem>> {
    auth.require("integrations:manage")?;

    let provider = provider.to_lowercase();
    if provider.is_empty() || provider.len() > 50 {
        return Err(ApiError::BadRequest("Invalid provider name".to_string()));
    }

    let plaintext = serde_json::to_string(&req.credentials)
        .map_err(|e| ApiError::BadRequest(format!("Invalid credentials document: {}", e)))?;

    let sealed = state.cipher.seal(&plaintext)?;

    let integration =
        Integration::upsert(&state.db, auth.company_id, &provider, &sealed).await?;

    Ok(Json(integration.into()))
}

/// Remove a provider's credentials
pub async fn delete_integration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(provider): Path<String>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("integrations:manage")?;

    let deleted = Integration::delete(&state.db, auth.company_id, &provider.to_lowercase()).await?;
    if !deleted {
        return Err(ApiError::NotFound("Integration not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
