/// Subscription (per-location billing) endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/subscriptions`
/// - `PUT /v1/subscriptions/:id/plan`
/// - `POST /v1/subscriptions/:id/cancel`
///
/// All of these require `billing:manage`, which only owners hold; the
/// recurring charges themselves are driven by the billing worker.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::{
        location::Location,
        subscription::{CreateSubscription, Subscription, SubscriptionPlan},
    },
};
use serde::Deserialize;
use uuid::Uuid;

/// Create subscription request
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub location_id: Uuid,
    pub plan: SubscriptionPlan,
}

/// Plan change request
#[derive(Debug, Deserialize)]
pub struct ChangePlanRequest {
    pub plan: SubscriptionPlan,
}

/// Subscribe a location
///
/// Each location carries at most one subscription.
pub async fn create_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Subscription>)> {
    auth.require("billing:manage")?;

    Location::find_by_id(&state.db, auth.company_id, req.location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    let subscription = Subscription::create(
        &state.db,
        auth.company_id,
        CreateSubscription {
            location_id: req.location_id,
            plan: req.plan,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(subscription)))
}

/// List the company's subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Subscription>>> {
    auth.require("billing:read")?;

    let subscriptions = Subscription::list_by_company(&state.db, auth.company_id).await?;

    Ok(Json(subscriptions))
}

/// Change a subscription's plan
pub async fn change_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangePlanRequest>,
) -> ApiResult<Json<Subscription>> {
    auth.require("billing:manage")?;

    let subscription = Subscription::change_plan(&state.db, auth.company_id, id, req.plan)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;

    Ok(Json(subscription))
}

/// Cancel a subscription
pub async fn cancel_subscription(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Subscription>> {
    auth.require("billing:manage")?;

    let subscription = Subscription::cancel(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subscription not found".to_string()))?;

    Ok(Json(subscription))
}
