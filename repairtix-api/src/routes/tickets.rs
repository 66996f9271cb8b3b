/// Ticket endpoints
///
/// # Endpoints
///
/// - `POST|GET /v1/tickets`
/// - `GET|PUT|DELETE /v1/tickets/:id`
/// - `PUT /v1/tickets/:id/status`
/// - `PUT /v1/tickets/:id/assign`

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
    routes::PaginationParams,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use repairtix_shared::{
    auth::middleware::AuthContext,
    models::{
        customer::Customer,
        location::Location,
        ticket::{
            CreateTicket, Ticket, TicketFilter, TicketPriority, TicketStatus, UpdateTicket,
        },
        user::User,
    },
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create ticket request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    pub location_id: Uuid,
    pub customer_id: Uuid,
    pub asset_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Subject must be 1-255 characters"))]
    pub subject: String,

    pub problem_description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub quoted_total: Option<Decimal>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Update ticket request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTicketRequest {
    #[validate(length(min = 1, max = 255, message = "Subject must be 1-255 characters"))]
    pub subject: Option<String>,

    pub problem_description: Option<String>,
    pub diagnosis: Option<String>,
    pub resolution: Option<String>,
    pub priority: Option<TicketPriority>,
    pub quoted_total: Option<Decimal>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: TicketStatus,
}

/// Assignment request; `user_id: null` unassigns
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: Option<Uuid>,
}

/// Ticket list query parameters
#[derive(Debug, Deserialize)]
pub struct TicketListParams {
    pub status: Option<TicketStatus>,
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create a ticket
///
/// Both the customer and the location are checked against the caller's
/// company before the insert.
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTicketRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<Ticket>)> {
    auth.require("tickets:write")?;
    req.validate().map_err(validation_errors)?;

    Customer::find_by_id(&state.db, auth.company_id, req.customer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Location::find_by_id(&state.db, auth.company_id, req.location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    let ticket = Ticket::create(
        &state.db,
        auth.company_id,
        CreateTicket {
            location_id: req.location_id,
            customer_id: req.customer_id,
            asset_id: req.asset_id,
            subject: req.subject,
            problem_description: req.problem_description,
            priority: req.priority,
            quoted_total: req.quoted_total,
            due_at: req.due_at,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(ticket)))
}

/// List tickets with filters (paginated)
pub async fn list_tickets(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<TicketListParams>,
) -> ApiResult<Json<Vec<Ticket>>> {
    auth.require("tickets:read")?;

    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .bounds();
    let tickets = Ticket::list(
        &state.db,
        auth.company_id,
        TicketFilter {
            status: params.status,
            customer_id: params.customer_id,
            location_id: params.location_id,
            assigned_to: params.assigned_to,
        },
        limit,
        offset,
    )
    .await?;

    Ok(Json(tickets))
}

/// Get one ticket
pub async fn get_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Ticket>> {
    auth.require("tickets:read")?;

    let ticket = Ticket::find_by_id(&state.db, auth.company_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(ticket))
}

/// Update a ticket's editable fields
pub async fn update_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTicketRequest>,
) -> ApiResult<Json<Ticket>> {
    auth.require("tickets:write")?;
    req.validate().map_err(validation_errors)?;

    let ticket = Ticket::update(
        &state.db,
        auth.company_id,
        id,
        UpdateTicket {
            subject: req.subject,
            problem_description: req.problem_description,
            diagnosis: req.diagnosis,
            resolution: req.resolution,
            priority: req.priority,
            quoted_total: req.quoted_total,
            due_at: req.due_at,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(ticket))
}

/// Move a ticket to a new status
pub async fn set_ticket_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Ticket>> {
    auth.require("tickets:write")?;

    let ticket = Ticket::set_status(&state.db, auth.company_id, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(ticket))
}

/// Assign or unassign a technician
pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<Ticket>> {
    auth.require("tickets:write")?;

    if let Some(user_id) = req.user_id {
        User::find_in_company(&state.db, auth.company_id, user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    }

    let ticket = Ticket::assign(&state.db, auth.company_id, id, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))?;

    Ok(Json(ticket))
}

/// Soft-delete a ticket
pub async fn delete_ticket(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<axum::http::StatusCode> {
    auth.require("tickets:write")?;

    let deleted = Ticket::delete(&state.db, auth.company_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Ticket not found".to_string()));
    }

    Ok(axum::http::StatusCode::NO_CONTENT)
}
