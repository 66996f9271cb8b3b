/// Ticket model and database operations
///
/// Tickets are the core entity of RepairTix: one repair job for one
/// customer, usually tied to a specific device.
///
/// # Status flow
///
/// ```text
/// new → diagnosing → awaiting_parts → in_repair → ready → closed
///                                                        → canceled
/// ```
///
/// Statuses are advisory rather than a strict state machine; shops jump
/// backwards all the time (a "ready" device that fails QA goes back to
/// in_repair). Only closed/canceled are terminal.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE ticket_status AS ENUM (
///     'new', 'diagnosing', 'awaiting_parts', 'in_repair', 'ready', 'closed', 'canceled'
/// );
/// CREATE TYPE ticket_priority AS ENUM ('low', 'normal', 'high', 'urgent');
///
/// CREATE TABLE tickets (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     location_id UUID NOT NULL REFERENCES locations(id),
///     ticket_number BIGINT NOT NULL,
///     customer_id UUID NOT NULL REFERENCES customers(id),
///     asset_id UUID REFERENCES assets(id),
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     status ticket_status NOT NULL DEFAULT 'new',
///     priority ticket_priority NOT NULL DEFAULT 'normal',
///     subject VARCHAR(255) NOT NULL,
///     problem_description TEXT,
///     diagnosis TEXT,
///     resolution TEXT,
///     quoted_total NUMERIC(12, 2),
///     due_at TIMESTAMPTZ,
///     closed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ,
///     UNIQUE (company_id, ticket_number)
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Ticket workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Just checked in, not yet looked at
    New,

    /// Being diagnosed
    Diagnosing,

    /// Waiting on parts from a purchase order
    AwaitingParts,

    /// Repair in progress
    InRepair,

    /// Repaired and awaiting pickup
    Ready,

    /// Picked up / finished
    Closed,

    /// Canceled by the customer or the shop
    Canceled,
}

impl TicketStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Diagnosing => "diagnosing",
            TicketStatus::AwaitingParts => "awaiting_parts",
            TicketStatus::InRepair => "in_repair",
            TicketStatus::Ready => "ready",
            TicketStatus::Closed => "closed",
            TicketStatus::Canceled => "canceled",
        }
    }

    /// Checks if the ticket has reached a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Closed | TicketStatus::Canceled)
    }

    /// Checks if the ticket is still being worked
    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// A repair job
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,

    /// Human-facing number, sequential per company
    pub ticket_number: i64,

    pub customer_id: Uuid,

    /// Device being repaired (optional: some jobs are quotes/consults)
    pub asset_id: Option<Uuid>,

    /// Technician currently assigned (None = unassigned)
    pub assigned_to: Option<Uuid>,

    pub status: TicketStatus,
    pub priority: TicketPriority,

    /// Short summary shown in lists
    pub subject: String,

    /// Problem as reported at intake
    pub problem_description: Option<String>,

    /// Technician's findings
    pub diagnosis: Option<String>,

    /// What was done to resolve the job
    pub resolution: Option<String>,

    /// Price quoted to the customer
    pub quoted_total: Option<Decimal>,

    /// Promised completion time
    pub due_at: Option<DateTime<Utc>>,

    /// When the ticket reached a terminal status
    pub closed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicket {
    pub location_id: Uuid,
    pub customer_id: Uuid,
    pub asset_id: Option<Uuid>,
    pub subject: String,
    pub problem_description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub quoted_total: Option<Decimal>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Input for updating a ticket
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTicket {
    pub subject: Option<String>,
    pub problem_description: Option<String>,
    pub diagnosis: Option<String>,
    pub resolution: Option<String>,
    pub priority: Option<TicketPriority>,
    pub quoted_total: Option<Decimal>,
    pub due_at: Option<DateTime<Utc>>,
}

/// Filters for listing tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub customer_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

const TICKET_COLUMNS: &str = "id, company_id, location_id, ticket_number, customer_id, asset_id, \
                              assigned_to, status, priority, subject, problem_description, \
                              diagnosis, resolution, quoted_total, due_at, closed_at, \
                              created_at, updated_at, deleted_at";

impl Ticket {
    /// Creates a ticket, allocating the next per-company ticket number
    ///
    /// Numbering restarts per company, never per location, so the front
    /// desk can quote "ticket 1042" unambiguously across sites.
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateTicket,
    ) -> Result<Self, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (company_id, location_id, ticket_number, customer_id, asset_id,
                                 subject, problem_description, priority, quoted_total, due_at)
            VALUES ($1, $2,
                    (SELECT COALESCE(MAX(ticket_number), 0) + 1
                     FROM tickets WHERE company_id = $1),
                    $3, $4, $5, $6, COALESCE($7, 'normal'), $8, $9)
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.location_id)
        .bind(data.customer_id)
        .bind(data.asset_id)
        .bind(data.subject)
        .bind(data.problem_description)
        .bind(data.priority)
        .bind(data.quoted_total)
        .bind(data.due_at)
        .fetch_one(pool)
        .await?;

        Ok(ticket)
    }

    /// Finds a ticket within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            SELECT {TICKET_COLUMNS}
            FROM tickets
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Lists tickets with optional filters and pagination, newest first
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        filter: TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE company_id = $1 AND deleted_at IS NULL"
        );
        let mut bind_count = 1;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if filter.customer_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND customer_id = ${}", bind_count));
        }
        if filter.location_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND location_id = ${}", bind_count));
        }
        if filter.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND assigned_to = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Ticket>(&query).bind(company_id);

        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(customer_id) = filter.customer_id {
            q = q.bind(customer_id);
        }
        if let Some(location_id) = filter.location_id {
            q = q.bind(location_id);
        }
        if let Some(assigned_to) = filter.assigned_to {
            q = q.bind(assigned_to);
        }

        let tickets = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(tickets)
    }

    /// Updates a ticket's editable fields
    pub async fn update(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        data: UpdateTicket,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET subject = COALESCE($3, subject),
                problem_description = COALESCE($4, problem_description),
                diagnosis = COALESCE($5, diagnosis),
                resolution = COALESCE($6, resolution),
                priority = COALESCE($7, priority),
                quoted_total = COALESCE($8, quoted_total),
                due_at = COALESCE($9, due_at),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(data.subject)
        .bind(data.problem_description)
        .bind(data.diagnosis)
        .bind(data.resolution)
        .bind(data.priority)
        .bind(data.quoted_total)
        .bind(data.due_at)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Moves a ticket to a new status
    ///
    /// Sets `closed_at` when entering a terminal status and clears it when
    /// a closed ticket is reopened.
    pub async fn set_status(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET status = $3,
                closed_at = CASE WHEN $4 THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(status)
        .bind(status.is_terminal())
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Assigns (or unassigns, with None) a technician
    pub async fn assign(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET assigned_to = $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {TICKET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(ticket)
    }

    /// Soft-deletes a ticket
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tickets SET deleted_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tickets matching a status (or all open when None)
    pub async fn count_by_status(
        pool: &PgPool,
        company_id: Uuid,
        status: Option<TicketStatus>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = match status {
            Some(status) => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM tickets \
                     WHERE company_id = $1 AND status = $2 AND deleted_at IS NULL",
                )
                .bind(company_id)
                .bind(status)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM tickets \
                     WHERE company_id = $1 AND status NOT IN ('closed', 'canceled') \
                       AND deleted_at IS NULL",
                )
                .bind(company_id)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TicketStatus::New.as_str(), "new");
        assert_eq!(TicketStatus::AwaitingParts.as_str(), "awaiting_parts");
        assert_eq!(TicketStatus::Closed.as_str(), "closed");
    }

    #[test]
    fn test_status_terminal() {
        assert!(TicketStatus::Closed.is_terminal());
        assert!(TicketStatus::Canceled.is_terminal());
        assert!(!TicketStatus::New.is_terminal());
        assert!(!TicketStatus::Ready.is_terminal());

        assert!(TicketStatus::InRepair.is_open());
        assert!(!TicketStatus::Canceled.is_open());
    }
}
