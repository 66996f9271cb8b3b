/// Location model: a physical shop site belonging to a company.
///
/// Tickets, inventory, and subscriptions are all tied to a location;
/// billing in particular is per-location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A shop location
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    /// Unique location ID
    pub id: Uuid,

    /// Owning company
    pub company_id: Uuid,

    /// Location name (e.g. "Downtown", "Mall kiosk")
    pub name: String,

    /// Street address
    pub address: Option<String>,

    /// Location phone
    pub phone: Option<String>,

    /// Whether the location is operating
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Input for updating a location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

const LOCATION_COLUMNS: &str =
    "id, company_id, name, address, phone, is_active, created_at, updated_at, deleted_at";

impl Location {
    /// Creates a location for a company
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateLocation,
    ) -> Result<Self, sqlx::Error> {
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            INSERT INTO locations (company_id, name, address, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING {LOCATION_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.name)
        .bind(data.address)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(location)
    }

    /// Finds a location within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(location)
    }

    /// Lists a company's locations
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let locations = sqlx::query_as::<_, Location>(&format!(
            r#"
            SELECT {LOCATION_COLUMNS}
            FROM locations
            WHERE company_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        ))
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(locations)
    }

    /// Updates a location
    pub async fn update(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        data: UpdateLocation,
    ) -> Result<Option<Self>, sqlx::Error> {
        let location = sqlx::query_as::<_, Location>(&format!(
            r#"
            UPDATE locations
            SET name = COALESCE($3, name),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {LOCATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(data.name)
        .bind(data.address)
        .bind(data.phone)
        .bind(data.is_active)
        .fetch_optional(pool)
        .await?;

        Ok(location)
    }

    /// Soft-deletes a location
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE locations SET deleted_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
