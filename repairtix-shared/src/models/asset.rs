/// Asset model: a customer's device (phone, laptop, console, ...).
///
/// Tickets reference an asset so repair history follows the device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A customer-owned device
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub company_id: Uuid,

    /// Owning customer
    pub customer_id: Uuid,

    /// Device category label (e.g. "smartphone", "laptop")
    pub asset_type: String,

    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub imei: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    pub customer_id: Uuid,
    pub asset_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub imei: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating an asset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAsset {
    pub asset_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub imei: Option<String>,
    pub notes: Option<String>,
}

const ASSET_COLUMNS: &str = "id, company_id, customer_id, asset_type, brand, model, \
                             serial_number, imei, notes, created_at, updated_at, deleted_at";

impl Asset {
    /// Creates an asset
    ///
    /// The customer must belong to the same company; the caller verifies
    /// that before inserting.
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateAsset,
    ) -> Result<Self, sqlx::Error> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            INSERT INTO assets (company_id, customer_id, asset_type, brand, model,
                                serial_number, imei, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ASSET_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.customer_id)
        .bind(data.asset_type)
        .bind(data.brand)
        .bind(data.model)
        .bind(data.serial_number)
        .bind(data.imei)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(asset)
    }

    /// Finds an asset within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            SELECT {ASSET_COLUMNS}
            FROM assets
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(asset)
    }

    /// Lists a customer's assets
    pub async fn list_by_customer(
        pool: &PgPool,
        company_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assets = sqlx::query_as::<_, Asset>(&format!(
            r#"
            SELECT {ASSET_COLUMNS}
            FROM assets
            WHERE company_id = $1 AND customer_id = $2 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        ))
        .bind(company_id)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        Ok(assets)
    }

    /// Lists a company's assets with pagination
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let assets = sqlx::query_as::<_, Asset>(&format!(
            r#"
            SELECT {ASSET_COLUMNS}
            FROM assets
            WHERE company_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(assets)
    }

    /// Updates an asset
    pub async fn update(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        data: UpdateAsset,
    ) -> Result<Option<Self>, sqlx::Error> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            r#"
            UPDATE assets
            SET asset_type = COALESCE($3, asset_type),
                brand = COALESCE($4, brand),
                model = COALESCE($5, model),
                serial_number = COALESCE($6, serial_number),
                imei = COALESCE($7, imei),
                notes = COALESCE($8, notes),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {ASSET_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(data.asset_type)
        .bind(data.brand)
        .bind(data.model)
        .bind(data.serial_number)
        .bind(data.imei)
        .bind(data.notes)
        .fetch_optional(pool)
        .await?;

        Ok(asset)
    }

    /// Soft-deletes an asset
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE assets SET deleted_at = NOW()
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
