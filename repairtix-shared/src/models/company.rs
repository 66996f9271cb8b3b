/// Company model and database operations
///
/// The company is the tenant: every scoped table carries a `company_id`
/// foreign key, and all isolation guarantees hang off it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT,
///     phone VARCHAR(50),
///     address TEXT,
///     settings JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Company model representing a repair shop account (the tenant)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID
    pub id: Uuid,

    /// Shop/business name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,

    /// Postal address
    pub address: Option<String>,

    /// Company-specific configuration (JSONB)
    ///
    /// Example: {"currency": "USD", "tax_rate": "8.25"}
    pub settings: JsonValue,

    /// When the company was created
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Shop/business name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone
    pub phone: Option<String>,
}

/// Input for updating a company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New name
    pub name: Option<String>,

    /// New contact email
    pub email: Option<String>,

    /// New contact phone
    pub phone: Option<String>,

    /// New postal address
    pub address: Option<String>,

    /// Settings patch (merged into existing settings)
    pub settings: Option<JsonValue>,
}

const COMPANY_COLUMNS: &str =
    "id, name, email, phone, address, settings, created_at, updated_at, deleted_at";

impl Company {
    /// Creates a new company
    pub async fn create(pool: &PgPool, data: CreateCompany) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO companies (name, email, phone)
            VALUES ($1, $2, $3)
            RETURNING {COMPANY_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    ///
    /// Soft-deleted companies are not returned.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            SELECT {COMPANY_COLUMNS}
            FROM companies
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Updates a company
    ///
    /// Only non-None fields are updated; settings are merged with the
    /// existing JSONB, not replaced.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE companies SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.settings.is_some() {
            bind_count += 1;
            query.push_str(&format!(", settings = settings || ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND deleted_at IS NULL RETURNING {COMPANY_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Company>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(settings) = data.settings {
            q = q.bind(settings);
        }

        let company = q.fetch_optional(pool).await?;

        Ok(company)
    }

    /// Soft-deletes a company
    ///
    /// Related rows stay in place; they become unreachable because every
    /// read path joins through the company scope.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_company_default() {
        let update = UpdateCompany::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.settings.is_none());
    }

    // Integration tests for database operations are in repairtix-api/tests/.
}
