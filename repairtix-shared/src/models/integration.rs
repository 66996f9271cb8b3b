/// Integration model: third-party provider credentials per company.
///
/// Credentials (a provider-specific JSON document: API keys, secrets) are
/// sealed with [`crate::crypto::CredentialCipher`] before they reach this
/// model and only ever stored as an opaque hex blob. List/read paths never
/// return the blob; the worker decrypts it just before talking to the
/// provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A configured third-party integration
///
/// The provider column is plain text ("stripe", "sendgrid", ...) so new
/// providers don't need a migration; the worker's adapter registry is
/// keyed by the same slugs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Integration {
    pub id: Uuid,
    pub company_id: Uuid,

    /// Provider slug ("stripe", "sendgrid", ...), unique per company
    pub provider: String,

    /// Sealed credential blob (hex of nonce || ciphertext)
    #[serde(skip_serializing)]
    pub credentials_sealed: String,

    pub enabled: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const INTEGRATION_COLUMNS: &str =
    "id, company_id, provider, credentials_sealed, enabled, created_at, updated_at";

impl Integration {
    /// Creates or replaces a company's integration for a provider
    ///
    /// `credentials_sealed` must already be encrypted by the caller.
    pub async fn upsert(
        pool: &PgPool,
        company_id: Uuid,
        provider: &str,
        credentials_sealed: &str,
    ) -> Result<Self, sqlx::Error> {
        let integration = sqlx::query_as::<_, Integration>(&format!(
            r#"
            INSERT INTO integrations (company_id, provider, credentials_sealed)
            VALUES ($1, $2, $3)
            ON CONFLICT (company_id, provider)
            DO UPDATE SET credentials_sealed = EXCLUDED.credentials_sealed,
                          enabled = TRUE,
                          updated_at = NOW()
            RETURNING {INTEGRATION_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(provider)
        .bind(credentials_sealed)
        .fetch_one(pool)
        .await?;

        Ok(integration)
    }

    /// Finds a company's enabled integration for a provider
    pub async fn find_by_provider(
        pool: &PgPool,
        company_id: Uuid,
        provider: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let integration = sqlx::query_as::<_, Integration>(&format!(
            r#"
            SELECT {INTEGRATION_COLUMNS}
            FROM integrations
            WHERE company_id = $1 AND provider = $2 AND enabled = TRUE
            "#,
        ))
        .bind(company_id)
        .bind(provider)
        .fetch_optional(pool)
        .await?;

        Ok(integration)
    }

    /// Lists a company's integrations
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let integrations = sqlx::query_as::<_, Integration>(&format!(
            r#"
            SELECT {INTEGRATION_COLUMNS}
            FROM integrations
            WHERE company_id = $1
            ORDER BY provider
            "#,
        ))
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(integrations)
    }

    /// Removes a company's integration for a provider
    pub async fn delete(
        pool: &PgPool,
        company_id: Uuid,
        provider: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM integrations WHERE company_id = $1 AND provider = $2",
        )
        .bind(company_id)
        .bind(provider)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
