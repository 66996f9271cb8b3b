/// Inventory catalog dimensions: brands, device models, categories,
/// subcategories. Plain per-company lookup tables referenced by inventory
/// items; nothing here is soft-deleted because rows are cheap and deletes
/// are rare (a hard delete fails if inventory still references the row).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A manufacturer (Apple, Samsung, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A device model under a brand (iPhone 13, Galaxy S22, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub brand_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A parts category (Screens, Batteries, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A subcategory under a category (OLED screens, LCD screens, ...)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: Uuid,
    pub company_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Brand {
    pub async fn create(pool: &PgPool, company_id: Uuid, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Brand>(
            r#"
            INSERT INTO brands (company_id, name)
            VALUES ($1, $2)
            RETURNING id, company_id, name, created_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, company_id, name, created_at
            FROM brands
            WHERE company_id = $1
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl DeviceModel {
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        brand_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, DeviceModel>(
            r#"
            INSERT INTO device_models (company_id, brand_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, company_id, brand_id, name, created_at
            "#,
        )
        .bind(company_id)
        .bind(brand_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_brand(
        pool: &PgPool,
        company_id: Uuid,
        brand_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DeviceModel>(
            r#"
            SELECT id, company_id, brand_id, name, created_at
            FROM device_models
            WHERE company_id = $1 AND brand_id = $2
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .bind(brand_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM device_models WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Category {
    pub async fn create(pool: &PgPool, company_id: Uuid, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (company_id, name)
            VALUES ($1, $2)
            RETURNING id, company_id, name, created_at
            "#,
        )
        .bind(company_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, company_id, name, created_at
            FROM categories
            WHERE company_id = $1
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Subcategory {
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        category_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subcategory>(
            r#"
            INSERT INTO subcategories (company_id, category_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, company_id, category_id, name, created_at
            "#,
        )
        .bind(company_id)
        .bind(category_id)
        .bind(name)
        .fetch_one(pool)
        .await
    }

    pub async fn list_by_category(
        pool: &PgPool,
        company_id: Uuid,
        category_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subcategory>(
            r#"
            SELECT id, company_id, category_id, name, created_at
            FROM subcategories
            WHERE company_id = $1 AND category_id = $2
            ORDER BY name
            "#,
        )
        .bind(company_id)
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(company_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
