/// Inventory item model and database operations
///
/// Items track parts and retail stock per company. On-hand quantity is
/// adjusted through [`InventoryItem::adjust_quantity`] (manual counts,
/// consuming parts on a ticket) and through purchase-order receiving,
/// which increments stock in the same transaction as the receipt.
///
/// Invariant: `quantity_on_hand` never goes below zero; an adjustment
/// that would over-draw fails instead of clamping.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A stocked part or retail product
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub company_id: Uuid,

    /// Stock-keeping unit, unique per company
    pub sku: String,

    pub name: String,
    pub description: Option<String>,

    /// Catalog links
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,

    /// Units currently in stock
    pub quantity_on_hand: i32,

    /// Restock threshold for the low-stock report
    pub reorder_level: i32,

    /// What the shop pays per unit
    pub cost_price: Option<Decimal>,

    /// What the customer pays per unit
    pub retail_price: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating an inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInventoryItem {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub quantity_on_hand: Option<i32>,
    pub reorder_level: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

/// Input for updating an inventory item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateInventoryItem {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub model_id: Option<Uuid>,
    pub reorder_level: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

const ITEM_COLUMNS: &str = "id, company_id, sku, name, description, category_id, subcategory_id, \
                            brand_id, model_id, quantity_on_hand, reorder_level, cost_price, \
                            retail_price, created_at, updated_at, deleted_at";

impl InventoryItem {
    /// Creates an inventory item
    ///
    /// # Errors
    ///
    /// Fails with a unique-constraint violation when the SKU is already
    /// used within the company.
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateInventoryItem,
    ) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO inventory_items (company_id, sku, name, description, category_id,
                                         subcategory_id, brand_id, model_id, quantity_on_hand,
                                         reorder_level, cost_price, retail_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 0), COALESCE($10, 0), $11, $12)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.sku)
        .bind(data.name)
        .bind(data.description)
        .bind(data.category_id)
        .bind(data.subcategory_id)
        .bind(data.brand_id)
        .bind(data.model_id)
        .bind(data.quantity_on_hand)
        .bind(data.reorder_level)
        .bind(data.cost_price)
        .bind(data.retail_price)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    /// Finds an item within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM inventory_items
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Lists items with pagination, optionally filtered by a search term
    /// over SKU and name
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = match search {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, InventoryItem>(&format!(
                    r#"
                    SELECT {ITEM_COLUMNS}
                    FROM inventory_items
                    WHERE company_id = $1 AND deleted_at IS NULL
                      AND (sku ILIKE $2 OR name ILIKE $2)
                    ORDER BY name
                    LIMIT $3 OFFSET $4
                    "#,
                ))
                .bind(company_id)
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InventoryItem>(&format!(
                    r#"
                    SELECT {ITEM_COLUMNS}
                    FROM inventory_items
                    WHERE company_id = $1 AND deleted_at IS NULL
                    ORDER BY name
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(company_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Lists items at or below their reorder level
    pub async fn list_below_reorder(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM inventory_items
            WHERE company_id = $1 AND deleted_at IS NULL
              AND quantity_on_hand <= reorder_level
            ORDER BY quantity_on_hand ASC
            "#,
        ))
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Updates an item's descriptive fields
    pub async fn update(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        data: UpdateInventoryItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items
            SET sku = COALESCE($3, sku),
                name = COALESCE($4, name),
                description = COALESCE($5, description),
                category_id = COALESCE($6, category_id),
                subcategory_id = COALESCE($7, subcategory_id),
                brand_id = COALESCE($8, brand_id),
                model_id = COALESCE($9, model_id),
                reorder_level = COALESCE($10, reorder_level),
                cost_price = COALESCE($11, cost_price),
                retail_price = COALESCE($12, retail_price),
                updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(data.sku)
        .bind(data.name)
        .bind(data.description)
        .bind(data.category_id)
        .bind(data.subcategory_id)
        .bind(data.brand_id)
        .bind(data.model_id)
        .bind(data.reorder_level)
        .bind(data.cost_price)
        .bind(data.retail_price)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Adjusts on-hand quantity by a signed delta
    ///
    /// Returns None when the item does not exist or the adjustment would
    /// take the quantity below zero; the guard lives in the WHERE clause
    /// so concurrent adjustments cannot race past it.
    pub async fn adjust_quantity(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items
            SET quantity_on_hand = quantity_on_hand + $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
              AND quantity_on_hand + $3 >= 0
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(delta)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Soft-deletes an item
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET deleted_at = NOW()
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
