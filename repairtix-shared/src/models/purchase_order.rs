/// Purchase order model and database operations
///
/// Purchase orders restock inventory from suppliers. Receiving is the
/// interesting operation: recording received quantities and incrementing
/// inventory on-hand happen in one transaction, and the order's status is
/// derived from how much of it has arrived.
///
/// # Status flow
///
/// ```text
/// draft → ordered → partially_received → received
///       → canceled (only before anything was received)
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Purchase order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "purchase_order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    /// Being drafted, not yet sent to the supplier
    Draft,

    /// Sent to the supplier
    Ordered,

    /// Some lines received
    PartiallyReceived,

    /// Everything received
    Received,

    /// Canceled before receipt
    Canceled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Ordered => "ordered",
            PurchaseOrderStatus::PartiallyReceived => "partially_received",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Canceled => "canceled",
        }
    }

    /// Whether more stock can still arrive against this order
    pub fn is_receivable(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Ordered | PurchaseOrderStatus::PartiallyReceived
        )
    }
}

/// A supplier order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,

    pub supplier_name: String,

    /// Supplier-side reference / confirmation number
    pub reference: Option<String>,

    pub status: PurchaseOrderStatus,
    pub notes: Option<String>,

    /// When the order was placed with the supplier
    pub ordered_at: Option<DateTime<Utc>>,

    /// When the order was fully received
    pub received_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A line on a purchase order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub inventory_item_id: Uuid,
    pub description: Option<String>,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub unit_cost: Decimal,
}

/// Input for one line when creating a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrderItem {
    pub inventory_item_id: Uuid,
    pub description: Option<String>,
    pub quantity_ordered: i32,
    pub unit_cost: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePurchaseOrder {
    pub location_id: Uuid,
    pub supplier_name: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<CreatePurchaseOrderItem>,
}

/// One receipt entry: how many units of a line arrived
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveLine {
    /// Purchase order line being received
    pub item_id: Uuid,

    /// Units received in this delivery (must be positive)
    pub quantity: i32,
}

const PO_COLUMNS: &str = "id, company_id, location_id, supplier_name, reference, status, notes, \
                          ordered_at, received_at, created_at, updated_at, deleted_at";

const PO_ITEM_COLUMNS: &str = "id, purchase_order_id, inventory_item_id, description, \
                               quantity_ordered, quantity_received, unit_cost";

impl PurchaseOrder {
    /// Creates a purchase order with its lines in one transaction
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreatePurchaseOrder,
    ) -> Result<(Self, Vec<PurchaseOrderItem>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            INSERT INTO purchase_orders (company_id, location_id, supplier_name, reference, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PO_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.location_id)
        .bind(&data.supplier_name)
        .bind(&data.reference)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(data.items.len());
        for line in data.items {
            let item = sqlx::query_as::<_, PurchaseOrderItem>(&format!(
                r#"
                INSERT INTO purchase_order_items
                    (purchase_order_id, inventory_item_id, description, quantity_ordered, unit_cost)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {PO_ITEM_COLUMNS}
                "#,
            ))
            .bind(po.id)
            .bind(line.inventory_item_id)
            .bind(line.description)
            .bind(line.quantity_ordered)
            .bind(line.unit_cost)
            .fetch_one(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        Ok((po, items))
    }

    /// Finds a purchase order within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {PO_COLUMNS}
            FROM purchase_orders
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(po)
    }

    /// Lists the lines of a purchase order
    pub async fn items(pool: &PgPool, purchase_order_id: Uuid) -> Result<Vec<PurchaseOrderItem>, sqlx::Error> {
        let items = sqlx::query_as::<_, PurchaseOrderItem>(&format!(
            r#"
            SELECT {PO_ITEM_COLUMNS}
            FROM purchase_order_items
            WHERE purchase_order_id = $1
            ORDER BY id
            "#,
        ))
        .bind(purchase_order_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }

    /// Lists a company's purchase orders with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        status: Option<PurchaseOrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let orders = match status {
            Some(status) => {
                sqlx::query_as::<_, PurchaseOrder>(&format!(
                    r#"
                    SELECT {PO_COLUMNS}
                    FROM purchase_orders
                    WHERE company_id = $1 AND status = $2 AND deleted_at IS NULL
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                ))
                .bind(company_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, PurchaseOrder>(&format!(
                    r#"
                    SELECT {PO_COLUMNS}
                    FROM purchase_orders
                    WHERE company_id = $1 AND deleted_at IS NULL
                    ORDER BY created_at DESC
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

        Ok(orders)
    }

    /// Marks a draft order as placed with the supplier
    pub async fn mark_ordered(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE purchase_orders
            SET status = 'ordered', ordered_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND status = 'draft' AND deleted_at IS NULL
            RETURNING {PO_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(po)
    }

    /// Records a delivery against an order
    ///
    /// In one transaction: bumps `quantity_received` on each named line
    /// (capped at the ordered quantity), increments inventory on-hand for
    /// the linked items, and derives the order's status from whether every
    /// line is now fully received.
    ///
    /// Returns the updated order, or None when the order is missing or not
    /// in a receivable status.
    pub async fn receive(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        lines: Vec<ReceiveLine>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lock the order row for the duration of the receipt
        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {PO_COLUMNS}
            FROM purchase_orders
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;

        let po = match po {
            Some(po) if po.status.is_receivable() => po,
            _ => return Ok(None),
        };

        for line in lines {
            if line.quantity <= 0 {
                continue;
            }

            let row: Option<(Uuid, i32, i32)> = sqlx::query_as(
                r#"
                SELECT inventory_item_id, quantity_ordered, quantity_received
                FROM purchase_order_items
                WHERE id = $1 AND purchase_order_id = $2
                FOR UPDATE
                "#,
            )
            .bind(line.item_id)
            .bind(po.id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some((inventory_item_id, ordered, received)) = row else {
                continue;
            };

            // Cap at the outstanding quantity; over-delivery is not tracked
            let accepted = line.quantity.min(ordered - received);
            if accepted <= 0 {
                continue;
            }

            sqlx::query(
                "UPDATE purchase_order_items SET quantity_received = quantity_received + $2 \
                 WHERE id = $1",
            )
            .bind(line.item_id)
            .bind(accepted)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity_on_hand = quantity_on_hand + $3, updated_at = NOW()
                WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
                "#,
            )
            .bind(inventory_item_id)
            .bind(company_id)
            .bind(accepted)
            .execute(&mut *tx)
            .await?;
        }

        // Derive status from line completion
        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE purchase_orders po
            SET status = CASE
                    WHEN NOT EXISTS (
                        SELECT 1 FROM purchase_order_items
                        WHERE purchase_order_id = po.id
                          AND quantity_received < quantity_ordered
                    ) THEN 'received'::purchase_order_status
                    ELSE 'partially_received'::purchase_order_status
                END,
                received_at = CASE
                    WHEN NOT EXISTS (
                        SELECT 1 FROM purchase_order_items
                        WHERE purchase_order_id = po.id
                          AND quantity_received < quantity_ordered
                    ) THEN NOW()
                    ELSE NULL
                END,
                updated_at = NOW()
            WHERE po.id = $1
            RETURNING {PO_COLUMNS}
            "#,
        ))
        .bind(po.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(po))
    }

    /// Cancels an order that has not received any stock
    pub async fn cancel(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let po = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE purchase_orders
            SET status = 'canceled', updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
              AND status IN ('draft', 'ordered')
              AND NOT EXISTS (
                  SELECT 1 FROM purchase_order_items
                  WHERE purchase_order_id = $1 AND quantity_received > 0
              )
            RETURNING {PO_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(po)
    }

    /// Soft-deletes a purchase order
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_orders SET deleted_at = NOW()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(PurchaseOrderStatus::Draft.as_str(), "draft");
        assert_eq!(
            PurchaseOrderStatus::PartiallyReceived.as_str(),
            "partially_received"
        );
    }

    #[test]
    fn test_status_receivable() {
        assert!(PurchaseOrderStatus::Ordered.is_receivable());
        assert!(PurchaseOrderStatus::PartiallyReceived.is_receivable());
        assert!(!PurchaseOrderStatus::Draft.is_receivable());
        assert!(!PurchaseOrderStatus::Received.is_receivable());
        assert!(!PurchaseOrderStatus::Canceled.is_receivable());
    }
}
