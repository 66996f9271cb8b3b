/// Invoice model and database operations
///
/// Invoices bill customers for completed repairs and retail sales. Totals
/// are computed once at creation from the lines (subtotal, tax at the
/// given rate, total) and stored; lines are immutable after creation.
///
/// # Status flow
///
/// ```text
/// draft → sent → paid
/// draft/sent → void
/// ```
///
/// `amount_paid` accumulates through [`crate::models::payment::Payment`]
/// recording; the invoice flips to `paid` exactly when payments cover the
/// total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted, not yet shown to the customer
    Draft,

    /// Issued to the customer
    Sent,

    /// Fully paid
    Paid,

    /// Voided; excluded from receivables
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }

    /// Whether payments can still be recorded against this invoice
    pub fn is_payable(&self) -> bool {
        matches!(self, InvoiceStatus::Draft | InvoiceStatus::Sent)
    }
}

/// A customer invoice
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,

    /// Human-facing number, sequential per company
    pub invoice_number: i64,

    pub customer_id: Uuid,

    /// Ticket this invoice bills for, if any
    pub ticket_id: Option<Uuid>,

    pub status: InvoiceStatus,

    /// Sum of line amounts
    pub subtotal: Decimal,

    /// Tax rate applied, in percent (e.g. 8.25)
    pub tax_rate: Decimal,

    /// Tax on the subtotal
    pub tax_amount: Decimal,

    /// subtotal + tax_amount
    pub total: Decimal,

    /// Payments recorded so far
    pub amount_paid: Decimal,

    pub notes: Option<String>,

    /// When the invoice was sent to the customer
    pub issued_at: Option<DateTime<Utc>>,

    pub due_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A line on an invoice
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvoiceLine {
    pub id: Uuid,
    pub invoice_id: Uuid,

    /// Inventory item sold, when the line is a part/product
    pub inventory_item_id: Option<Uuid>,

    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,

    /// quantity * unit_price
    pub amount: Decimal,
}

/// Input for one line when creating an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceLine {
    pub inventory_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Input for creating an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoice {
    pub location_id: Uuid,
    pub customer_id: Uuid,
    pub ticket_id: Option<Uuid>,

    /// Tax rate in percent; defaults to 0
    pub tax_rate: Option<Decimal>,

    pub notes: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub lines: Vec<CreateInvoiceLine>,
}

/// Computed invoice totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Computes subtotal, tax, and total from lines and a percent tax rate
///
/// Amounts are rounded to 2 decimal places, tax computed on the rounded
/// subtotal.
pub fn compute_totals(lines: &[CreateInvoiceLine], tax_rate: Decimal) -> InvoiceTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|l| (Decimal::from(l.quantity) * l.unit_price).round_dp(2))
        .sum();

    let tax_amount = (subtotal * tax_rate / Decimal::from(100)).round_dp(2);

    InvoiceTotals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

const INVOICE_COLUMNS: &str = "id, company_id, location_id, invoice_number, customer_id, \
                               ticket_id, status, subtotal, tax_rate, tax_amount, total, \
                               amount_paid, notes, issued_at, due_at, paid_at, voided_at, \
                               created_at, updated_at, deleted_at";

const LINE_COLUMNS: &str =
    "id, invoice_id, inventory_item_id, description, quantity, unit_price, amount";

impl Invoice {
    /// Creates an invoice with its lines in one transaction
    ///
    /// Totals are computed here, not taken from the client.
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateInvoice,
    ) -> Result<(Self, Vec<InvoiceLine>), sqlx::Error> {
        let tax_rate = data.tax_rate.unwrap_or_default();
        let totals = compute_totals(&data.lines, tax_rate);

        let mut tx = pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (company_id, location_id, invoice_number, customer_id, ticket_id,
                                  tax_rate, subtotal, tax_amount, total, notes, due_at)
            VALUES ($1, $2,
                    (SELECT COALESCE(MAX(invoice_number), 0) + 1
                     FROM invoices WHERE company_id = $1),
                    $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.location_id)
        .bind(data.customer_id)
        .bind(data.ticket_id)
        .bind(tax_rate)
        .bind(totals.subtotal)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(data.notes)
        .bind(data.due_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(data.lines.len());
        for line in data.lines {
            let amount = (Decimal::from(line.quantity) * line.unit_price).round_dp(2);

            let row = sqlx::query_as::<_, InvoiceLine>(&format!(
                r#"
                INSERT INTO invoice_lines
                    (invoice_id, inventory_item_id, description, quantity, unit_price, amount)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {LINE_COLUMNS}
                "#,
            ))
            .bind(invoice.id)
            .bind(line.inventory_item_id)
            .bind(line.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(amount)
            .fetch_one(&mut *tx)
            .await?;

            lines.push(row);
        }

        tx.commit().await?;

        Ok((invoice, lines))
    }

    /// Finds an invoice within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(invoice)
    }

    /// Lists the lines of an invoice
    pub async fn lines(pool: &PgPool, invoice_id: Uuid) -> Result<Vec<InvoiceLine>, sqlx::Error> {
        let lines = sqlx::query_as::<_, InvoiceLine>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM invoice_lines
            WHERE invoice_id = $1
            ORDER BY id
            "#,
        ))
        .bind(invoice_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }

    /// Lists a company's invoices with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        status: Option<InvoiceStatus>,
        customer_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices \
             WHERE company_id = $1 AND deleted_at IS NULL"
        );
        let mut bind_count = 1;

        if status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }
        if customer_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND customer_id = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Invoice>(&query).bind(company_id);

        if let Some(status) = status {
            q = q.bind(status);
        }
        if let Some(customer_id) = customer_id {
            q = q.bind(customer_id);
        }

        let invoices = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(invoices)
    }

    /// Marks a draft invoice as sent
    pub async fn mark_sent(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET status = 'sent', issued_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND status = 'draft' AND deleted_at IS NULL
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(invoice)
    }

    /// Voids an unpaid invoice
    pub async fn void(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET status = 'void', voided_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND status IN ('draft', 'sent')
              AND deleted_at IS NULL
            RETURNING {INVOICE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(invoice)
    }

    /// Soft-deletes an invoice
    pub async fn delete(pool: &PgPool, company_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE invoices SET deleted_at = NOW()
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

    fn line(quantity: i32, unit_price: Decimal) -> CreateInvoiceLine {
        CreateInvoiceLine {
            inventory_item_id: None,
            description: "line".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_compute_totals_no_tax() {
        let totals = compute_totals(
            &[line(2, Decimal::new(4999, 2)), line(1, Decimal::new(12000, 2))],
            Decimal::ZERO,
        );

        assert_eq!(totals.subtotal, Decimal::new(21998, 2));
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(21998, 2));
    }

    #[test]
    fn test_compute_totals_with_tax() {
        let totals = compute_totals(&[line(1, Decimal::from(100))], Decimal::new(825, 2));

        assert_eq!(totals.subtotal, Decimal::from(100));
        assert_eq!(totals.tax_amount, Decimal::new(825, 2));
        assert_eq!(totals.total, Decimal::new(10825, 2));
    }

    #[test]
    fn test_compute_totals_rounds_to_cents() {
        // 3 * 33.333 = 99.999, which rounds to 100.00 at the line level
        let totals = compute_totals(&[line(3, Decimal::new(33333, 3))], Decimal::from(10));

        assert_eq!(totals.subtotal, Decimal::from(100));
        assert_eq!(totals.tax_amount, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(110));
    }

    #[test]
    fn test_compute_totals_empty() {
        let totals = compute_totals(&[], Decimal::from(10));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_status_payable() {
        assert!(InvoiceStatus::Draft.is_payable());
        assert!(InvoiceStatus::Sent.is_payable());
        assert!(!InvoiceStatus::Paid.is_payable());
        assert!(!InvoiceStatus::Void.is_payable());
    }
}
