/// Payment model and database operations
///
/// Payments are recorded against invoices. Recording happens in one
/// transaction with the invoice update: `amount_paid` accumulates, and the
/// invoice flips to `paid` exactly when payments cover the total.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::invoice::Invoice;

/// How a payment was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }
}

/// A recorded payment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub invoice_id: Uuid,

    pub amount: Decimal,
    pub method: PaymentMethod,

    /// Processor-side reference (charge id, check number, ...)
    pub provider_reference: Option<String>,

    /// User who recorded the payment
    pub recorded_by: Option<Uuid>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePayment {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub provider_reference: Option<String>,
    pub notes: Option<String>,
}

/// Why a payment could not be recorded
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Invoice not found in this company
    #[error("Invoice not found")]
    InvoiceNotFound,

    /// Invoice is paid or void
    #[error("Invoice is not payable")]
    InvoiceNotPayable,

    /// Zero or negative amount
    #[error("Payment amount must be positive")]
    InvalidAmount,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const PAYMENT_COLUMNS: &str = "id, company_id, invoice_id, amount, method, provider_reference, \
                               recorded_by, notes, created_at";

impl Payment {
    /// Records a payment and updates the invoice in one transaction
    ///
    /// Returns the payment and the updated invoice.
    pub async fn record(
        pool: &PgPool,
        company_id: Uuid,
        recorded_by: Option<Uuid>,
        data: CreatePayment,
    ) -> Result<(Self, Invoice), PaymentError> {
        if data.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount);
        }

        let mut tx = pool.begin().await?;

        // Lock the invoice so concurrent payments serialize
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, company_id, location_id, invoice_number, customer_id, ticket_id, status,
                   subtotal, tax_rate, tax_amount, total, amount_paid, notes, issued_at, due_at,
                   paid_at, voided_at, created_at, updated_at, deleted_at
            FROM invoices
            WHERE id = $1 AND company_id = $2 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(data.invoice_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(PaymentError::InvoiceNotFound)?;

        if !invoice.status.is_payable() {
            return Err(PaymentError::InvoiceNotPayable);
        }

        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (company_id, invoice_id, amount, method, provider_reference,
                                  recorded_by, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.invoice_id)
        .bind(data.amount)
        .bind(data.method)
        .bind(data.provider_reference)
        .bind(recorded_by)
        .bind(data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET amount_paid = amount_paid + $2,
                status = CASE WHEN amount_paid + $2 >= total THEN 'paid'::invoice_status
                              ELSE status END,
                paid_at = CASE WHEN amount_paid + $2 >= total THEN NOW() ELSE paid_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, company_id, location_id, invoice_number, customer_id, ticket_id, status,
                      subtotal, tax_rate, tax_amount, total, amount_paid, notes, issued_at, due_at,
                      paid_at, voided_at, created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.invoice_id)
        .bind(data.amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((payment, invoice))
    }

    /// Lists payments recorded against an invoice
    pub async fn list_by_invoice(
        pool: &PgPool,
        company_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE company_id = $1 AND invoice_id = $2
            ORDER BY created_at ASC
            "#,
        ))
        .bind(company_id)
        .bind(invoice_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }

    /// Lists a company's payments with pagination, newest first
    pub async fn list(
        pool: &PgPool,
        company_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payments
            WHERE company_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(company_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(PaymentMethod::Cash.as_str(), "cash");
        assert_eq!(PaymentMethod::BankTransfer.as_str(), "bank_transfer");
    }

    #[test]
    fn test_payment_error_display() {
        assert_eq!(
            PaymentError::InvalidAmount.to_string(),
            "Payment amount must be positive"
        );
        assert_eq!(PaymentError::InvoiceNotFound.to_string(), "Invoice not found");
    }
}
