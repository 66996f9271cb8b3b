/// Subscription model and database operations
///
/// RepairTix bills per location: each location carries its own
/// subscription with a plan and a rolling monthly period. The billing
/// worker lists due subscriptions each cycle, charges them through the
/// company's payment integration, and advances the period on success.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE subscription_plan AS ENUM ('trial', 'starter', 'pro', 'enterprise');
/// CREATE TYPE subscription_status AS ENUM ('trialing', 'active', 'past_due', 'canceled');
///
/// CREATE TABLE subscriptions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     location_id UUID NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
///     plan subscription_plan NOT NULL DEFAULT 'trial',
///     status subscription_status NOT NULL DEFAULT 'trialing',
///     current_period_end TIMESTAMPTZ NOT NULL,
///     last_charged_at TIMESTAMPTZ,
///     last_charge_error TEXT,
///     canceled_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (location_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Billing plan types
///
/// Plans determine the monthly price charged per location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    /// Trial (14 days, free)
    Trial,

    /// Starter ($29/month per location)
    Starter,

    /// Professional ($79/month per location)
    Pro,

    /// Enterprise ($199/month per location)
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Trial => "trial",
            SubscriptionPlan::Starter => "starter",
            SubscriptionPlan::Pro => "pro",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(SubscriptionPlan::Trial),
            "starter" => Some(SubscriptionPlan::Starter),
            "pro" => Some(SubscriptionPlan::Pro),
            "enterprise" => Some(SubscriptionPlan::Enterprise),
            _ => None,
        }
    }

    /// Monthly price in the account currency
    pub fn monthly_price(&self) -> Decimal {
        match self {
            SubscriptionPlan::Trial => Decimal::ZERO,
            SubscriptionPlan::Starter => Decimal::new(2900, 2),
            SubscriptionPlan::Pro => Decimal::new(7900, 2),
            SubscriptionPlan::Enterprise => Decimal::new(19900, 2),
        }
    }
}

/// Subscription lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// In the free trial window
    Trialing,

    /// Paid and current
    Active,

    /// Last charge failed; retried every cycle until it succeeds or the
    /// subscription is canceled
    PastDue,

    /// No longer billed
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Whether the billing worker should charge this subscription
    pub fn is_billable(&self) -> bool {
        !matches!(self, SubscriptionStatus::Canceled)
    }
}

/// A per-location subscription
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,

    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,

    /// End of the period already paid for; due once this passes
    pub current_period_end: DateTime<Utc>,

    /// When the last successful charge happened
    pub last_charged_at: Option<DateTime<Utc>>,

    /// Error from the last failed charge, cleared on success
    pub last_charge_error: Option<String>,

    pub canceled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscription {
    pub location_id: Uuid,
    pub plan: SubscriptionPlan,
}

/// Trial length granted to new subscriptions
const TRIAL_DAYS: i32 = 14;

const SUBSCRIPTION_COLUMNS: &str = "id, company_id, location_id, plan, status, \
                                    current_period_end, last_charged_at, last_charge_error, \
                                    canceled_at, created_at, updated_at";

impl Subscription {
    /// Creates a subscription for a location, starting with a trial period
    pub async fn create(
        pool: &PgPool,
        company_id: Uuid,
        data: CreateSubscription,
    ) -> Result<Self, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            INSERT INTO subscriptions (company_id, location_id, plan, status, current_period_end)
            VALUES ($1, $2, $3, 'trialing', NOW() + make_interval(days => $4))
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(company_id)
        .bind(data.location_id)
        .bind(data.plan)
        .bind(TRIAL_DAYS)
        .fetch_one(pool)
        .await?;

        Ok(subscription)
    }

    /// Finds a subscription within a company
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE id = $1 AND company_id = $2
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Lists a company's subscriptions
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE company_id = $1
            ORDER BY created_at ASC
            "#,
        ))
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(subscriptions)
    }

    /// Lists subscriptions whose paid period has lapsed, oldest first
    ///
    /// Used by the billing worker. Canceled subscriptions are never due.
    pub async fn list_due(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let subscriptions = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            SELECT {SUBSCRIPTION_COLUMNS}
            FROM subscriptions
            WHERE status IN ('trialing', 'active', 'past_due')
              AND current_period_end <= NOW()
            ORDER BY current_period_end ASC
            LIMIT $1
            "#,
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(subscriptions)
    }

    /// Records a successful charge: activates the subscription and
    /// advances the paid period by one month
    pub async fn mark_charged(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE subscriptions
            SET status = 'active',
                current_period_end = current_period_end + INTERVAL '1 month',
                last_charged_at = NOW(),
                last_charge_error = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status != 'canceled'
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Records a failed charge: marks the subscription past due
    ///
    /// The period end is left alone so the subscription stays due and is
    /// retried on the next billing cycle.
    pub async fn mark_past_due(
        pool: &PgPool,
        id: Uuid,
        error: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE subscriptions
            SET status = 'past_due',
                last_charge_error = $2,
                updated_at = NOW()
            WHERE id = $1 AND status != 'canceled'
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(error)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Changes the plan (takes effect from the next charge)
    pub async fn change_plan(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
        plan: SubscriptionPlan,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE subscriptions
            SET plan = $3, updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND status != 'canceled'
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .bind(plan)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }

    /// Cancels a subscription; billing stops immediately
    pub async fn cancel(
        pool: &PgPool,
        company_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let subscription = sqlx::query_as::<_, Subscription>(&format!(
            r#"
            UPDATE subscriptions
            SET status = 'canceled', canceled_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND company_id = $2 AND status != 'canceled'
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_round_trip() {
        for plan in [
            SubscriptionPlan::Trial,
            SubscriptionPlan::Starter,
            SubscriptionPlan::Pro,
            SubscriptionPlan::Enterprise,
        ] {
            assert_eq!(SubscriptionPlan::from_str(plan.as_str()), Some(plan));
        }
        assert_eq!(SubscriptionPlan::from_str("free"), None);
    }

    #[test]
    fn test_plan_prices() {
        assert_eq!(SubscriptionPlan::Trial.monthly_price(), Decimal::ZERO);
        assert_eq!(SubscriptionPlan::Starter.monthly_price(), Decimal::new(2900, 2));
        assert_eq!(SubscriptionPlan::Pro.monthly_price(), Decimal::new(7900, 2));
        assert_eq!(
            SubscriptionPlan::Enterprise.monthly_price(),
            Decimal::new(19900, 2)
        );
    }

    #[test]
    fn test_status_billable() {
        assert!(SubscriptionStatus::Trialing.is_billable());
        assert!(SubscriptionStatus::Active.is_billable());
        assert!(SubscriptionStatus::PastDue.is_billable());
        assert!(!SubscriptionStatus::Canceled.is_billable());
    }
}
