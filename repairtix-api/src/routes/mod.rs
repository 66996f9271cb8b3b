/// API route handlers, organized by resource
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, token refresh
/// - `company`: Company profile and locations
/// - `users`: Team members and invitations
/// - `customers`, `assets`: Client records and their devices
/// - `tickets`: Repair jobs
/// - `catalog`, `inventory`: Parts catalog and stock
/// - `purchase_orders`: Supplier restocking
/// - `invoices`, `payments`: Billing customers
/// - `billing`: Per-location subscriptions
/// - `integrations`: Third-party credentials

pub mod assets;
pub mod auth;
pub mod billing;
pub mod catalog;
pub mod company;
pub mod customers;
pub mod health;
pub mod integrations;
pub mod inventory;
pub mod invoices;
pub mod payments;
pub mod purchase_orders;
pub mod tickets;
pub mod users;

use serde::Deserialize;

/// Common pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Returns (limit, offset) with defaults applied and the limit capped
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, 200);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams {
            limit: None,
            offset: None,
        };
        assert_eq!(params.bounds(), (50, 0));
    }

    #[test]
    fn test_pagination_caps() {
        let params = PaginationParams {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(params.bounds(), (200, 0));

        let params = PaginationParams {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(params.bounds(), (1, 20));
    }
}
