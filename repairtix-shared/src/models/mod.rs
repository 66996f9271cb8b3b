//! Database models.
//!
//! Every tenant-scoped model takes a `company_id` on its queries and
//! filters by it; soft-deleted rows (`deleted_at IS NOT NULL`) are
//! excluded from reads. Handlers must only ever pass the company id from
//! the authenticated context.

pub mod asset;
pub mod catalog;
pub mod company;
pub mod customer;
pub mod integration;
pub mod invitation;
pub mod inventory;
pub mod invoice;
pub mod location;
pub mod payment;
pub mod purchase_order;
pub mod subscription;
pub mod ticket;
pub mod user;
