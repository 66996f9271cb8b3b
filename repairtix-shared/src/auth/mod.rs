//! Authentication and authorization.
//!
//! - `jwt`: access/refresh token creation and validation
//! - `password`: Argon2id hashing and password strength rules
//! - `permissions`: static role→permission mapping (RBAC)
//! - `middleware`: Axum middleware that resolves the company context
//!   from the bearer token

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
