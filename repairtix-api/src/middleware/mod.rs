//! HTTP middleware specific to the API server.

pub mod security;
