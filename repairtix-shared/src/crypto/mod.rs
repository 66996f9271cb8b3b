//! Encryption utilities for third-party integration credentials.

pub mod credentials;

pub use credentials::{CredentialCipher, CryptoError};
