/// Email sender contract
///
/// Used by the scheduler to send billing receipts and failure notices
/// when the company has an email integration configured. Delivery is
/// best-effort: a failed email never fails the charge it describes.

use async_trait::async_trait;

/// Email sending error
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Stored credentials are missing a required field
    #[error("Invalid email credentials: {0}")]
    InvalidCredentials(String),

    /// Network or provider-side failure
    #[error("Email request failed: {0}")]
    RequestFailed(String),
}

/// An outbound email
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Email sender trait
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Provider slug, matching the `integrations.provider` column
    fn name(&self) -> &str;

    /// Sends one message
    async fn send(
        &self,
        credentials: &serde_json::Value,
        message: &EmailMessage,
    ) -> Result<(), EmailError>;
}
