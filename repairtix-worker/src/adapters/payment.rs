/// Payment provider contract
///
/// A payment provider charges a company's stored payment method for a
/// subscription renewal. Implementations are thin HTTP adapters; retry
/// policy and state transitions live in the scheduler, not here.
///
/// # Example
///
/// ```no_run
/// use repairtix_worker::adapters::{ChargeOutcome, ChargeRequest, PaymentProvider, ProviderError};
/// use async_trait::async_trait;
///
/// struct MyGateway;
///
/// #[async_trait]
/// impl PaymentProvider for MyGateway {
///     fn name(&self) -> &str {
///         "my_gateway"
///     }
///
///     async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError> {
///         // POST to the processor...
///         Ok(ChargeOutcome {
///             reference: "ch_123".to_string(),
///         })
///     }
/// }
/// ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Payment provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The processor rejected the charge (declined card, bad account)
    #[error("Charge declined: {0}")]
    Declined(String),

    /// Stored credentials are missing a required field
    #[error("Invalid provider credentials: {0}")]
    InvalidCredentials(String),

    /// Network or processor-side failure
    #[error("Provider request failed: {0}")]
    RequestFailed(String),
}

/// A charge to execute against a provider
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Company being billed
    pub company_id: Uuid,

    /// Subscription the charge renews
    pub subscription_id: Uuid,

    /// Amount in the account currency
    pub amount: Decimal,

    /// ISO currency code
    pub currency: String,

    /// Human-readable statement line
    pub description: String,

    /// Decrypted provider credential document (JSON)
    pub credentials: serde_json::Value,
}

/// A successful charge
#[derive(Debug, Clone)]
pub struct ChargeOutcome {
    /// Processor-side charge reference
    pub reference: String,
}

/// Payment provider trait
///
/// Implementations must be cheap to clone behind an `Arc` and safe to
/// call concurrently.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider slug, matching the `integrations.provider` column
    fn name(&self) -> &str;

    /// Executes a charge
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError>;
}
