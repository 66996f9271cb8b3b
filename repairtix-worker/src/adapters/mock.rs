/// Mock adapters for tests
///
/// The mock payment provider can be configured to decline, and both
/// mocks count their calls so tests can assert on scheduler behavior.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::email::{EmailError, EmailMessage, EmailSender};
use super::payment::{ChargeOutcome, ChargeRequest, PaymentProvider, ProviderError};

/// Mock payment provider
pub struct MockPaymentProvider {
    /// When true, every charge is declined
    decline: Arc<AtomicBool>,

    /// Charges attempted
    charges: Arc<AtomicUsize>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self {
            decline: Arc::new(AtomicBool::new(false)),
            charges: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes subsequent charges fail
    pub fn set_decline(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    /// Number of charges attempted
    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError> {
        self.charges.fetch_add(1, Ordering::SeqCst);

        if self.decline.load(Ordering::SeqCst) {
            return Err(ProviderError::Declined("card declined".to_string()));
        }

        Ok(ChargeOutcome {
            reference: format!("mock_{}", request.subscription_id),
        })
    }
}

/// Mock email sender
pub struct MockMailer {
    sent: Arc<AtomicUsize>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of messages sent
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for MockMailer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(
        &self,
        _credentials: &serde_json::Value,
        _message: &EmailMessage,
    ) -> Result<(), EmailError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn request() -> ChargeRequest {
        ChargeRequest {
            company_id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            amount: Decimal::new(2900, 2),
            currency: "USD".to_string(),
            description: "RepairTix Starter".to_string(),
            credentials: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_succeeds() {
        let provider = MockPaymentProvider::new();

        let outcome = provider.charge(&request()).await.unwrap();
        assert!(outcome.reference.starts_with("mock_"));
        assert_eq!(provider.charge_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_declines() {
        let provider = MockPaymentProvider::new();
        provider.set_decline(true);

        let result = provider.charge(&request()).await;
        assert!(matches!(result, Err(ProviderError::Declined(_))));
        assert_eq!(provider.charge_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_mailer_counts() {
        let mailer = MockMailer::new();

        let message = EmailMessage {
            to: "owner@shop.example".to_string(),
            subject: "Receipt".to_string(),
            body: "Thanks".to_string(),
        };

        mailer.send(&serde_json::json!({}), &message).await.unwrap();
        mailer.send(&serde_json::json!({}), &message).await.unwrap();

        assert_eq!(mailer.sent_count(), 2);
    }
}
