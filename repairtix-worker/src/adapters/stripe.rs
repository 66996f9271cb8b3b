/// Stripe payment adapter
///
/// Thin wrapper over the Stripe charges API. Credentials are the
/// company's integration document: `{"secret_key": "sk_...",
/// "customer_id": "cus_..."}`.

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::payment::{ChargeOutcome, ChargeRequest, PaymentProvider, ProviderError};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe gateway
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
}

/// Subset of Stripe's charge object we read back
#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    /// Creates a gateway against the public Stripe API
    pub fn new() -> Self {
        Self::with_base(STRIPE_API_BASE)
    }

    /// Creates a gateway against a custom base URL (for tests)
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    /// Converts a decimal amount to the smallest currency unit
    fn to_minor_units(amount: Decimal) -> i64 {
        (amount * Decimal::from(100)).round().to_i64().unwrap_or(0)
    }
}

impl Default for StripeGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProvider for StripeGateway {
    fn name(&self) -> &str {
        "stripe"
    }

    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, ProviderError> {
        let secret_key = request
            .credentials
            .get("secret_key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidCredentials("missing secret_key".to_string())
            })?;

        let customer_id = request
            .credentials
            .get("customer_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidCredentials("missing customer_id".to_string())
            })?;

        let amount_minor = Self::to_minor_units(request.amount);

        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", request.currency.to_lowercase()),
            ("customer", customer_id.to_string()),
            ("description", request.description.clone()),
        ];

        let response = self
            .client
            .post(format!("{}/charges", self.api_base))
            .basic_auth(secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if response.status().is_success() {
            let charge: StripeCharge = response
                .json()
                .await
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

            if charge.status == "succeeded" {
                Ok(ChargeOutcome {
                    reference: charge.id,
                })
            } else {
                Err(ProviderError::Declined(format!(
                    "charge {} in status {}",
                    charge.id, charge.status
                )))
            }
        } else if response.status().is_client_error() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .map(|b| b.error.message)
                .unwrap_or_else(|_| "card error".to_string());

            Err(ProviderError::Declined(message))
        } else {
            Err(ProviderError::RequestFailed(format!(
                "stripe returned {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(StripeGateway::to_minor_units(Decimal::new(2900, 2)), 2900);
        assert_eq!(StripeGateway::to_minor_units(Decimal::from(79)), 7900);
        assert_eq!(StripeGateway::to_minor_units(Decimal::ZERO), 0);
    }

    #[tokio::test]
    async fn test_charge_requires_credentials() {
        let gateway = StripeGateway::new();

        let request = ChargeRequest {
            company_id: uuid::Uuid::new_v4(),
            subscription_id: uuid::Uuid::new_v4(),
            amount: Decimal::new(2900, 2),
            currency: "USD".to_string(),
            description: "RepairTix Starter".to_string(),
            credentials: serde_json::json!({}),
        };

        let result = gateway.charge(&request).await;
        assert!(matches!(result, Err(ProviderError::InvalidCredentials(_))));
    }
}
