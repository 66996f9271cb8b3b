/// Billing scheduler
///
/// The worker's main loop. Each cycle it lists subscriptions whose paid
/// period has lapsed and charges each one through the company's payment
/// integration:
///
/// ```text
/// BillingScheduler
///   ├─> Subscription::list_due: find lapsed subscriptions
///   ├─> Integration::find_by_provider + CredentialCipher: decrypt keys
///   ├─> PaymentProvider::charge: execute the charge
///   ├─> Subscription::mark_charged / mark_past_due: record the outcome
///   └─> EmailSender::send: best-effort receipt / failure notice
/// ```
///
/// A failed charge marks that subscription past due and never aborts the
/// cycle; the next cycle retries it because the period end is only
/// advanced on success.
///
/// # Example
///
/// ```no_run
/// use repairtix_shared::crypto::CredentialCipher;
/// use repairtix_worker::scheduler::BillingScheduler;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, cipher: CredentialCipher) -> anyhow::Result<()> {
/// let scheduler = BillingScheduler::new(pool, cipher);
/// scheduler.run().await?;
/// # Ok(())
/// # }
/// ```

use repairtix_shared::crypto::CredentialCipher;
use repairtix_shared::models::{
    company::Company,
    integration::Integration,
    subscription::Subscription,
};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::adapters::{
    ChargeRequest, EmailMessage, EmailSender, PaymentProvider, SendGridMailer, StripeGateway,
};

/// Billing scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Seconds between billing scans
    pub poll_interval_secs: u64,

    /// Max due subscriptions processed per cycle
    pub batch_size: i64,

    /// Currency charged
    pub currency: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            poll_interval_secs: 3600,
            batch_size: 100,
            currency: "USD".to_string(),
        }
    }
}

/// Billing scheduler
pub struct BillingScheduler {
    db: PgPool,
    cipher: CredentialCipher,
    config: SchedulerConfig,

    /// Payment providers by slug
    providers: HashMap<String, Arc<dyn PaymentProvider>>,

    /// Email senders by slug
    mailers: HashMap<String, Arc<dyn EmailSender>>,

    shutdown_token: CancellationToken,
}

impl BillingScheduler {
    /// Creates a scheduler with the default provider registry
    pub fn new(db: PgPool, cipher: CredentialCipher) -> Self {
        Self::with_config(db, cipher, SchedulerConfig::default())
    }

    /// Creates a scheduler with custom configuration
    pub fn with_config(db: PgPool, cipher: CredentialCipher, config: SchedulerConfig) -> Self {
        let mut scheduler = BillingScheduler {
            db,
            cipher,
            config,
            providers: HashMap::new(),
            mailers: HashMap::new(),
            shutdown_token: CancellationToken::new(),
        };

        scheduler.register_provider(Arc::new(StripeGateway::new()));
        scheduler.register_mailer(Arc::new(SendGridMailer::new()));
        scheduler
    }

    /// Registers a payment provider
    pub fn register_provider(&mut self, provider: Arc<dyn PaymentProvider>) {
        let name = provider.name().to_string();
        tracing::info!(provider = %name, "Registering payment provider");
        self.providers.insert(name, provider);
    }

    /// Registers an email sender
    pub fn register_mailer(&mut self, mailer: Arc<dyn EmailSender>) {
        let name = mailer.name().to_string();
        tracing::info!(mailer = %name, "Registering email sender");
        self.mailers.insert(name, mailer);
    }

    /// Gets the shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the billing loop until shutdown
    pub async fn run(&self) -> anyhow::Result<()> {
        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            batch_size = self.config.batch_size,
            "Billing scheduler starting"
        );

        loop {
            if self.shutdown_token.is_cancelled() {
                tracing::info!("Billing scheduler shut down");
                break;
            }

            if let Err(e) = self.run_cycle().await {
                tracing::error!(error = %e, "Billing cycle failed");
            }

            tokio::select! {
                _ = sleep(Duration::from_secs(self.config.poll_interval_secs)) => {}
                _ = self.shutdown_token.cancelled() => {}
            }
        }

        Ok(())
    }

    /// One billing cycle: charge every due subscription
    ///
    /// Per-subscription failures are recorded and logged; only a failure
    /// to list the batch itself is returned as an error.
    pub async fn run_cycle(&self) -> anyhow::Result<()> {
        let due = Subscription::list_due(&self.db, self.config.batch_size).await?;

        if due.is_empty() {
            tracing::debug!("No subscriptions due");
            return Ok(());
        }

        tracing::info!(count = due.len(), "Charging due subscriptions");

        for subscription in due {
            match self.charge_subscription(&subscription).await {
                Ok(reference) => {
                    tracing::info!(
                        subscription_id = %subscription.id,
                        company_id = %subscription.company_id,
                        plan = subscription.plan.as_str(),
                        reference = %reference,
                        "Subscription charged"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        subscription_id = %subscription.id,
                        company_id = %subscription.company_id,
                        error = %error,
                        "Subscription charge failed"
                    );

                    if let Err(e) =
                        Subscription::mark_past_due(&self.db, subscription.id, &error).await
                    {
                        tracing::error!(
                            subscription_id = %subscription.id,
                            error = %e,
                            "Failed to mark subscription past due"
                        );
                    }

                    self.notify(
                        subscription.company_id,
                        "RepairTix payment failed",
                        &format!(
                            "We could not renew the subscription for one of your locations: {}. \
                             Please update your payment details.",
                            error
                        ),
                    )
                    .await;
                }
            }
        }

        Ok(())
    }

    /// Charges one subscription; returns the processor reference
    async fn charge_subscription(&self, subscription: &Subscription) -> Result<String, String> {
        let amount = subscription.plan.monthly_price();

        // Nothing to collect: a lapsed free trial is past due until the
        // company picks a paid plan
        if amount.is_zero() {
            return Err("trial ended; select a paid plan".to_string());
        }

        let (provider, integration) = self
            .payment_integration(subscription.company_id)
            .await
            .map_err(|e| format!("database error: {}", e))?
            .ok_or_else(|| "no payment integration configured".to_string())?;

        let credentials = self
            .cipher
            .open(&integration.credentials_sealed)
            .map_err(|e| format!("credential decryption failed: {}", e))?;

        let credentials: serde_json::Value = serde_json::from_str(&credentials)
            .map_err(|e| format!("credential document is not valid JSON: {}", e))?;

        let request = ChargeRequest {
            company_id: subscription.company_id,
            subscription_id: subscription.id,
            amount,
            currency: self.config.currency.clone(),
            description: format!("RepairTix {} plan", subscription.plan.as_str()),
            credentials,
        };

        let outcome = provider.charge(&request).await.map_err(|e| e.to_string())?;

        Subscription::mark_charged(&self.db, subscription.id)
            .await
            .map_err(|e| format!("charge succeeded but could not be recorded: {}", e))?;

        self.notify(
            subscription.company_id,
            "RepairTix payment receipt",
            &format!(
                "Your {} plan renewal of {} {} was charged successfully (ref {}).",
                subscription.plan.as_str(),
                amount,
                self.config.currency,
                outcome.reference
            ),
        )
        .await;

        Ok(outcome.reference)
    }

    /// Finds the first configured payment integration for a company
    async fn payment_integration(
        &self,
        company_id: uuid::Uuid,
    ) -> Result<Option<(Arc<dyn PaymentProvider>, Integration)>, sqlx::Error> {
        for (name, provider) in &self.providers {
            if let Some(integration) =
                Integration::find_by_provider(&self.db, company_id, name).await?
            {
                return Ok(Some((provider.clone(), integration)));
            }
        }

        Ok(None)
    }

    /// Sends a billing email through the company's email integration
    ///
    /// Best-effort: missing integrations and delivery failures are logged
    /// at debug level and otherwise ignored.
    async fn notify(&self, company_id: uuid::Uuid, subject: &str, body: &str) {
        let company = match Company::find_by_id(&self.db, company_id).await {
            Ok(Some(company)) => company,
            _ => return,
        };

        let Some(to) = company.email else {
            return;
        };

        for (name, mailer) in &self.mailers {
            let integration =
                match Integration::find_by_provider(&self.db, company_id, name).await {
                    Ok(Some(integration)) => integration,
                    _ => continue,
                };

            let credentials = match self
                .cipher
                .open(&integration.credentials_sealed)
                .ok()
                .and_then(|c| serde_json::from_str::<serde_json::Value>(&c).ok())
            {
                Some(credentials) => credentials,
                None => continue,
            };

            let message = EmailMessage {
                to: to.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
            };

            if let Err(e) = mailer.send(&credentials, &message).await {
                tracing::debug!(mailer = %name, error = %e, "Billing email failed");
            }

            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.poll_interval_secs, 3600);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.currency, "USD");
    }

    // End-to-end scheduler tests (charge → period advance, decline →
    // past_due) require a database and live in repairtix-api/tests/.
}
