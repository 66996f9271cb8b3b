/// SendGrid email adapter
///
/// Thin wrapper over the SendGrid v3 mail send API. Credentials are the
/// company's integration document: `{"api_key": "SG....",
/// "from_email": "billing@shop.example"}`.

use async_trait::async_trait;
use serde_json::json;

use super::email::{EmailError, EmailMessage, EmailSender};

const SENDGRID_API_BASE: &str = "https://api.sendgrid.com/v3";

/// SendGrid mailer
pub struct SendGridMailer {
    client: reqwest::Client,
    api_base: String,
}

impl SendGridMailer {
    /// Creates a mailer against the public SendGrid API
    pub fn new() -> Self {
        Self::with_base(SENDGRID_API_BASE)
    }

    /// Creates a mailer against a custom base URL (for tests)
    pub fn with_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for SendGridMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailSender for SendGridMailer {
    fn name(&self) -> &str {
        "sendgrid"
    }

    async fn send(
        &self,
        credentials: &serde_json::Value,
        message: &EmailMessage,
    ) -> Result<(), EmailError> {
        let api_key = credentials
            .get("api_key")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EmailError::InvalidCredentials("missing api_key".to_string()))?;

        let from_email = credentials
            .get("from_email")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EmailError::InvalidCredentials("missing from_email".to_string()))?;

        let body = json!({
            "personalizations": [{ "to": [{ "email": &message.to }] }],
            "from": { "email": from_email },
            "subject": &message.subject,
            "content": [{ "type": "text/plain", "value": &message.body }],
        });

        let response = self
            .client
            .post(format!("{}/mail/send", self.api_base))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::RequestFailed(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(EmailError::RequestFailed(format!(
                "sendgrid returned {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_requires_credentials() {
        let mailer = SendGridMailer::new();

        let message = EmailMessage {
            to: "owner@shop.example".to_string(),
            subject: "Receipt".to_string(),
            body: "Thanks".to_string(),
        };

        let result = mailer.send(&serde_json::json!({}), &message).await;
        assert!(matches!(result, Err(EmailError::InvalidCredentials(_))));
    }
}
