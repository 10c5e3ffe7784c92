//! Transactional mail client
//!
//! Sends OTP mails through the provider's HTTP JSON API. Delivery failures
//! surface as AppError::MailError; callers decide whether that aborts the
//! flow or is merely logged.

use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Mail API client
#[derive(Clone)]
pub struct Mailer {
    client: Client,
    api_endpoint: String,
    api_key: String,
    from_address: String,
}

#[derive(Serialize)]
struct MailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl Mailer {
    /// Create a new Mailer from configuration
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: Client::new(),
            api_endpoint: config.api_endpoint.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }

    /// Send a registration/reset OTP mail
    pub async fn send_otp(&self, to: &str, otp: &str) -> AppResult<()> {
        let body = format!(
            "Kode OTP Anda: {}\n\nKode berlaku selama 10 menit. \
             Jangan bagikan kode ini kepada siapa pun.",
            otp
        );

        self.send(to, "Kode Verifikasi", &body).await
    }

    async fn send(&self, to: &str, subject: &str, text: &str) -> AppResult<()> {
        let payload = MailPayload {
            from: &self.from_address,
            to,
            subject,
            text,
        };

        let response = self
            .client
            .post(&self.api_endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::MailError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "mail provider rejected request");
            return Err(AppError::MailError(format!(
                "provider returned {}",
                status
            )));
        }

        Ok(())
    }
}
