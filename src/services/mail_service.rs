use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailSettings;
use crate::utils::AppError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const VERIFICATION_SUBJECT: &str = "True Feedback | Verification code";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
        code: &str,
    ) -> Result<(), AppError>;
}

/// Picks the Resend mailer when an API key is configured, otherwise logs codes
pub fn build_mailer(settings: &MailSettings) -> Box<dyn Mailer> {
    match &settings.resend_api_key {
        Some(api_key) => Box::new(ResendMailer::new(api_key.clone(), settings.from.clone())),
        None => {
            log::warn!("⚠️  RESEND_API_KEY not set, verification codes will only be logged");
            Box::new(LogMailer)
        }
    }
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: String,
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
        code: &str,
    ) -> Result<(), AppError> {
        log::info!("📧 Sending verification email to {}", email);

        let payload = ResendEmail {
            from: &self.from,
            to: vec![email],
            subject: VERIFICATION_SUBJECT,
            html: render_verification_email(username, code),
        };

        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Resend request failed: {}", e);
                AppError::MailError("Failed to send verification email".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Resend API error {}: {}", status, body);
            return Err(AppError::MailError("Failed to send verification email".to_string()));
        }

        log::info!("✅ Verification email sent to {}", email);
        Ok(())
    }
}

/// Development mailer
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
        code: &str,
    ) -> Result<(), AppError> {
        log::info!("📧 [dev] verification code for {} <{}>: {}", username, email, code);
        Ok(())
    }
}

/// Verification email body. `username` and `code` arrive already validated.
pub fn render_verification_email(username: &str, code: &str) -> String {
    format!(
        "<!DOCTYPE html>\
         <html lang=\"en\"><head><title>Verification Code</title></head>\
         <body style=\"font-family: Roboto, Helvetica, sans-serif\">\
         <h2>Hello {username},</h2>\
         <p>Thank you for registering with True Feedback. \
         Please use the following verification code to complete your registration:</p>\
         <p style=\"font-size: 28px; font-weight: bold; letter-spacing: 6px\">{code}</p>\
         <p>This code expires in one hour. If you did not request this code, please ignore this email.</p>\
         </body></html>"
    )
}
