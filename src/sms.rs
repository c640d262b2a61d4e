//! Outgoing SMS through the booking backend.

use std::sync::LazyLock;
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::config::SmsConfig;

/// One SMS segment.
pub const MAX_MESSAGE_LEN: usize = 160;

static PHONE_REG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{9,14}$").unwrap());

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("Phone number is required")]
    MissingPhone,

    #[error("Please enter a valid international phone number (e.g., +353871234567)")]
    InvalidPhone,

    #[error("Message is required")]
    MissingMessage,

    #[error("Message must be 160 characters or less")]
    MessageTooLong,

    #[error("cannot build SMS HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Server { status: u16, message: String },
}

/// A validated message, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsMessage {
    to: String,
    message: String,
}

impl SmsMessage {
    /// The number keeps only digits and `+`; the text is trimmed.
    pub fn new(to: &str, message: &str) -> Result<Self, SmsError> {
        if to.trim().is_empty() {
            return Err(SmsError::MissingPhone);
        }
        let to = to.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect::<String>();
        if !PHONE_REG.is_match(&to) {
            return Err(SmsError::InvalidPhone);
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(SmsError::MissingMessage);
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(SmsError::MessageTooLong);
        }
        Ok(Self { to, message: message.to_string() })
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Default, Deserialize)]
struct SmsResponse {
    sid: Option<String>,
    message: Option<String>,
}

pub struct SmsClient {
    client: Client,
    endpoint: String,
}

impl SmsClient {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        Ok(
            Self {
                client: Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(SmsError::Client)?,
                endpoint: config.endpoint,
            }
        )
    }

    /// Post the message; returns the provider's message sid when it sends one.
    pub async fn send(&self, sms: &SmsMessage) -> Result<Option<String>, SmsError> {
        let resp = self.client
            .post(&self.endpoint)
            .json(sms)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<SmsResponse>(&body).unwrap_or_default();

        if !status.is_success() {
            let message = parsed.message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Server error: {}", status.as_u16()));
            warn!("SMS to [{}] rejected: {message}", sms.to);
            return Err(SmsError::Server { status: status.as_u16(), message });
        }

        match &parsed.sid {
            Some(sid) => info!("SMS sent to [{}], SID: {sid}", sms.to),
            None => info!("SMS sent to [{}]", sms.to),
        }
        Ok(parsed.sid)
    }
}
