//! Runtime configuration.
//!
//! Everything here is resolved once at startup and passed into the clients;
//! nothing else in the crate reads environment variables.

use std::env;
use std::time::Duration;
use log::{info, warn};

pub const AUTOADDRESS_BASE_URL: &str = "https://api.autoaddress.com";
pub const ECAD_BASE_URL: &str = "https://api.eircode.ie";
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
pub const BIGDATACLOUD_BASE_URL: &str = "https://api.bigdatacloud.net";

pub const LOOKUPS_WEBHOOK_URL: &str = "https://local-n8n.vitonta.com/webhook/115d0f35-6f15-4b38-9697-a702343ceccd";
pub const PATIENT_INFO_PREREQS_URL: &str = "https://ooh_web.vitonta.com/AppBooking/GetPatientInfoPreReqs";
pub const SMS_API_ENDPOINT: &str = "https://your-backend.com/api/sms";

/// Webhook and API calls are aborted after this long.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An API key for one provider plus the endpoint it is used against.
#[derive(Clone)]
pub struct ProviderCredential {
    pub api_key: String,
    pub base_url: String,
}

impl ProviderCredential {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Build a credential from an env-style value, dropping empty and
    /// template placeholder keys (`your_..._here`).
    pub fn from_key(api_key: Option<String>, base_url: impl Into<String>) -> Option<Self> {
        let api_key = api_key?.trim().to_string();
        if api_key.is_empty() || is_placeholder_key(&api_key) {
            return None;
        }
        Some(Self::new(api_key, base_url))
    }
}

// keep keys out of debug output
impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn is_placeholder_key(key: &str) -> bool {
    key.starts_with("your_") && key.ends_with("_here")
}

/// Provider settings for the [`AddressResolver`](crate::address::AddressResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub autoaddress: Option<ProviderCredential>,
    pub ecad: Option<ProviderCredential>,
    pub google_maps: Option<ProviderCredential>,
    /// BigDataCloud's client endpoint needs no key.
    pub bigdatacloud_base_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            autoaddress: None,
            ecad: None,
            google_maps: None,
            bigdatacloud_base_url: BIGDATACLOUD_BASE_URL.to_string(),
        }
    }
}

impl ResolverConfig {
    /// load provider credentials from environment variables
    ///
    /// `AUTOADDRESS_API_KEY`, `ECAD_API_KEY`, `ECAD_API_URL`, `GOOGLE_MAPS_API_KEY`
    pub fn from_env() -> Self {
        let config = Self {
            autoaddress: ProviderCredential::from_key(env::var("AUTOADDRESS_API_KEY").ok(), AUTOADDRESS_BASE_URL),
            ecad: ProviderCredential::from_key(
                env::var("ECAD_API_KEY").ok(),
                env::var("ECAD_API_URL").unwrap_or_else(|_| ECAD_BASE_URL.to_string()),
            ),
            google_maps: ProviderCredential::from_key(env::var("GOOGLE_MAPS_API_KEY").ok(), GOOGLE_MAPS_BASE_URL),
            ..Default::default()
        };

        if config.has_eircode_provider() {
            info!(
                "eircode providers configured: autoaddress={}, ecad={}, google_maps={}",
                config.autoaddress.is_some(),
                config.ecad.is_some(),
                config.google_maps.is_some(),
            );
        } else {
            warn!("no eircode provider configured, eircode lookups will fail");
        }
        config
    }

    /// Whether at least one Eircode lookup provider has a credential.
    pub fn has_eircode_provider(&self) -> bool {
        self.autoaddress.is_some() || self.ecad.is_some() || self.google_maps.is_some()
    }
}

/// Endpoints for the reference-data sources.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub webhook_url: String,
    pub prereqs_url: String,
    /// Extra attempts after the first failed fetch. `0` disables retries.
    pub max_retries: usize,
    pub timeout: Duration,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            webhook_url: LOOKUPS_WEBHOOK_URL.to_string(),
            prereqs_url: PATIENT_INFO_PREREQS_URL.to_string(),
            max_retries: 2,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl LookupConfig {
    /// `LOOKUPS_WEBHOOK_URL`, `PATIENT_INFO_PREREQS_URL`; defaults otherwise.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            webhook_url: env::var("LOOKUPS_WEBHOOK_URL").unwrap_or(defaults.webhook_url),
            prereqs_url: env::var("PATIENT_INFO_PREREQS_URL").unwrap_or(defaults.prereqs_url),
            ..defaults
        }
    }
}

/// Where outgoing SMS messages are posted.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            endpoint: SMS_API_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl SmsConfig {
    /// `SMS_API_ENDPOINT`; the default endpoint is a template and will not answer.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        match env::var("SMS_API_ENDPOINT") {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self { endpoint: endpoint.trim().to_string(), ..defaults },
            _ => {
                warn!("SMS_API_ENDPOINT not set, using [{}]", defaults.endpoint);
                defaults
            }
        }
    }
}
