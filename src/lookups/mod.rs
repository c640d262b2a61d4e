//! Reference data (genders, GPs, surgeries, appointment types) for the
//! booking form's dropdowns.
//!
//! Two upstream sources exist: the n8n lookup webhook and the
//! patient-info-prereqs API. They name the doctor fields differently
//! (`GPID`/`GPName` vs `DoctorID`/`DoctorName`), so each has its own mapping.

use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use crate::config::LookupConfig;
use crate::form::BookingForm;
use crate::utils::retry_wrapper;

mod model;
pub mod payload;

pub use model::{AppointmentType, DoctorRecord, Gender, ReferenceData, SurgeryRecord};
pub use payload::LookupPayload;

use model::{PrereqLookups, WebhookLookups};

const LOOKUPS_WORKFLOW: &str = "lookups";
const REQUEST_SOURCE: &str = "Spectrum IRE Booking System";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus { status: u16, url: String, body: String },

    #[error("unrecognized lookup payload shape: {found}")]
    UnrecognizedShape { found: String },

    #[error("embedded lookup data is not a JSON object: {0}")]
    EmbeddedJson(#[source] serde_json::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    workflowtype: &'a str,
    timestamp: String,
    user_agent: &'a str,
    source: &'a str,
}

impl WebhookRequest<'_> {
    fn lookups() -> Self {
        Self {
            workflowtype: LOOKUPS_WORKFLOW,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: USER_AGENT,
            source: REQUEST_SOURCE,
        }
    }
}

/// Decode a lookup webhook response body into reference data.
pub fn decode_webhook_response(value: Value) -> Result<ReferenceData, LookupError> {
    let payload = LookupPayload::detect(value)?;
    debug!("lookup payload shape: {}", payload.shape());
    let body = payload.into_body()?;
    let lookups = serde_json::from_value::<WebhookLookups>(Value::Object(body))
        .map_err(|source| LookupError::Deserialize { context: "lookup webhook data".into(), source })?;
    Ok(lookups.into())
}

/// Decode a patient-info-prereqs response body into reference data.
pub fn decode_prereqs_response(value: Value) -> Result<ReferenceData, LookupError> {
    let lookups = serde_json::from_value::<PrereqLookups>(value)
        .map_err(|source| LookupError::Deserialize { context: "patient info prereqs".into(), source })?;
    Ok(lookups.into())
}

/// Upstream a [`LookupClient`] reads reference data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    Webhook,
    Prereqs,
}

/// HTTP client for the reference-data sources.
pub struct LookupClient {
    client: Client,
    config: LookupConfig,
}

impl LookupClient {
    pub fn new(config: LookupConfig) -> Result<Self, LookupError> {
        Ok(
            Self {
                client: Client::builder()
                    .timeout(config.timeout)
                    .user_agent(USER_AGENT)
                    .build()?,
                config,
            }
        )
    }

    pub async fn fetch(&self, source: LookupSource) -> Result<ReferenceData, LookupError> {
        match source {
            LookupSource::Webhook => self.fetch_webhook().await,
            LookupSource::Prereqs => self.fetch_prereqs().await,
        }
    }

    /// POST the lookups workflow request to the webhook.
    pub async fn fetch_webhook(&self) -> Result<ReferenceData, LookupError> {
        let url = self.config.webhook_url.as_str();
        let body = retry_wrapper("lookup webhook", self.config.max_retries, || async {
            let resp = self.client
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .json(&WebhookRequest::lookups())
                .send()
                .await?;
            read_body(resp, url).await
        })
            .await?;

        let data = decode_webhook_response(parse_json(&body, "lookup webhook response")?)?;
        log_counts("lookup webhook", &data);
        Ok(data)
    }

    /// GET the patient-info-prereqs API.
    pub async fn fetch_prereqs(&self) -> Result<ReferenceData, LookupError> {
        let url = self.config.prereqs_url.as_str();
        let body = retry_wrapper("patient info prereqs", self.config.max_retries, || async {
            let resp = self.client
                .get(url)
                .header(ACCEPT, "application/json")
                .send()
                .await?;
            read_body(resp, url).await
        })
            .await?;

        let data = decode_prereqs_response(parse_json(&body, "patient info prereqs response")?)?;
        log_counts("patient info prereqs", &data);
        Ok(data)
    }
}

/// Fetch reference data while the form shows its dropdowns as loading.
///
/// A failure is kept in the form's lookups error; a success clears it.
pub async fn load_for_form(
    client: &LookupClient,
    source: LookupSource,
    form: &Mutex<BookingForm>,
) -> Result<ReferenceData, LookupError> {
    {
        let mut form = form.lock().await;
        form.status.loading_lookups = true;
        form.status.lookups_error = None;
    }

    let result = client.fetch(source).await;

    let mut form = form.lock().await;
    form.status.loading_lookups = false;
    if let Err(e) = &result {
        warn!("cannot load dropdown data from {source:?}: {e}");
        form.status.lookups_error = Some(e.to_string());
    }
    result
}

async fn read_body(resp: reqwest::Response, url: &str) -> Result<String, LookupError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(LookupError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }
    Ok(body)
}

fn parse_json(body: &str, context: &str) -> Result<Value, LookupError> {
    serde_json::from_str(body)
        .map_err(|source| LookupError::Deserialize { context: context.to_string(), source })
}

fn log_counts(source: &str, data: &ReferenceData) {
    info!(
        "{source}: {} genders, {} doctors, {} surgeries, {} appointment types",
        data.genders.len(),
        data.doctors.len(),
        data.surgeries.len(),
        data.appointment_types.len(),
    );
}
