//! Address resolution for the current-location step.
//!
//! Eircodes go through Autoaddress, then ECAD, then Google Maps, stopping at
//! the first provider with a usable answer. Coordinates go through Google Maps,
//! then BigDataCloud, then a made-up placeholder, so they always resolve.
//! Providers are awaited one after another, never raced.

use log::{info, warn};
use reqwest::Client;
use thiserror::Error;
use crate::config::{ProviderCredential, ResolverConfig};
use crate::eircode::{self, Eircode, EircodeError};

mod autoaddress;
mod bigdatacloud;
mod ecad;
mod google;
pub mod model;
pub mod placeholder;

pub use model::{AddressSource, Coordinates, ResolvedAddress, StructuredAddress, DEFAULT_COUNTRY};

/// Eircode providers in the order they are asked.
const EIRCODE_PROVIDERS: [AddressSource; 3] = [
    AddressSource::Autoaddress,
    AddressSource::Ecad,
    AddressSource::GoogleMaps,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Invalid(#[from] EircodeError),

    #[error("Unable to find address for Eircode \"{eircode}\". No address lookup service is configured (Autoaddress, ECAD or Google Maps); contact your administrator to set up API access.")]
    NotConfigured { eircode: String },

    #[error("No address found for Eircode \"{eircode}\". Please verify the Eircode is correct and try again.")]
    NoMatch { eircode: String },
}

pub struct AddressResolver {
    client: Client,
    config: ResolverConfig,
}

impl AddressResolver {
    pub fn new(config: ResolverConfig) -> Result<Self, reqwest::Error> {
        Ok(
            Self {
                client: Client::builder()
                    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                    .build()?,
                config,
            }
        )
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Validate `raw` and look it up. Invalid codes never reach the network.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_eircode(&self, raw: &str) -> Result<ResolvedAddress, ResolutionError> {
        let eircode = eircode::validate(raw)?;
        self.resolve_eircode(&eircode).await
    }

    pub async fn resolve_eircode(&self, eircode: &Eircode) -> Result<ResolvedAddress, ResolutionError> {
        for source in EIRCODE_PROVIDERS {
            let Some(credential) = self.credential(source) else {
                info!("{source} not configured, skipping");
                continue;
            };
            info!("looking up [{eircode}] with {source}...");
            match self.query_eircode(source, credential, eircode).await {
                Ok(Some(address)) if !address.is_empty() => {
                    info!("{source} resolved [{eircode}]");
                    return Ok(ResolvedAddress {
                        address: complete_eircode_address(address, eircode),
                        source,
                    });
                }
                Ok(_) => info!("{source} has no address for [{eircode}]"),
                Err(e) => warn!("{source} lookup failed for [{eircode}]: {e:?}"),
            }
        }

        let eircode = eircode.to_string();
        if self.config.has_eircode_provider() {
            Err(ResolutionError::NoMatch { eircode })
        } else {
            Err(ResolutionError::NotConfigured { eircode })
        }
    }

    /// Best-effort address for a position; falls back to a placeholder.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_by_coordinates(&self, coordinates: Coordinates) -> ResolvedAddress {
        if let Some(credential) = &self.config.google_maps {
            match google::reverse_geocode(&self.client, credential, coordinates).await {
                Ok(Some(address)) => {
                    return ResolvedAddress { address, source: AddressSource::GoogleMaps };
                }
                Ok(None) => info!("Google Maps has no address at ({coordinates})"),
                Err(e) => warn!("Google Maps reverse geocoding failed at ({coordinates}): {e:?}"),
            }
        }

        match bigdatacloud::reverse_geocode(&self.client, &self.config.bigdatacloud_base_url, coordinates).await {
            Ok(address) => ResolvedAddress { address, source: AddressSource::BigDataCloud },
            Err(e) => {
                warn!("BigDataCloud reverse geocoding failed at ({coordinates}), using a placeholder: {e:?}");
                ResolvedAddress {
                    address: placeholder::placeholder_address(),
                    source: AddressSource::Placeholder,
                }
            }
        }
    }

    fn credential(&self, source: AddressSource) -> Option<&ProviderCredential> {
        match source {
            AddressSource::Autoaddress => self.config.autoaddress.as_ref(),
            AddressSource::Ecad => self.config.ecad.as_ref(),
            AddressSource::GoogleMaps => self.config.google_maps.as_ref(),
            AddressSource::BigDataCloud | AddressSource::Placeholder => None,
        }
    }

    async fn query_eircode(
        &self,
        source: AddressSource,
        credential: &ProviderCredential,
        eircode: &Eircode,
    ) -> color_eyre::Result<Option<StructuredAddress>> {
        match source {
            AddressSource::Autoaddress => autoaddress::find_address(&self.client, credential, eircode).await,
            AddressSource::Ecad => ecad::lookup(&self.client, credential, eircode).await,
            AddressSource::GoogleMaps => google::forward_geocode(&self.client, credential, eircode).await,
            AddressSource::BigDataCloud | AddressSource::Placeholder => Ok(None),
        }
    }
}

/// The searched code becomes the postcode; country defaults to Ireland.
fn complete_eircode_address(mut address: StructuredAddress, eircode: &Eircode) -> StructuredAddress {
    if address.country.is_empty() {
        address.country = DEFAULT_COUNTRY.to_string();
    }
    address.postcode = eircode.to_string();
    address
}
