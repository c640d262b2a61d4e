//! Google Maps geocoding: forward lookups for Eircodes, reverse lookups for
//! coordinates.

use color_eyre::eyre::{bail, WrapErr};
use reqwest::Client;
use serde::Deserialize;
use crate::address::model::{Coordinates, StructuredAddress, DEFAULT_COUNTRY};
use crate::address::placeholder;
use crate::config::ProviderCredential;
use crate::eircode::Eircode;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResult {
    /// long name of the first component tagged with any of `kinds`
    fn find(&self, kinds: &[&str]) -> Option<&str> {
        self.address_components.iter()
            .find(|c| c.types.iter().any(|t| kinds.contains(&t.as_str())))
            .map(|c| c.long_name.as_str())
            .filter(|name| !name.trim().is_empty())
    }
}

impl GeocodeResponse {
    /// First result, `None` for `ZERO_RESULTS`, error for any other non-OK status.
    fn into_first_result(self) -> color_eyre::Result<Option<GeocodeResult>> {
        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().next()),
            "ZERO_RESULTS" => Ok(None),
            status => bail!(
                "geocoding status {status}: {}",
                self.error_message.as_deref().unwrap_or("no error message")
            ),
        }
    }
}

async fn geocode(client: &Client, credential: &ProviderCredential, query: &[(&str, &str)]) -> color_eyre::Result<GeocodeResponse> {
    let url = format!("{}{}", credential.base_url.trim_end_matches('/'), GEOCODE_PATH);
    client
        .get(&url)
        .query(query)
        .query(&[("key", credential.api_key.as_str())])
        .send()
        .await?
        .error_for_status()?
        .json::<GeocodeResponse>()
        .await
        .wrap_err("malformed Google geocoding response")
}

/// Rooftop-precision street address for an Eircode.
///
/// A result only counts when it carries a building number or a street.
pub(crate) async fn forward_geocode(
    client: &Client,
    credential: &ProviderCredential,
    eircode: &Eircode,
) -> color_eyre::Result<Option<StructuredAddress>> {
    let address = format!("{eircode}, Ireland");
    let resp = geocode(client, credential, &[
        ("address", address.as_str()),
        ("components", "country:IE"),
        ("result_type", "street_address"),
        ("location_type", "ROOFTOP"),
    ])
        .await?;

    Ok(resp.into_first_result()?.and_then(|result| forward_address(&result)))
}

fn forward_address(result: &GeocodeResult) -> Option<StructuredAddress> {
    let building = result.find(&["street_number"])
        .or_else(|| result.find(&["premise"]))
        .unwrap_or_default();
    let street = result.find(&["route"]).unwrap_or_default();
    if building.is_empty() && street.is_empty() {
        return None;
    }
    Some(StructuredAddress {
        building: building.to_string(),
        street: street.to_string(),
        city: result.find(&["locality"])
            .or_else(|| result.find(&["administrative_area_level_2"]))
            .unwrap_or_default()
            .to_string(),
        country: result.find(&["country"]).unwrap_or(DEFAULT_COUNTRY).to_string(),
        postcode: String::new(),
    })
}

pub(crate) async fn reverse_geocode(
    client: &Client,
    credential: &ProviderCredential,
    coordinates: Coordinates,
) -> color_eyre::Result<Option<StructuredAddress>> {
    let latlng = format!("{},{}", coordinates.latitude, coordinates.longitude);
    let resp = geocode(client, credential, &[("latlng", latlng.as_str())]).await?;
    Ok(resp.into_first_result()?.map(|result| reverse_address(&result)))
}

fn reverse_address(result: &GeocodeResult) -> StructuredAddress {
    StructuredAddress {
        building: result.find(&["street_number"])
            .or_else(|| result.find(&["premise"]))
            .map(str::to_string)
            .unwrap_or_else(|| placeholder::random_building_number().to_string()),
        street: result.find(&["route"])
            .or_else(|| result.find(&["sublocality"]))
            .or_else(|| result.find(&["neighborhood"]))
            .unwrap_or(placeholder::DEFAULT_STREET)
            .to_string(),
        city: result.find(&["locality", "administrative_area_level_2"])
            .or_else(|| result.find(&["administrative_area_level_1"]))
            .unwrap_or(placeholder::DEFAULT_CITY)
            .to_string(),
        country: result.find(&["country"]).unwrap_or(DEFAULT_COUNTRY).to_string(),
        postcode: result.find(&["postal_code"]).unwrap_or_default().to_string(),
    }
}
