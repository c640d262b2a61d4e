//! BigDataCloud's free client-side reverse geocoder. No key needed.

use color_eyre::eyre::WrapErr;
use reqwest::Client;
use serde::Deserialize;
use crate::address::model::{first_present, Coordinates, StructuredAddress, DEFAULT_COUNTRY};
use crate::address::placeholder;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ReverseGeocodeResponse {
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    locality: Option<String>,
    principal_subdivision: Option<String>,
    city: Option<String>,
    country_name: Option<String>,
    postcode: Option<String>,
}

impl From<ReverseGeocodeResponse> for StructuredAddress {
    fn from(r: ReverseGeocodeResponse) -> Self {
        Self {
            // the service has no building numbers
            building: placeholder::random_building_number().to_string(),
            street: first_present([&r.road, &r.neighbourhood, &r.suburb, &r.locality, &r.principal_subdivision])
                .unwrap_or_else(|| placeholder::DEFAULT_STREET.to_string()),
            city: first_present([&r.city, &r.locality, &r.principal_subdivision, &r.country_name])
                .unwrap_or_else(|| placeholder::DEFAULT_CITY.to_string()),
            country: first_present([&r.country_name])
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            postcode: first_present([&r.postcode]).unwrap_or_default(),
        }
    }
}

pub(crate) async fn reverse_geocode(
    client: &Client,
    base_url: &str,
    coordinates: Coordinates,
) -> color_eyre::Result<StructuredAddress> {
    let url = format!("{}/data/reverse-geocode-client", base_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("localityLanguage", "en".to_string()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json::<ReverseGeocodeResponse>()
        .await
        .wrap_err("malformed BigDataCloud response")?;

    Ok(resp.into())
}
