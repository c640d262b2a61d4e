//! Autoaddress `findaddress` lookups, the primary Eircode provider.

use color_eyre::eyre::WrapErr;
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use crate::address::model::{first_present, StructuredAddress};
use crate::config::ProviderCredential;
use crate::eircode::Eircode;
use crate::utils::lenient_string;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindAddressResponse {
    #[serde(default)]
    result: Vec<AutoaddressResult>,
    total_results: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AutoaddressResult {
    building: Option<String>,
    sub_building: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    building_number: Option<String>,
    organisation: Option<String>,
    building_name: Option<String>,
    street: Option<String>,
    thoroughfare: Option<String>,
    dependent_thoroughfare: Option<String>,
    address_line1: Option<String>,
    town: Option<String>,
    locality: Option<String>,
    dependent_locality: Option<String>,
    post_town: Option<String>,
    city: Option<String>,
}

impl From<AutoaddressResult> for StructuredAddress {
    fn from(r: AutoaddressResult) -> Self {
        Self {
            building: first_present([&r.building, &r.sub_building, &r.building_number, &r.organisation, &r.building_name])
                .unwrap_or_default(),
            street: first_present([&r.street, &r.thoroughfare, &r.dependent_thoroughfare, &r.address_line1])
                .unwrap_or_default(),
            city: first_present([&r.town, &r.locality, &r.dependent_locality, &r.post_town, &r.city])
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// `Ok(None)` when Autoaddress answers but has no match for the code.
pub(crate) async fn find_address(
    client: &Client,
    credential: &ProviderCredential,
    eircode: &Eircode,
) -> color_eyre::Result<Option<StructuredAddress>> {
    let url = format!("{}/2.0/findaddress", credential.base_url.trim_end_matches('/'));
    let resp = client
        .get(&url)
        .query(&[
            ("key", credential.api_key.as_str()),
            ("postcode", eircode.as_str()),
            ("country", "IE"),
            ("limit", "1"),
        ])
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<FindAddressResponse>()
        .await
        .wrap_err("malformed Autoaddress response")?;

    debug!("Autoaddress reported {:?} results for [{eircode}]", resp.total_results);
    Ok(resp.result.into_iter().next().map(StructuredAddress::from))
}
