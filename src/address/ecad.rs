//! Eircode Address Database (ECAD) lookups, the secondary Eircode provider.

use color_eyre::eyre::WrapErr;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use crate::address::model::{first_present, StructuredAddress};
use crate::config::ProviderCredential;
use crate::eircode::Eircode;
use crate::utils::lenient_string;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    address: Option<EcadAddress>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EcadAddress {
    building_name: Option<String>,
    sub_building_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    building_number: Option<String>,
    organisation_name: Option<String>,
    thoroughfare: Option<String>,
    dependent_thoroughfare: Option<String>,
    street: Option<String>,
    dependent_locality: Option<String>,
    post_town: Option<String>,
    locality: Option<String>,
    town: Option<String>,
}

impl From<EcadAddress> for StructuredAddress {
    fn from(a: EcadAddress) -> Self {
        Self {
            building: first_present([&a.building_name, &a.sub_building_name, &a.building_number, &a.organisation_name])
                .unwrap_or_default(),
            street: first_present([&a.thoroughfare, &a.dependent_thoroughfare, &a.street])
                .unwrap_or_default(),
            city: first_present([&a.dependent_locality, &a.post_town, &a.locality, &a.town])
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}

pub(crate) async fn lookup(
    client: &Client,
    credential: &ProviderCredential,
    eircode: &Eircode,
) -> color_eyre::Result<Option<StructuredAddress>> {
    let url = format!("{}/v1/lookup/{}", credential.base_url.trim_end_matches('/'), eircode);
    let resp = client
        .get(&url)
        .bearer_auth(&credential.api_key)
        .header("X-API-Key", &credential.api_key)
        .header(ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<LookupResponse>()
        .await
        .wrap_err("malformed ECAD response")?;

    Ok(resp.address.map(StructuredAddress::from))
}
