use serde::Serialize;
use crate::address::{AddressSource, ResolutionError, ResolvedAddress};

/// One row of the batch resolution CSV
#[derive(Debug, Serialize)]
pub struct Record {
    pub eircode: String,
    building: String,
    street: String,
    city: String,
    country: String,
    postcode: String,
    pub source: Option<AddressSource>,
    error: String,
}

impl Record {
    pub fn from_result(eircode: String, result: Result<ResolvedAddress, ResolutionError>) -> Self {
        match result {
            Ok(ResolvedAddress { address, source }) => Self {
                eircode,
                building: address.building,
                street: address.street,
                city: address.city,
                country: address.country,
                postcode: address.postcode,
                source: Some(source),
                error: String::new(),
            },
            Err(e) => Self {
                eircode,
                building: String::new(),
                street: String::new(),
                city: String::new(),
                country: String::new(),
                postcode: String::new(),
                source: None,
                error: e.to_string(),
            },
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.source.is_some()
    }
}
