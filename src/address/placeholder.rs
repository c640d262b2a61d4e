//! Plausible made-up addresses for when every reverse geocoder has failed.

use rand::seq::IndexedRandom;
use rand::Rng;
use crate::address::model::{StructuredAddress, DEFAULT_COUNTRY};

pub const DEFAULT_STREET: &str = "Main Street";
pub const DEFAULT_CITY: &str = "Current Location";

const IRISH_CITIES: &[&str] = &["Dublin", "Cork", "Galway", "Limerick", "Waterford", "Drogheda", "Dundalk", "Swords"];
const IRISH_STREETS: &[&str] = &[
    "Main Street", "Church Street", "High Street", "Market Street", "Bridge Street",
    "Mill Street", "Castle Street", "Park Road", "Station Road", "Dublin Road",
];

pub fn random_building_number() -> u32 {
    rand::rng().random_range(1..=200)
}

pub fn placeholder_address() -> StructuredAddress {
    let mut rng = rand::rng();
    StructuredAddress {
        building: rng.random_range(1..=200u32).to_string(),
        street: IRISH_STREETS.choose(&mut rng).copied().unwrap_or(DEFAULT_STREET).to_string(),
        city: IRISH_CITIES.choose(&mut rng).copied().unwrap_or(DEFAULT_CITY).to_string(),
        country: DEFAULT_COUNTRY.to_string(),
        postcode: String::new(),
    }
}
