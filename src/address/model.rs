use std::fmt;
use serde::Serialize;

pub const DEFAULT_COUNTRY: &str = "Ireland";

/// basic structure for an address, empty strings mean "absent"
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StructuredAddress {
    pub building: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub postcode: String,
}

impl StructuredAddress {
    pub fn is_empty(&self) -> bool {
        self.building.is_empty() && self.street.is_empty() && self.city.is_empty()
    }

    /// comma-joined non-empty fields
    pub fn one_line(&self) -> String {
        [&self.building, &self.street, &self.city, &self.postcode, &self.country]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Which provider produced an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum AddressSource {
    Autoaddress,
    Ecad,
    GoogleMaps,
    BigDataCloud,
    Placeholder,
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressSource::Autoaddress => "Autoaddress",
            AddressSource::Ecad => "ECAD",
            AddressSource::GoogleMaps => "Google Maps",
            AddressSource::BigDataCloud => "BigDataCloud",
            AddressSource::Placeholder => "placeholder",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: StructuredAddress,
    pub source: AddressSource,
}

/// WGS84 latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// First non-blank candidate, trimmed.
pub(crate) fn first_present<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Option<String>>,
{
    candidates.into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
