//! Eircode normalization and validation.
//!
//! An Eircode is 7 alphanumeric characters: a 3-character routing key naming a
//! postal district followed by a 4-character unique identifier. Only the
//! routing key is checked against a table; the identifier is free-form.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;
use thiserror::Error;

mod routing;

pub use routing::{is_known_routing_key, routing_area, routing_key_count};

pub const EIRCODE_LEN: usize = 7;
const ROUTING_KEY_LEN: usize = 3;

static EIRCODE_REG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z0-9]{7}$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EircodeError {
    #[error("Please enter an Eircode (e.g., D02XY45)")]
    Empty,

    #[error("Eircode must be exactly 7 characters. You entered {entered} characters, {missing} more needed.")]
    TooShort { entered: usize, missing: usize },

    #[error("Eircode must be exactly 7 characters. Please remove extra characters.")]
    TooLong { entered: usize },

    #[error("Invalid Eircode format. Must be 3 letters/numbers + 4 letters/numbers (e.g., D02XY45)")]
    InvalidFormat,

    #[error("Invalid routing key \"{key}\". This is not a valid Irish postal area.")]
    InvalidRoutingKey { key: String },
}

/// Strip all whitespace and upper-case.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn validate_format(code: &str) -> bool {
    EIRCODE_REG.is_match(code)
}

pub fn validate_routing_key(code: &str) -> bool {
    code.get(..ROUTING_KEY_LEN)
        .is_some_and(is_known_routing_key)
}

pub fn is_valid(code: &str) -> bool {
    validate_format(code) && validate_routing_key(code)
}

/// Normalize `raw` and check it, reporting the first rule it breaks.
///
/// Rules are checked in order: emptiness, length, character class, routing key.
pub fn validate(raw: &str) -> Result<Eircode, EircodeError> {
    let code = normalize(raw);
    let entered = code.chars().count();

    if entered == 0 {
        return Err(EircodeError::Empty);
    }
    if entered < EIRCODE_LEN {
        return Err(EircodeError::TooShort { entered, missing: EIRCODE_LEN - entered });
    }
    if entered > EIRCODE_LEN {
        return Err(EircodeError::TooLong { entered });
    }
    if !validate_format(&code) {
        return Err(EircodeError::InvalidFormat);
    }
    if !validate_routing_key(&code) {
        return Err(EircodeError::InvalidRoutingKey { key: code[..ROUTING_KEY_LEN].to_string() });
    }
    Ok(Eircode(code))
}

/// A normalized Eircode with a known routing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Eircode(String);

impl Eircode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn routing_key(&self) -> &str {
        &self.0[..ROUTING_KEY_LEN]
    }

    pub fn unique_identifier(&self) -> &str {
        &self.0[ROUTING_KEY_LEN..]
    }

    /// County of the routing key.
    pub fn county(&self) -> &'static str {
        routing_area(self.routing_key()).unwrap_or_default()
    }

    /// The printed form, with a space after the routing key: `D02 XY45`.
    pub fn spaced(&self) -> String {
        format!("{} {}", self.routing_key(), self.unique_identifier())
    }
}

impl fmt::Display for Eircode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Eircode {
    type Err = EircodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl AsRef<str> for Eircode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
