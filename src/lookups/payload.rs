//! Shape detection for lookup webhook responses.
//!
//! The webhook wraps the same lookup object in several envelopes depending on
//! how its workflow was last edited. Detection picks exactly one envelope, in
//! a fixed priority order, and anything else is rejected.

use serde_json::{Map, Value};
use crate::lookups::LookupError;

const LOOKUP_KEYS: [&str; 3] = ["Gender", "Doctors", "AppointmentTypes"];

#[derive(Debug, Clone, PartialEq)]
pub enum LookupPayload {
    /// `[{"data": "<json object>"}, ...]`
    ArrayWrappedString(String),
    /// `[{...lookups}, ...]`
    ArrayWrappedObject(Map<String, Value>),
    /// `{"data": "<json object>"}`; a blank `data` string counts as absent
    DataString(String),
    /// `{"data": {...lookups}}`
    DataObject(Map<String, Value>),
    /// `{"Gender": [...], "Doctors": [...], ...}`
    Root(Map<String, Value>),
}

impl LookupPayload {
    pub fn detect(value: Value) -> Result<Self, LookupError> {
        match value {
            Value::Array(items) => match items.into_iter().next() {
                Some(Value::Object(mut first)) => match first.remove("data") {
                    Some(Value::String(data)) if !data.trim().is_empty() => Ok(Self::ArrayWrappedString(data)),
                    Some(other) => {
                        first.insert("data".to_string(), other);
                        Ok(Self::ArrayWrappedObject(first))
                    }
                    None => Ok(Self::ArrayWrappedObject(first)),
                },
                Some(other) => Err(unrecognized(format!("array of {}", kind(&other)))),
                None => Err(unrecognized("empty array")),
            },
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::String(data)) if !data.trim().is_empty() => Ok(Self::DataString(data)),
                Some(Value::Object(data)) => Ok(Self::DataObject(data)),
                Some(other) => {
                    map.insert("data".to_string(), other);
                    Self::root(map)
                }
                None => Self::root(map),
            },
            other => Err(unrecognized(kind(&other))),
        }
    }

    fn root(map: Map<String, Value>) -> Result<Self, LookupError> {
        if LOOKUP_KEYS.iter().any(|key| map.contains_key(*key)) {
            Ok(Self::Root(map))
        } else {
            Err(unrecognized("object without data or lookup keys"))
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::ArrayWrappedString(_) => "array[0].data string",
            Self::ArrayWrappedObject(_) => "array[0] object",
            Self::DataString(_) => "data string",
            Self::DataObject(_) => "data object",
            Self::Root(_) => "root object",
        }
    }

    /// The lookup object, parsing embedded JSON strings.
    pub fn into_body(self) -> Result<Map<String, Value>, LookupError> {
        match self {
            Self::ArrayWrappedString(data) | Self::DataString(data) => {
                serde_json::from_str(&data).map_err(LookupError::EmbeddedJson)
            }
            Self::ArrayWrappedObject(map) | Self::DataObject(map) | Self::Root(map) => Ok(map),
        }
    }
}

fn unrecognized(found: impl Into<String>) -> LookupError {
    LookupError::UnrecognizedShape { found: found.into() }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        LookupPayload::detect(value).unwrap().into_body().unwrap()
    }

    #[test]
    fn every_envelope_yields_the_same_body() {
        let lookups = json!({"Gender": [{"Id": 1, "GenderName": "Female"}]});
        let encoded = lookups.to_string();
        let expected = lookups.as_object().unwrap().clone();

        assert_eq!(body(json!([{ "data": encoded }])), expected);
        assert_eq!(body(json!([lookups.clone()])), expected);
        assert_eq!(body(json!({ "data": encoded })), expected);
        assert_eq!(body(json!({ "data": lookups.clone() })), expected);
        assert_eq!(body(lookups), expected);
    }

    #[test]
    fn detection_follows_priority_order() {
        let encoded = json!({"Doctors": []}).to_string();
        assert!(matches!(LookupPayload::detect(json!([{ "data": encoded }])), Ok(LookupPayload::ArrayWrappedString(_))));
        assert!(matches!(LookupPayload::detect(json!([{ "data": 1 }])), Ok(LookupPayload::ArrayWrappedObject(_))));
        assert!(matches!(LookupPayload::detect(json!({ "data": {}, "Gender": [] })), Ok(LookupPayload::DataObject(_))));
        assert!(matches!(LookupPayload::detect(json!({ "data": null, "Gender": [] })), Ok(LookupPayload::Root(_))));
    }

    #[test]
    fn blank_data_string_falls_through_to_the_next_shape() {
        let root = LookupPayload::detect(json!({"data": "", "Gender": [{"Id": 1, "GenderName": "F"}]})).unwrap();
        assert!(matches!(root, LookupPayload::Root(_)));
        assert!(root.into_body().unwrap().contains_key("Gender"));

        let first = LookupPayload::detect(json!([{"data": "  ", "Doctors": []}])).unwrap();
        assert!(matches!(first, LookupPayload::ArrayWrappedObject(_)));
        assert!(first.into_body().unwrap().contains_key("Doctors"));

        let err = LookupPayload::detect(json!({"data": ""})).unwrap_err();
        assert!(matches!(err, LookupError::UnrecognizedShape { .. }), "{err}");
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        for value in [json!([]), json!("lookups"), json!(null), json!({"status": "ok"}), json!([1, 2])] {
            let err = LookupPayload::detect(value.clone()).unwrap_err();
            assert!(matches!(err, LookupError::UnrecognizedShape { .. }), "{value}: {err}");
        }
    }

    #[test]
    fn embedded_string_must_be_a_json_object() {
        let not_json = LookupPayload::detect(json!({"data": "{oops"})).unwrap();
        assert!(matches!(not_json.into_body(), Err(LookupError::EmbeddedJson(_))));

        let array = LookupPayload::detect(json!({"data": "[1]"})).unwrap();
        assert!(matches!(array.into_body(), Err(LookupError::EmbeddedJson(_))));
    }
}
