use std::collections::HashMap;
use std::sync::LazyLock;

/// Routing keys recognised by the booking flow, grouped by county.
///
/// Some districts straddle county lines; each key appears once, under the
/// county it is listed for first.
const ROUTING_AREAS: &[(&str, &[&str])] = &[
    ("Dublin", &[
        "D01", "D02", "D03", "D04", "D05", "D06", "D07", "D08", "D09", "D10",
        "D11", "D12", "D13", "D14", "D15", "D16", "D17", "D18", "D20", "D22", "D24",
    ]),
    ("Cork", &["T12", "T23", "T45", "P12", "P31", "P43", "P51", "P61", "P72", "P85"]),
    ("Galway", &["H91", "H53", "H54", "H62", "H65", "H71", "F92", "F94"]),
    ("Limerick", &["V94", "V95", "V42", "V14", "V23", "V35"]),
    ("Waterford", &["X91", "X35", "X42"]),
    ("Kilkenny", &["R95", "R32", "R21"]),
    ("Louth", &["A91", "A92"]),
    ("Meath", &["C15", "A83", "A85"]),
    ("Kildare", &["W23", "R56", "W91"]),
    ("Wicklow", &["A98", "A63", "A67"]),
    ("Wexford", &["Y35", "Y25", "Y21"]),
    ("Carlow", &["R93"]),
    ("Laois", &["R35"]),
    ("Kerry", &["V92", "V93", "V31"]),
    ("Clare", &["V15"]),
    ("Tipperary", &["E41", "E34", "E25", "E91"]),
    ("Sligo", &["F91", "F26"]),
    ("Mayo", &["F23", "F28", "F12"]),
    ("Roscommon", &["F42", "F45"]),
    ("Leitrim", &["N41"]),
    ("Longford", &["N39"]),
    ("Westmeath", &["N37", "N91"]),
    ("Offaly", &["R42"]),
    ("Cavan", &["H12"]),
    ("Monaghan", &["H18"]),
    ("Donegal", &["F93"]),
];

static ROUTING_KEYS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    ROUTING_AREAS.iter()
        .flat_map(|(county, keys)| keys.iter().map(move |key| (*key, *county)))
        .collect()
});

/// County served by a routing key, if the key is known.
pub fn routing_area(key: &str) -> Option<&'static str> {
    ROUTING_KEYS.get(key).copied()
}

pub fn is_known_routing_key(key: &str) -> bool {
    ROUTING_KEYS.contains_key(key)
}

/// Number of distinct routing keys in the table.
pub fn routing_key_count() -> usize {
    ROUTING_KEYS.len()
}
