use serde::{Deserialize, Serialize};

/// One country's visit counter as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Visit")]
    pub visit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniqueVisits {
    #[serde(rename = "Count")]
    pub count: u64,
}

/// Geography display names that differ from the names the backend stores.
const NAME_CORRECTIONS: &[(&str, &str)] = &[
    ("United States", "United States of America"),
    ("Bosnia and Herz.", "Bosnia and Herzegovina"),
    ("Trinidad & Tobago", "Trinidad and Tobago"),
];

/// Map a geography display name to the name the visit backend expects.
///
/// The first `&` is spelled out as `and` before the correction table is consulted.
pub fn backend_country_name(display_name: &str) -> String {
    let name = display_name.replacen('&', "and", 1);
    NAME_CORRECTIONS
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(name)
}

/// Number of countries with at least one recorded visit.
pub fn unique_count<'a>(records: impl IntoIterator<Item = &'a VisitRecord>) -> u64 {
    records.into_iter().filter(|record| record.visit > 0).count() as u64
}
