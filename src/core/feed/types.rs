use serde::{Deserialize, Serialize};

/// Cause type the DGT uses for V16 beacon activations.
pub const V16_CAUSE_TYPE: &str = "vehicleObstruction";
pub const ACTIVE_STATUS: &str = "active";
pub const MISSING_TIME: &str = "N/A";
/// Translation key used when the feed carries no obstruction subtype.
pub const DEFAULT_OBSTRUCTION_TYPE: &str = "vehicleStopped";

/// One active V16 beacon as published in a single fetch.
///
/// `id` comes from the record's `id` attribute when present. Otherwise it is
/// `beacon_<index>` with the record's position in the document, which shifts
/// whenever the upstream order changes and must not be used as an identity
/// across fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeaconRecord {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub observed_at: String,
    pub obstruction_type: String,
    pub location_label: String,
}

pub fn fallback_beacon_id(index: usize) -> String {
    format!("beacon_{index}")
}

/// Joins the non-empty location parts with `", "`.
pub fn build_location_label(road_name: &str, municipality: &str, province: &str) -> String {
    [road_name, municipality, province]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
