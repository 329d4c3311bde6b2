use chrono::{DateTime, Local};

use crate::core::feed::types::BeaconRecord;
use crate::core::i18n::{
    format_countdown, format_location, format_observed_at, format_obstruction_type, translate,
    Language,
};

/// Popup-style block for one beacon.
pub fn render_beacon(language: Language, beacon: &BeaconRecord) -> String {
    format!(
        "{}  [{}]  {:.5}, {:.5}\n  {}: {}\n  {}: {}\n  {}: {}",
        translate(language, "beacon"),
        beacon.id,
        beacon.latitude,
        beacon.longitude,
        translate(language, "location"),
        format_location(language, &beacon.location_label),
        translate(language, "time"),
        format_observed_at(&beacon.observed_at),
        translate(language, "type"),
        format_obstruction_type(language, &beacon.obstruction_type),
    )
}

pub fn render_summary(
    language: Language,
    beacons: &[BeaconRecord],
    fetched_at: DateTime<Local>,
) -> String {
    let mut blocks = vec![
        format!("{}: {}", translate(language, "activeBeacons"), beacons.len()),
        format!(
            "{}: {}",
            translate(language, "lastUpdate"),
            fetched_at.format("%H:%M:%S")
        ),
    ];
    blocks.extend(beacons.iter().map(|beacon| render_beacon(language, beacon)));
    blocks.push(translate(language, "dgtNotice"));
    blocks.join("\n\n")
}

pub fn render_error(language: Language, message: &str) -> String {
    format!("{}: {message}", translate(language, "error"))
}

pub fn render_next_update(language: Language, remaining_secs: u64) -> String {
    format!(
        "{} {}",
        translate(language, "nextUpdate"),
        format_countdown(language, remaining_secs)
    )
}
