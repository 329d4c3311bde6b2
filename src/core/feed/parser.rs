use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use super::types::{
    build_location_label, fallback_beacon_id, BeaconRecord, ACTIVE_STATUS,
    DEFAULT_OBSTRUCTION_TYPE, MISSING_TIME, V16_CAUSE_TYPE,
};

pub const SITUATION_RECORD_TAG: &str = "situationRecord";

#[derive(Debug, thiserror::Error)]
pub enum FeedParseError {
    #[error("xml parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// How situation records were located in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLookup {
    /// `situationRecord` elements without a namespace.
    Unqualified,
    /// `situationRecord` in any namespace. Only tried when the unqualified
    /// search finds nothing; the published DATEX II v3 feed is namespaced
    /// while older mirrors and hand-made fixtures are not.
    AnyNamespace,
}

/// Extracts active V16 beacons from a DATEX II situation publication.
///
/// The whole document is parsed before any record is read, so malformed XML
/// never yields a partial list.
pub fn parse_beacons(xml: &str) -> Result<Vec<BeaconRecord>, FeedParseError> {
    let doc = Document::parse(xml)?;
    let (lookup, situations) = find_situation_records(&doc);
    info!(
        records = situations.len(),
        ?lookup,
        "situation records found"
    );

    let mut beacons = Vec::new();
    for (index, situation) in situations.iter().enumerate() {
        if let Some(beacon) = beacon_from_record(*situation, index) {
            beacons.push(beacon);
        }
    }

    info!(beacons = beacons.len(), "active V16 beacons extracted");
    Ok(beacons)
}

pub fn find_situation_records<'a, 'input>(
    doc: &'a Document<'input>,
) -> (RecordLookup, Vec<Node<'a, 'input>>) {
    let unqualified: Vec<_> = doc
        .descendants()
        .filter(|node| {
            node.is_element()
                && node.tag_name().namespace().is_none()
                && node.tag_name().name() == SITUATION_RECORD_TAG
        })
        .collect();
    if !unqualified.is_empty() {
        return (RecordLookup::Unqualified, unqualified);
    }

    let any_namespace = doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == SITUATION_RECORD_TAG)
        .collect();
    (RecordLookup::AnyNamespace, any_namespace)
}

fn beacon_from_record(situation: Node<'_, '_>, index: usize) -> Option<BeaconRecord> {
    let cause_type = child_text(situation, "causeType");
    let status = child_text(situation, "validityStatus");
    if cause_type != V16_CAUSE_TYPE || status != ACTIVE_STATUS {
        return None;
    }

    let id = situation
        .attribute("id")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| fallback_beacon_id(index));

    let (Some(latitude), Some(longitude)) = (
        find_child(situation, "latitude"),
        find_child(situation, "longitude"),
    ) else {
        debug!(%id, "skipping beacon without coordinates");
        return None;
    };
    let (Ok(latitude), Ok(longitude)) = (
        element_text(latitude).parse::<f64>(),
        element_text(longitude).parse::<f64>(),
    ) else {
        warn!(%id, "skipping beacon with unreadable coordinates");
        return None;
    };

    let location_label = build_location_label(
        &child_text(situation, "roadName"),
        &child_text(situation, "municipality"),
        &child_text(situation, "province"),
    );

    Some(BeaconRecord {
        id,
        latitude,
        longitude,
        observed_at: non_empty_or(child_text(situation, "overallStartTime"), MISSING_TIME),
        obstruction_type: non_empty_or(
            child_text(situation, "vehicleObstructionType"),
            DEFAULT_OBSTRUCTION_TYPE,
        ),
        location_label,
    })
}

/// First descendant element with the given local name, in document order.
fn find_child<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    parent
        .descendants()
        .skip(1)
        .find(|node| node.is_element() && node.tag_name().name() == name)
}

fn child_text(parent: Node<'_, '_>, name: &str) -> String {
    find_child(parent, name)
        .map(element_text)
        .unwrap_or_default()
}

/// Concatenated text of every text node below `node`, trimmed.
fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: &str = include_str!("../../../fixtures/datex2_plain.xml");
    const NAMESPACED: &str = include_str!("../../../fixtures/datex2_namespaced.xml");

    #[test]
    fn keeps_only_active_vehicle_obstructions_in_document_order() {
        let beacons = parse_beacons(PLAIN).expect("plain fixture must parse");
        let ids: Vec<&str> = beacons.iter().map(|beacon| beacon.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "beacon_2", "R6"]);
    }

    #[test]
    fn reads_fields_of_a_complete_record() {
        let beacons = parse_beacons(PLAIN).expect("plain fixture must parse");
        let first = &beacons[0];

        assert_eq!(first.latitude, 40.416775);
        assert_eq!(first.longitude, -3.70379);
        assert_eq!(first.observed_at, "2026-10-18T07:42:10+02:00");
        assert_eq!(first.obstruction_type, "vehicleStuck");
        assert_eq!(first.location_label, "A-1, Madrid");
    }

    #[test]
    fn fills_defaults_for_sparse_record() {
        let beacons = parse_beacons(PLAIN).expect("plain fixture must parse");
        let sparse = &beacons[1];

        assert_eq!(sparse.id, "beacon_2");
        assert_eq!(sparse.observed_at, "N/A");
        assert_eq!(sparse.obstruction_type, "vehicleStopped");
        assert_eq!(sparse.location_label, "");
    }

    #[test]
    fn passes_out_of_range_coordinates_through() {
        let beacons = parse_beacons(PLAIN).expect("plain fixture must parse");
        let last = beacons.last().expect("fixture has beacons");

        assert_eq!(last.id, "R6");
        assert_eq!(last.latitude, 95.5);
        assert_eq!(last.longitude, 200.25);
        assert_eq!(last.location_label, "Sevilla");
    }

    #[test]
    fn drops_record_missing_a_coordinate() {
        let beacons = parse_beacons(PLAIN).expect("plain fixture must parse");
        assert!(beacons.iter().all(|beacon| beacon.id != "R5"));
    }

    #[test]
    fn falls_back_to_namespaced_records() {
        let doc = Document::parse(NAMESPACED).expect("fixture must parse");
        let (lookup, records) = find_situation_records(&doc);
        assert_eq!(lookup, RecordLookup::AnyNamespace);
        assert_eq!(records.len(), 3);

        let beacons = parse_beacons(NAMESPACED).expect("namespaced fixture must parse");
        assert_eq!(beacons.len(), 2);
        assert_eq!(beacons[0].id, "GUID-V16-0001");
        assert_eq!(
            beacons[0].location_label,
            "AP-9, Santiago de Compostela, A Coruña"
        );
        assert_eq!(beacons[0].obstruction_type, "vehicleOnFire");
        assert_eq!(beacons[1].id, "GUID-V16-0003");
        assert_eq!(beacons[1].location_label, "A-62, Salamanca");
        assert_eq!(beacons[1].obstruction_type, "vehicleStopped");
    }

    #[test]
    fn prefers_unqualified_records_when_present() {
        let doc = Document::parse(PLAIN).expect("fixture must parse");
        let (lookup, records) = find_situation_records(&doc);
        assert_eq!(lookup, RecordLookup::Unqualified);
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn fallback_id_counts_skipped_records() {
        let xml = r#"
            <payload>
              <situationRecord id="a"><validityStatus>inactive</validityStatus></situationRecord>
              <situationRecord id="b"><validityStatus>inactive</validityStatus></situationRecord>
              <situationRecord>
                <validityStatus>active</validityStatus>
                <causeType>vehicleObstruction</causeType>
                <latitude>40.0</latitude>
                <longitude>-3.0</longitude>
              </situationRecord>
            </payload>
        "#;
        let beacons = parse_beacons(xml).expect("inline xml must parse");
        assert_eq!(beacons.len(), 1);
        assert_eq!(beacons[0].id, "beacon_2");
    }

    #[test]
    fn skips_record_with_unreadable_coordinate() {
        let xml = r#"
            <payload>
              <situationRecord id="x">
                <validityStatus>active</validityStatus>
                <causeType>vehicleObstruction</causeType>
                <latitude></latitude>
                <longitude>-3.0</longitude>
              </situationRecord>
            </payload>
        "#;
        let beacons = parse_beacons(xml).expect("inline xml must parse");
        assert!(beacons.is_empty());
    }

    #[test]
    fn empty_publication_is_not_an_error() {
        let beacons = parse_beacons("<payload/>").expect("empty payload must parse");
        assert!(beacons.is_empty());
    }

    #[test]
    fn malformed_xml_is_rejected() {
        let truncated = &PLAIN[..PLAIN.len() / 2];
        let result = parse_beacons(truncated);
        assert!(matches!(result, Err(FeedParseError::Xml(_))));
    }
}
