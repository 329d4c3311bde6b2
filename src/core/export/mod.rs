use serde::Serialize;
use serde_json::{json, Value};

use crate::core::feed::types::BeaconRecord;

/// Bounding box of a beacon list, in degrees.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Extent {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

/// GeoJSON `FeatureCollection` with one `Point` per beacon.
pub fn to_geojson(beacons: &[BeaconRecord]) -> Value {
    let features: Vec<Value> = beacons
        .iter()
        .map(|beacon| {
            json!({
                "type": "Feature",
                "id": beacon.id,
                "geometry": {
                    "type": "Point",
                    "coordinates": [beacon.longitude, beacon.latitude],
                },
                "properties": {
                    "id": beacon.id,
                    "time": beacon.observed_at,
                    "type": beacon.obstruction_type,
                    "location": beacon.location_label,
                },
            })
        })
        .collect();

    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(bounds) = extent(beacons) {
        collection["bbox"] = json!([
            bounds.min_longitude,
            bounds.min_latitude,
            bounds.max_longitude,
            bounds.max_latitude
        ]);
    }
    collection
}

pub fn extent(beacons: &[BeaconRecord]) -> Option<Extent> {
    let (first, rest) = beacons.split_first()?;
    let start = Extent {
        min_longitude: first.longitude,
        min_latitude: first.latitude,
        max_longitude: first.longitude,
        max_latitude: first.latitude,
    };
    Some(rest.iter().fold(start, |bounds, beacon| Extent {
        min_longitude: bounds.min_longitude.min(beacon.longitude),
        min_latitude: bounds.min_latitude.min(beacon.latitude),
        max_longitude: bounds.max_longitude.max(beacon.longitude),
        max_latitude: bounds.max_latitude.max(beacon.latitude),
    }))
}
