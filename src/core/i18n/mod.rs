use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::core::feed::types::{DEFAULT_OBSTRUCTION_TYPE, MISSING_TIME};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

/// Translated text for `key`, or `key` itself when there is no entry.
pub fn translate(language: Language, key: &str) -> String {
    lookup(language, key)
        .map(ToString::to_string)
        .unwrap_or_else(|| key.to_string())
}

fn lookup(language: Language, key: &str) -> Option<&'static str> {
    let text = match (language, key) {
        (Language::Es, "activeBeacons") => "Balizas V16 Activas",
        (Language::Es, "loading") => "Cargando datos...",
        (Language::Es, "dataLoaded") => "Datos cargados correctamente",
        (Language::Es, "error") => "Error",
        (Language::Es, "lastUpdate") => "Última actualización",
        (Language::Es, "nextUpdate") => "Próxima actualización en",
        (Language::Es, "dgtNotice") => "La DGT solo publica información sobre la activación de dispositivos V16 en carreteras y autopistas nacionales. No se publican las balizas activadas en zonas urbanas ni en áreas alejadas de la red viaria.",
        (Language::Es, "languageSaved") => "Idioma guardado",
        (Language::Es, "beacon") => "Baliza V16",
        (Language::Es, "location") => "Ubicación",
        (Language::Es, "time") => "Hora",
        (Language::Es, "type") => "Tipo",
        (Language::Es, "unknown") => "Desconocido",
        (Language::Es, "vehicleStuck") => "Vehículo atascado",
        (Language::Es, "vehicleOnFire") => "Vehículo en llamas",
        (Language::Es, "vehicleSpunOut") => "Vehículo accidentado",
        (Language::Es, "vehicleBreakdown") => "Vehículo averiado",
        (Language::Es, "brokenDownVehicle") => "Vehículo averiado",
        (Language::Es, "accidentalSpillageOnTheRoad") => "Derrame en la carretera",
        (Language::Es, "vehicleStopped") => "Vehículo detenido",

        (Language::En, "activeBeacons") => "Active V16 Beacons",
        (Language::En, "loading") => "Loading data...",
        (Language::En, "dataLoaded") => "Data loaded successfully",
        (Language::En, "error") => "Error",
        (Language::En, "lastUpdate") => "Last update",
        (Language::En, "nextUpdate") => "Next update in",
        (Language::En, "dgtNotice") => "The DGT only publishes information on V16 device activation on national roads and highways. Beacons activated in urban areas or areas far from the road network are not published.",
        (Language::En, "languageSaved") => "Language saved",
        (Language::En, "beacon") => "V16 Beacon",
        (Language::En, "location") => "Location",
        (Language::En, "time") => "Time",
        (Language::En, "type") => "Type",
        (Language::En, "unknown") => "Unknown",
        (Language::En, "vehicleStuck") => "Vehicle stuck",
        (Language::En, "vehicleOnFire") => "Vehicle on fire",
        (Language::En, "vehicleSpunOut") => "Vehicle spun out",
        (Language::En, "vehicleBreakdown") => "Vehicle breakdown",
        (Language::En, "brokenDownVehicle") => "Broken down vehicle",
        (Language::En, "accidentalSpillageOnTheRoad") => "Accidental spillage on road",
        (Language::En, "vehicleStopped") => "Vehicle stopped",
        _ => return None,
    };
    Some(text)
}

pub fn format_obstruction_type(language: Language, obstruction_type: &str) -> String {
    if obstruction_type.trim().is_empty() {
        return translate(language, DEFAULT_OBSTRUCTION_TYPE);
    }
    translate(language, obstruction_type)
}

pub fn format_location(language: Language, location_label: &str) -> String {
    if location_label.is_empty() {
        translate(language, "unknown")
    } else {
        location_label.to_string()
    }
}

/// `dd/mm/yyyy, HH:MM` in the timestamp's own offset. Unparseable values are
/// shown verbatim.
pub fn format_observed_at(observed_at: &str) -> String {
    let trimmed = observed_at.trim();
    if trimmed.is_empty() || trimmed == MISSING_TIME {
        return MISSING_TIME.to_string();
    }
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(timestamp) => timestamp.format("%d/%m/%Y, %H:%M").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

pub fn format_countdown(language: Language, remaining_secs: u64) -> String {
    let seconds_label = match language {
        Language::Es => "segundos",
        Language::En => "seconds",
    };
    if remaining_secs == 0 {
        return format!("0 {seconds_label}");
    }

    let minutes = remaining_secs / 60;
    let seconds = remaining_secs % 60;
    if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds} {seconds_label}")
    }
}
