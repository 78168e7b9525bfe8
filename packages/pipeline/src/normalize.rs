//! Raw record normalization.
//!
//! Turns each loosely-typed location entry into a [`LocationRecord`].
//! Normalization never fails: absent, null, or uncoercible fields take
//! their defaults, so downstream components can assume a complete record.

use geospy_location_models::{
    Confidence, Coordinates, LocationRecord, NO_EXPLANATION, UNKNOWN_LABEL,
};
use serde_json::Value;

const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lng", "lon"];

/// Normalizes every entry, preserving order.
#[must_use]
pub fn normalize(raw: &[Value]) -> Vec<LocationRecord> {
    raw.iter().map(normalize_record).collect()
}

/// Normalizes one entry. Non-object entries yield a fully defaulted record.
#[must_use]
pub fn normalize_record(raw: &Value) -> LocationRecord {
    let Some(obj) = raw.as_object() else {
        log::debug!("Location entry is not an object, using defaults: {raw}");
        return LocationRecord::default();
    };

    LocationRecord {
        city: text_field(obj.get("city"), UNKNOWN_LABEL),
        state: text_field(obj.get("state"), UNKNOWN_LABEL),
        country: text_field(obj.get("country"), UNKNOWN_LABEL),
        coordinates: coordinates_field(obj.get("coordinates")),
        confidence: confidence_field(obj.get("confidence")),
        explanation: text_field(obj.get("explanation"), NO_EXPLANATION),
    }
}

fn text_field(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn confidence_field(value: Option<&Value>) -> Confidence {
    match value {
        None | Some(Value::Null) => Confidence::default(),
        Some(Value::String(label)) => {
            let confidence = Confidence::from_label(label);
            if confidence == Confidence::Unknown && label != Confidence::Unknown.as_ref() {
                log::debug!("Unrecognized confidence label {label:?}, counting as Unknown");
            }
            confidence
        }
        Some(other) => {
            log::debug!("Non-string confidence {other}, counting as Unknown");
            Confidence::Unknown
        }
    }
}

fn coordinates_field(value: Option<&Value>) -> Coordinates {
    let Some(obj) = value.and_then(Value::as_object) else {
        return Coordinates::SENTINEL;
    };

    let axis = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
            .map_or(0.0, coerce_f64)
    };

    Coordinates::new(axis(LATITUDE_KEYS), axis(LONGITUDE_KEYS))
}

/// Coerces a JSON value to a finite float, or `0.0` when that is not
/// possible.
fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => v,
        _ => {
            log::debug!("Coordinate value {value} is not numeric, using 0.0");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_present_fields() {
        let record = normalize_record(&json!({
            "city": "Paris",
            "state": "Île-de-France",
            "country": "France",
            "coordinates": {"latitude": 48.8566, "longitude": 2.3522},
            "confidence": "High",
            "explanation": "Haussmann facades",
        }));
        assert_eq!(record.city, "Paris");
        assert_eq!(record.state, "Île-de-France");
        assert_eq!(record.country, "France");
        assert_eq!(record.confidence, Confidence::High);
        assert_eq!(record.explanation, "Haussmann facades");
        assert!((record.coordinates.latitude - 48.8566).abs() < f64::EPSILON);
        assert!((record.coordinates.longitude - 2.3522).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_missing_fields() {
        let record = normalize_record(&json!({"city": "Lyon"}));
        assert_eq!(record.city, "Lyon");
        assert_eq!(record.state, UNKNOWN_LABEL);
        assert_eq!(record.country, UNKNOWN_LABEL);
        assert_eq!(record.confidence, Confidence::Medium);
        assert_eq!(record.explanation, NO_EXPLANATION);
        assert!(record.coordinates.is_sentinel());
    }

    #[test]
    fn null_fields_are_missing() {
        let record = normalize_record(&json!({
            "city": null,
            "confidence": null,
            "coordinates": {"latitude": null, "longitude": 4.0},
        }));
        assert_eq!(record.city, UNKNOWN_LABEL);
        assert_eq!(record.confidence, Confidence::Medium);
        assert_eq!(record.coordinates, Coordinates::new(0.0, 4.0));
    }

    #[test]
    fn accepts_short_coordinate_keys() {
        let record = normalize_record(&json!({
            "coordinates": {"lat": 45.764, "lng": 4.8357},
        }));
        assert_eq!(record.coordinates, Coordinates::new(45.764, 4.8357));

        let record = normalize_record(&json!({
            "coordinates": {"lat": "-33.86", "lon": "151.21"},
        }));
        assert_eq!(record.coordinates, Coordinates::new(-33.86, 151.21));
    }

    #[test]
    fn uncoercible_numbers_become_zero() {
        let record = normalize_record(&json!({
            "coordinates": {"latitude": "north-ish", "longitude": true},
        }));
        assert!(record.coordinates.is_sentinel());

        let record = normalize_record(&json!({
            "coordinates": {"latitude": "NaN", "longitude": " 12.5 "},
        }));
        assert_eq!(record.coordinates, Coordinates::new(0.0, 12.5));
    }

    #[test]
    fn non_object_coordinates_are_sentinel() {
        let record = normalize_record(&json!({"coordinates": [48.8, 2.3]}));
        assert!(record.coordinates.is_sentinel());
    }

    #[test]
    fn keeps_explicit_unknown_confidence_separate() {
        assert_eq!(
            normalize_record(&json!({"confidence": "Unknown"})).confidence,
            Confidence::Unknown
        );
        assert_eq!(
            normalize_record(&json!({"confidence": 0.9})).confidence,
            Confidence::Unknown
        );
    }

    #[test]
    fn non_object_entry_is_fully_defaulted() {
        assert_eq!(normalize_record(&json!("Paris")), LocationRecord::default());
        assert_eq!(normalize_record(&Value::Null), LocationRecord::default());
    }

    #[test]
    fn non_string_text_is_stringified() {
        let record = normalize_record(&json!({"city": 75001, "state": ""}));
        assert_eq!(record.city, "75001");
        assert_eq!(record.state, "");
    }

    #[test]
    fn preserves_order() {
        let records = normalize(&[json!({"city": "A"}), json!({"city": "B"})]);
        let cities: Vec<&str> = records.iter().map(|r| r.city.as_str()).collect();
        assert_eq!(cities, ["A", "B"]);
    }
}
