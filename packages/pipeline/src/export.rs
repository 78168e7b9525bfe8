//! `GeoJSON` and CSV exports of pipeline output.

use std::io::Write;

use geo::{MultiPoint, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use thiserror::Error;

use crate::aggregate::{MapGeometry, Marker};
use crate::table::{ComparisonRow, HEADERS};

/// Errors from writing exports.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Converts map geometry into a `GeoJSON` feature collection.
///
/// Each marker becomes a `Point` feature carrying its rank, styling, and
/// popup text. Heatmap points, when present, are one `MultiPoint` feature
/// with `"layer": "heatmap"`. The map center is a foreign member.
#[must_use]
pub fn to_feature_collection(map: &MapGeometry) -> FeatureCollection {
    let mut features: Vec<Feature> = map.markers.iter().map(marker_feature).collect();

    if !map.heatmap_points.is_empty() {
        let points = MultiPoint::new(
            map.heatmap_points
                .iter()
                .map(|c| Point::new(c.longitude, c.latitude))
                .collect(),
        );
        let mut properties = JsonObject::new();
        properties.insert("layer".to_string(), JsonValue::from("heatmap"));
        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&points))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "center".to_string(),
        serde_json::json!([map.center.longitude, map.center.latitude]),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

fn marker_feature(marker: &Marker) -> Feature {
    let point = Point::new(marker.coordinates.longitude, marker.coordinates.latitude);

    let mut properties = JsonObject::new();
    properties.insert("layer".to_string(), JsonValue::from("markers"));
    properties.insert("rank".to_string(), JsonValue::from(marker.rank));
    properties.insert("tier".to_string(), JsonValue::from(marker.tier.as_ref()));
    properties.insert(
        "color".to_string(),
        JsonValue::from(marker.style.color.as_ref()),
    );
    properties.insert(
        "icon".to_string(),
        JsonValue::from(marker.style.icon.as_ref()),
    );
    properties.insert(
        "tooltip".to_string(),
        JsonValue::from(marker.tooltip.as_str()),
    );
    properties.insert(
        "title".to_string(),
        JsonValue::from(marker.popup.title.as_str()),
    );
    properties.insert(
        "confidence".to_string(),
        JsonValue::from(marker.popup.confidence.as_str()),
    );
    properties.insert(
        "reasoning".to_string(),
        JsonValue::from(marker.popup.reasoning.as_str()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Writes the comparison table as CSV with a header row.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_csv<W: Write>(rows: &[ComparisonRow], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADERS)?;
    for row in rows {
        csv_writer.write_record(row.cells())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the feature collection as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or writing fails.
pub fn write_geojson<W: Write>(map: &MapGeometry, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, &to_feature_collection(map))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::config::PipelineConfig;
    use crate::table::build;
    use geospy_location_models::{Coordinates, LocationRecord};

    fn sample() -> Vec<LocationRecord> {
        vec![
            LocationRecord {
                city: "Paris".to_string(),
                country: "France".to_string(),
                coordinates: Coordinates::new(48.8566, 2.3522),
                ..LocationRecord::default()
            },
            LocationRecord {
                city: "Lyon, Rhône".to_string(),
                coordinates: Coordinates::new(45.764, 4.8357),
                ..LocationRecord::default()
            },
        ]
    }

    #[test]
    fn markers_and_heatmap_become_features() {
        let map = aggregate(&sample(), &PipelineConfig::default()).unwrap();
        let collection = to_feature_collection(&map);
        assert_eq!(collection.features.len(), 3);

        let first = &collection.features[0];
        let props = first.properties.as_ref().unwrap();
        assert_eq!(props["rank"], 1);
        assert_eq!(props["color"], "gold");
        assert_eq!(props["icon"], "star");
        assert_eq!(props["tier"], "GOLD");

        let geometry = first.geometry.as_ref().unwrap();
        assert_eq!(
            geometry.value,
            geojson::Value::Point(vec![2.3522, 48.8566].into())
        );

        let heatmap = &collection.features[2];
        assert_eq!(heatmap.properties.as_ref().unwrap()["layer"], "heatmap");
        assert!(matches!(
            heatmap.geometry.as_ref().unwrap().value,
            geojson::Value::MultiPoint(ref pts) if pts.len() == 2
        ));
    }

    #[test]
    fn center_is_a_foreign_member() {
        let map = aggregate(&sample()[..1], &PipelineConfig::default()).unwrap();
        let collection = to_feature_collection(&map);
        assert_eq!(collection.features.len(), 1);
        let center = &collection.foreign_members.as_ref().unwrap()["center"];
        assert_eq!(center, &serde_json::json!([2.3522, 48.8566]));
    }

    #[test]
    fn csv_has_header_and_quoted_cells() {
        let mut out = Vec::new();
        write_csv(&build(&sample()), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Rank,City,State/Region,Country,Confidence,Latitude,Longitude"
        );
        assert_eq!(lines[1], "#1,Paris,Unknown,France,Medium,48.8566,2.3522");
        assert_eq!(
            lines[2],
            "#2,\"Lyon, Rhône\",Unknown,Unknown,Medium,45.7640,4.8357"
        );
    }
}
