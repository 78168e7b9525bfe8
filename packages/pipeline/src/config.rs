//! Display configuration for the pipeline.
//!
//! The defaults live in `config/pipeline.toml`, embedded at compile time.
//! A runtime override file only needs the keys it changes: it is merged
//! table by table over the embedded document before deserializing, so a
//! partial `[confidence_colors]` or `[heatmap]` keeps the remaining keys.
//! Arrays (`base_layers`, `gradient`) are replaced whole.

use std::collections::BTreeMap;
use std::path::Path;

use geospy_location_models::Confidence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an override config file.
pub const CONFIG_PATH_ENV: &str = "GEOSPY_PIPELINE_CONFIG";

const DEFAULT_CONFIG_TOML: &str = include_str!("../config/pipeline.toml");

/// Errors from loading a config override.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`PipelineConfig`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Pipeline display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many records the ranking presenter shows.
    pub ranking_limit: usize,
    /// Explanation characters kept in a marker popup.
    pub popup_explanation_chars: usize,
    /// Initial map view.
    pub map: MapViewConfig,
    /// Heatmap layer styling.
    pub heatmap: HeatmapStyle,
    /// Chart colour per confidence label.
    pub confidence_colors: BTreeMap<Confidence, String>,
}

/// Initial map view and base layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViewConfig {
    /// Zoom level the map opens at.
    pub zoom_start: u8,
    /// Selectable base tile layers, first is the default.
    pub base_layers: Vec<TileLayer>,
}

/// A base tile layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Layer name shown in the layer control.
    pub name: String,
    /// Tile URL template or a well-known provider name.
    pub tiles: String,
    /// Attribution text.
    pub attribution: String,
}

/// Heatmap layer styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapStyle {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur radius in pixels.
    pub blur: u32,
    /// Zoom at which points reach full intensity.
    pub max_zoom: u8,
    /// Colour stops, ascending.
    pub gradient: Vec<GradientStop>,
}

/// A heatmap gradient stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Intensity in `0.0..=1.0`.
    pub stop: f64,
    /// CSS colour.
    pub color: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Parses the embedded defaults as a raw TOML table.
fn embedded_table() -> toml::Table {
    toml::de::from_str(DEFAULT_CONFIG_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse embedded pipeline config: {e}"))
}

/// Overlays `overrides` onto `base`, recursing into nested tables.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        if let toml::Value::Table(nested) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, nested);
                continue;
            }
            base.insert(key, toml::Value::Table(nested));
        } else {
            base.insert(key, value);
        }
    }
}

impl PipelineConfig {
    /// Returns the compile-time embedded configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a build-time guarantee
    /// since the file ships with the crate).
    #[must_use]
    pub fn embedded() -> Self {
        toml::Value::Table(embedded_table())
            .try_into()
            .unwrap_or_else(|e| panic!("Failed to parse embedded pipeline config: {e}"))
    }

    /// Parses an override document over the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is not valid TOML or
    /// the merged result does not match the config shape.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let overrides: toml::Table = toml::de::from_str(s)?;
        let mut merged = embedded_table();
        merge_tables(&mut merged, overrides);
        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Loads an override file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the embedded
    /// defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the named file cannot be read or parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Ok(Self::embedded()),
        }
    }

    /// Chart colour for a confidence label.
    #[must_use]
    pub fn confidence_color(&self, confidence: Confidence) -> &str {
        self.confidence_colors
            .get(&confidence)
            .map_or("#6c757d", String::as_str)
    }
}
