use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::color;

/// Output path used when nothing else is configured. Overwritten on every run.
pub const DEFAULT_OUTPUT: &str = "images.svg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("group style {group}: invalid colour '{value}', expected #rrggbb")]
    InvalidColor { group: usize, value: String },

    #[error("{field} must be positive and finite, got {value}")]
    InvalidSize { field: &'static str, value: f64 },
}

// ---------------------------------------------------------------------------
// Styling
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
}

/// Per-group overrides. Unset fields fall back to the palette and `marker_size`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStyle {
    /// `#rrggbb`
    pub color: Option<String>,
    pub marker: MarkerShape,
    /// Marker radius in px.
    pub size: Option<f32>,
}

// ---------------------------------------------------------------------------
// PlotConfig
// ---------------------------------------------------------------------------

/// Everything that used to differ between copies of the plotting script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Fixed output path; an existing file is overwritten.
    pub output: PathBuf,
    /// Canvas width in px.
    pub width: u32,
    /// Canvas height in px.
    pub height: u32,
    /// Default marker radius in px.
    pub marker_size: f32,
    /// Marker radius of highlighted points in px.
    pub highlight_size: f32,
    /// Record indices of the first source to highlight, each labelled `index + 1`.
    pub highlights: Vec<usize>,
    /// Style overrides, matched to groups by position.
    pub group_styles: Vec<GroupStyle>,
    /// Camera elevation in degrees.
    pub elevation: f64,
    /// Camera azimuth in degrees.
    pub azimuth: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            width: 1200,
            height: 750,
            marker_size: 3.0,
            highlight_size: 6.0,
            highlights: Vec::new(),
            group_styles: Vec::new(),
            elevation: 30.0,
            azimuth: -60.0,
        }
    }
}

impl PlotConfig {
    /// Read a complete config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config(path)?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay the fields present in `path` onto `fallback`.
    ///
    /// A missing file yields `fallback` unchanged.
    pub fn load_or(path: &Path, fallback: PlotConfig) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(fallback);
        }
        let json_err = |source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        };

        let text = read_config(path)?;
        let overrides: serde_json::Map<String, JsonValue> =
            serde_json::from_str(&text).map_err(json_err)?;

        let mut merged = serde_json::to_value(&fallback).map_err(json_err)?;
        if let JsonValue::Object(base) = &mut merged {
            base.extend(overrides);
        }
        let config: PlotConfig = serde_json::from_value(merged).map_err(json_err)?;
        log::info!("Applied plot config overrides from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("width", self.width as f64),
            ("height", self.height as f64),
            ("marker_size", self.marker_size as f64),
            ("highlight_size", self.highlight_size as f64),
        ];
        for (field, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSize { field, value });
            }
        }

        for (group, style) in self.group_styles.iter().enumerate() {
            if let Some(value) = &style.color {
                if color::parse_hex(value).is_none() {
                    return Err(ConfigError::InvalidColor {
                        group,
                        value: value.clone(),
                    });
                }
            }
            if let Some(size) = style.size {
                if !(size.is_finite() && size > 0.0) {
                    return Err(ConfigError::InvalidSize {
                        field: "group_styles.size",
                        value: size as f64,
                    });
                }
            }
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_keeps_fallback() {
        let dir = TempDir::new().unwrap();
        let fallback = PlotConfig {
            highlights: vec![29, 49],
            ..Default::default()
        };
        let cfg = PlotConfig::load_or(&dir.path().join("absent.json"), fallback.clone()).unwrap();
        assert_eq!(cfg, fallback);
    }

    #[test]
    fn test_overrides_merge_over_fallback() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("posplot.json");
        std::fs::write(
            &path,
            r##"{"marker_size": 5.5, "group_styles": [{"color": "#112233", "marker": "square"}]}"##,
        )
        .unwrap();

        let fallback = PlotConfig {
            highlights: vec![3],
            ..Default::default()
        };
        let cfg = PlotConfig::load_or(&path, fallback).unwrap();
        assert_eq!(cfg.marker_size, 5.5);
        assert_eq!(cfg.highlights, vec![3]);
        assert_eq!(cfg.group_styles[0].marker, MarkerShape::Square);
        assert_eq!(cfg.group_styles[0].size, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_json_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"output": "out.svg"}"#).unwrap();

        let cfg = PlotConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.output, PathBuf::from("out.svg"));
        assert_eq!(cfg.width, PlotConfig::default().width);

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PlotConfig::from_json_file(&path).unwrap_err(),
            ConfigError::Json { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = PlotConfig {
            group_styles: vec![
                GroupStyle::default(),
                GroupStyle {
                    color: Some("red".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidColor { group: 1, .. }
        ));

        let cfg = PlotConfig {
            marker_size: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate().unwrap_err(),
            ConfigError::InvalidSize { field: "marker_size", .. }
        ));
    }
}
