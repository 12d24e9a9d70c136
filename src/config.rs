//! Roll configuration, read from YAML.
//!
//! Every field is optional; missing ones take their defaults.
//!
//! ```yaml
//! instrument: Kalimba
//! tuning: 17 C Major
//! tempo: 96
//! row_span: 3.0
//! symbol_mode: number
//! margin: { top: 35, right: 20, bottom: 40, left: 55 }
//! ```

use crate::error::RollError;
use crate::tab::SymbolMode;
use crate::tuning::{find_tuning, Tuning, KALIMBA};
use crate::viewport::{Margin, Viewport, OVERVIEW_GAP};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub instrument: String,
    pub tuning: String,
    /// Beats per minute used when reading tab text
    pub tempo: f64,
    /// Seconds per row; the detail view shows two rows
    pub row_span: f64,
    /// Overview strip width in pixels
    pub overview_width: f64,
    pub margin: Margin,
    /// Outer width in CSS pixels
    pub width: f64,
    /// Outer height in CSS pixels
    pub height: f64,
    pub device_pixel_ratio: f64,
    /// Initial playback speed
    pub speed: f64,
    pub symbol_mode: SymbolMode,
    /// Chord tolerance and line-break silence for tab output, in seconds
    pub spacing: f64,
    /// Frame period of the headless playback loop
    pub frame_interval_ms: u64,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            instrument: KALIMBA.to_string(),
            tuning: "17 C Major".to_string(),
            tempo: 120.0,
            row_span: 2.0,
            overview_width: 80.0,
            margin: Margin::default(),
            width: 800.0,
            height: 600.0,
            device_pixel_ratio: 1.0,
            speed: 1.0,
            symbol_mode: SymbolMode::Letter,
            spacing: 0.1,
            frame_interval_ms: 16,
        }
    }
}

impl RollConfig {
    /// Load from a YAML file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self, RollError> {
        if !path.exists() {
            log::info!("Config file {:?} doesn't exist, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        log::info!(
            "Loaded config from {:?} ({} / {}, {} BPM)",
            path,
            config.instrument,
            config.tuning,
            config.tempo
        );
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, RollError> {
        // An empty document deserialises as null
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: RollConfig =
            serde_yaml::from_str(text).map_err(|e| RollError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RollError> {
        let positive = [
            ("tempo", self.tempo),
            ("row_span", self.row_span),
            ("speed", self.speed),
            ("device_pixel_ratio", self.device_pixel_ratio),
            ("overview_width", self.overview_width),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(RollError::Config(format!("{} must be > 0, got {}", name, value)));
            }
        }
        if !(self.spacing >= 0.0 && self.spacing.is_finite()) {
            return Err(RollError::Config(format!(
                "spacing must be >= 0, got {}",
                self.spacing
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(RollError::Config("frame_interval_ms must be > 0".to_string()));
        }
        let viewport = self
            .viewport()
            .map_err(|e| RollError::Config(e.to_string()))?;
        if self.overview_width + OVERVIEW_GAP >= viewport.width {
            return Err(RollError::Config(format!(
                "overview_width {} leaves no room for the detail view in {} px",
                self.overview_width, viewport.width
            )));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Result<Viewport, RollError> {
        Viewport::from_outer(self.width, self.height, self.margin, self.device_pixel_ratio)
    }

    /// The configured tuning from the built-in catalogue
    pub fn find_tuning(&self) -> Result<Arc<Tuning>, RollError> {
        find_tuning(&self.instrument, &self.tuning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RollConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.find_tuning().unwrap().key_count(), 17);
        assert_eq!(config.viewport().unwrap().width, 760.0);
    }

    #[test]
    fn test_partial_yaml() {
        let config = RollConfig::from_yaml_str(
            "tempo: 96\nsymbol_mode: number\nmargin: { top: 35, right: 20, bottom: 40, left: 55 }\n",
        )
        .unwrap();
        assert_eq!(config.tempo, 96.0);
        assert_eq!(config.symbol_mode, SymbolMode::Number);
        assert_eq!(config.margin.left, 55.0);
        assert_eq!(config.row_span, 2.0);
        assert_eq!(config.tuning, "17 C Major");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(RollConfig::from_yaml_str("").unwrap(), RollConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        for yaml in [
            "speed: 0",
            "tempo: -5",
            "row_span: 0",
            "width: 30",
            "frame_interval_ms: 0",
            "spacing: -1",
        ] {
            assert!(
                matches!(RollConfig::from_yaml_str(yaml), Err(RollError::Config(_))),
                "{}",
                yaml
            );
        }
    }

    #[test]
    fn test_overview_must_leave_room_for_detail() {
        // 760 px plot: 740 + 20 gap fills it
        assert!(matches!(
            RollConfig::from_yaml_str("overview_width: 740"),
            Err(RollError::Config(_))
        ));
        assert!(matches!(
            RollConfig::from_yaml_str("width: 200\noverview_width: 150"),
            Err(RollError::Config(_))
        ));
        assert!(RollConfig::from_yaml_str("overview_width: 700").is_ok());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            RollConfig::from_yaml_str("tempo: [fast"),
            Err(RollError::Config(_))
        ));
        assert!(RollConfig::from_yaml_str("symbol_mode: braille").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = RollConfig::load(Path::new("/nonexistent/pianoroll.yaml")).unwrap();
        assert_eq!(config, RollConfig::default());
    }

    #[test]
    fn test_unknown_tuning() {
        let config = RollConfig::from_yaml_str("tuning: 99 X Major").unwrap();
        assert!(matches!(
            config.find_tuning(),
            Err(RollError::UnknownTuning { .. })
        ));
    }
}
