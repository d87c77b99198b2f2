use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::ToolMode;

/// Environment variable naming a JSON config file for the binary
pub const CONFIG_ENV_VAR: &str = "SKETCH_STUDIO_CONFIG";

/// Settings that differ between deployments of the studio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct StudioConfig {
    /// Maximum number of history entries kept in memory
    pub history_capacity: usize,
    /// Pixel size of the sketch surface
    pub sketch_size: [u32; 2],
    /// Pixel size of the enhanced art surface
    pub art_size: [u32; 2],
    /// Tool mode used for the art surface when a session starts
    pub initial_tool: ToolMode,
    pub brush_width: f32,
    /// Inclusive range the brush width is clamped to
    pub brush_width_range: [f32; 2],
    /// Palette offered to the child, as `#rrggbb` strings
    pub palette: Vec<String>,
    /// Colour of a freshly cleared surface, as `#rrggbb`
    pub background: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            history_capacity: 5,
            sketch_size: [600, 600],
            art_size: [600, 800],
            initial_tool: ToolMode::Fill,
            brush_width: 5.0,
            brush_width_range: [2.0, 20.0],
            palette: [
                "#000000", "#ff0000", "#ff8c00", "#ffd700", "#32cd32", "#1e90ff", "#8a2be2",
                "#ff69b4", "#8b4513", "#808080", "#ffffff",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
            background: "#ffffff".to_owned(),
        }
    }
}

impl StudioConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or the defaults when the
    /// variable is unset. A broken file is logged and replaced by defaults.
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(err) => {
                log::error!("Ignoring config {}: {}", path, err);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        for (name, [w, h]) in [("sketch_size", self.sketch_size), ("art_size", self.art_size)] {
            if w == 0 || h == 0 {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        let [min, max] = self.brush_width_range;
        if !(min > 0.0 && min <= max) {
            return Err(ConfigError::Invalid(format!(
                "brush_width_range [{min}, {max}] is not a valid range"
            )));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".into()));
        }
        for color in self.palette.iter().chain(std::iter::once(&self.background)) {
            parse_hex_color(color)?;
        }
        Ok(())
    }

    pub fn palette_colors(&self) -> Vec<Color32> {
        self.palette
            .iter()
            .filter_map(|hex| parse_hex_color(hex).ok())
            .collect()
    }

    pub fn background_color(&self) -> Color32 {
        parse_hex_color(&self.background).unwrap_or(Color32::WHITE)
    }

    pub fn clamp_brush_width(&self, width: f32) -> f32 {
        let [min, max] = self.brush_width_range;
        width.clamp(min, max)
    }
}

/// Parses `#rrggbb` (the leading `#` is optional)
pub fn parse_hex_color(hex: &str) -> Result<Color32, ConfigError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || ConfigError::Invalid(format!("{hex:?} is not a #rrggbb colour"));
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StudioConfig::default();
        config.validate().unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.initial_tool, ToolMode::Fill);
        assert_eq!(config.palette_colors().len(), config.palette.len());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StudioConfig::from_json(r#"{ "history_capacity": 10, "initial_tool": "Pen" }"#).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.initial_tool, ToolMode::Pen);
        assert_eq!(config.art_size, [600, 800]);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = StudioConfig::from_json(r#"{ "history_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_palette_entry() {
        let err = StudioConfig::from_json(r##"{ "palette": ["#12345"] }"##).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = StudioConfig::from_json("{ history_capacity: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), Color32::from_rgb(255, 128, 0));
        assert_eq!(parse_hex_color("00ff00").unwrap(), Color32::from_rgb(0, 255, 0));
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn test_clamp_brush_width() {
        let config = StudioConfig::default();
        assert_eq!(config.clamp_brush_width(1.0), 2.0);
        assert_eq!(config.clamp_brush_width(50.0), 20.0);
        assert_eq!(config.clamp_brush_width(7.0), 7.0);
    }
}
