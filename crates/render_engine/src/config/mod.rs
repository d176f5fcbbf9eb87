//! Configuration system
//!
//! Typed settings for the iteration engine plus a small trait for loading and
//! saving them as TOML. Settings are validated before the render loop is
//! allowed to start so that invalid ranges surface as configuration errors
//! rather than as mid-render surprises.

use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from a TOML file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a TOML file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Output viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Initial output width in pixels
    pub width: u32,

    /// Initial output height in pixels
    pub height: u32,

    /// Largest width the frame slot must be able to hold
    pub max_width: u32,

    /// Largest height the frame slot must be able to hold
    pub max_height: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            max_width: 2048,
            max_height: 2048,
        }
    }
}

/// Progressive photon mapping estimator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpmSettings {
    /// Search radius used for iteration 0 and restored on sequence restart
    pub initial_radius: f64,

    /// Radius shrink exponent, must lie in the open interval (0, 1)
    pub alpha: f64,
}

impl Default for PpmSettings {
    fn default() -> Self {
        Self {
            initial_radius: 100.0,
            alpha: 2.0 / 3.0,
        }
    }
}

/// Display handoff settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Every `cadence`-th iteration (0-based) is copied out for display
    pub cadence: u64,
}

impl DisplaySettings {
    /// Whether the iteration at `index` should be copied out for display
    pub fn is_display_iteration(&self, index: u64) -> bool {
        index % self.cadence == 0
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        // Only one of every 5 frames hits the screen; the rest only advance
        // the estimator.
        Self { cadence: 5 }
    }
}

/// Top-level settings for the iteration engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Output viewport settings
    pub output: OutputSettings,

    /// PPM estimator settings
    pub ppm: PpmSettings,

    /// Display handoff settings
    pub display: DisplaySettings,
}

impl Config for RenderSettings {}

impl RenderSettings {
    /// Validate value ranges before the settings are handed to the render loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.width == 0 || self.output.height == 0 {
            return Err(ConfigError::Invalid("output dimensions must be non-zero".into()));
        }
        if self.output.width > self.output.max_width || self.output.height > self.output.max_height {
            return Err(ConfigError::Invalid(format!(
                "output {}x{} exceeds maximum {}x{}",
                self.output.width, self.output.height, self.output.max_width, self.output.max_height
            )));
        }
        if self.ppm.initial_radius <= 0.0 {
            return Err(ConfigError::Invalid("PPM initial radius must be positive".into()));
        }
        if self.ppm.alpha <= 0.0 || self.ppm.alpha >= 1.0 {
            return Err(ConfigError::Invalid("PPM alpha must lie in (0, 1)".into()));
        }
        if self.display.cadence == 0 {
            return Err(ConfigError::Invalid("display cadence must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(RenderSettings::default().validate().is_ok());
    }

    #[test]
    fn test_alpha_out_of_range_rejected() {
        let mut settings = RenderSettings::default();
        settings.ppm.alpha = 1.0;
        assert!(settings.validate().is_err());
        settings.ppm.alpha = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut settings = RenderSettings::default();
        settings.output.width = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_output_larger_than_max_rejected() {
        let mut settings = RenderSettings::default();
        settings.output.width = settings.output.max_width + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_cadence_rejected() {
        let mut settings = RenderSettings::default();
        settings.display.cadence = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cadence_five_flags_every_fifth() {
        let display = DisplaySettings { cadence: 5 };
        for index in 0..20 {
            assert_eq!(display.is_display_iteration(index), index % 5 == 0);
        }
    }

    #[test]
    fn test_cadence_one_flags_every_iteration() {
        let display = DisplaySettings { cadence: 1 };
        for index in 0..20 {
            assert!(display.is_display_iteration(index));
        }
    }

    #[test]
    fn test_settings_parse_from_toml() {
        let text = r#"
            [output]
            width = 800
            height = 600
            max_width = 1600
            max_height = 1200

            [ppm]
            initial_radius = 25.0
            alpha = 0.7

            [display]
            cadence = 1
        "#;
        let settings: RenderSettings = toml::from_str(text).expect("parse");
        assert_eq!(settings.output.width, 800);
        assert_eq!(settings.display.cadence, 1);
        assert!(settings.validate().is_ok());
    }
}
