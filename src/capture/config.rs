//! Camera capture configuration.
//!
//! The constraint requested from the device is fixed: a nominal 640×480
//! stream from the user-facing camera. The encoder quality is fixed as
//! well so every still image sent to the service has the same profile.

use serde::{Deserialize, Serialize};

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Camera pointing at the user (webcam, selfie camera).
    #[default]
    User,
    /// Camera pointing away from the user.
    Environment,
}

/// Configuration for camera capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Camera device index used when the platform cannot resolve `facing`.
    pub device_id: u32,
    /// Nominal frame width in pixels.
    pub width: u32,
    /// Nominal frame height in pixels.
    pub height: u32,
    /// Target frames per second for the preview stream.
    pub fps: u32,
    /// Preferred camera orientation.
    pub facing: Facing,
    /// JPEG quality factor (1-100).
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 640,
            height: 480,
            fps: 30,
            facing: Facing::User,
            jpeg_quality: 95,
        }
    }
}

impl CaptureConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Frame rate is outside 1-120.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// JPEG quality is outside 1-100.
    #[error("invalid jpeg quality {0} (must be 1-100)")]
    InvalidQuality(u8),
    /// The service URL is not http(s).
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.facing, Facing::User);
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_quality_out_of_range() {
        let mut config = CaptureConfig::default();
        config.jpeg_quality = 101;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidQuality(101))
        ));
    }
}
