//! Error handling for PartCam
//!
//! Provides error types for the two hard-failure categories of the
//! compiler core:
//! - Input errors (structurally invalid feature data)
//! - Configuration errors (rejected settings, file I/O)
//!
//! Recoverable data-quality problems never surface here; they are carried
//! as warning values on stage outputs so the compiler can always produce
//! a best-effort program. All error types use `thiserror`.

use crate::feature::FeatureId;
use thiserror::Error;

/// Input error type
///
/// Raised only for structurally invalid detector output. Empty inputs,
/// non-finite coordinates, and impossible geometry abort a stage; anything
/// softer degrades confidence instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// The feature list is empty and the strategy requires a search
    #[error("No features to process")]
    NoFeatures,

    /// A feature carries a NaN or infinite coordinate
    #[error("Feature {feature} has a non-finite coordinate or dimension")]
    NonFiniteCoordinate {
        /// The offending feature.
        feature: FeatureId,
    },

    /// A dimension that must be positive is zero or negative
    #[error("Feature {feature}: invalid {name}: {value}")]
    InvalidDimension {
        /// The offending feature.
        feature: FeatureId,
        /// The dimension name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A counterbore violates `outer_diameter > inner_diameter > 0`
    #[error("Feature {feature}: counterbore diameters must satisfy outer > inner > 0")]
    InvalidCounterbore {
        /// The offending feature.
        feature: FeatureId,
    },
}

/// Configuration error type
///
/// Raised when a `CompilerConfig` fails validation or cannot be
/// loaded/saved.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting value is outside its valid range
    #[error("Setting '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Two settings are mutually inconsistent
    #[error("Incompatible settings: {0}")]
    Incompatible(String),

    /// The config file extension is not recognized
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// I/O error during config file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

/// Top-level error type for PartCam operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input data error
    #[error(transparent)]
    Input(#[from] InputError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for PartCam operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::NoFeatures;
        assert_eq!(err.to_string(), "No features to process");

        let err = InputError::InvalidDimension {
            feature: FeatureId(3),
            name: "radius",
            value: -2.0,
        };
        assert_eq!(err.to_string(), "Feature F3: invalid radius: -2");

        let err = InputError::InvalidCounterbore {
            feature: FeatureId(7),
        };
        assert_eq!(
            err.to_string(),
            "Feature F7: counterbore diameters must satisfy outer > inner > 0"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::OutOfRange {
            name: "depth_factor".to_string(),
            value: -1.5,
            min: 0.0,
            max: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "Setting 'depth_factor' out of range: -1.5 (valid: 0..10)"
        );

        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }

    #[test]
    fn test_error_conversion() {
        let input_err = InputError::NoFeatures;
        let err: Error = input_err.into();
        assert!(matches!(err, Error::Input(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let cfg_err: ConfigError = io_err.into();
        let err: Error = cfg_err.into();
        assert!(matches!(err, Error::Config(ConfigError::Io(_))));
    }
}
