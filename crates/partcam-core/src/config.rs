//! Compiler configuration
//!
//! Every tuning constant of the pipeline lives in an explicit
//! `CompilerConfig` passed by reference into each stage; there is no
//! process-wide state. Defaults carry the documented constants, and
//! configs round-trip through JSON or TOML files selected by extension.

use crate::coordinate::CoordinateStrategy;
use crate::error::ConfigError;
use crate::requirement::ProcessingType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tool numbers assigned to each operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAssignments {
    /// Center/spot drill for counterbore pilot passes.
    pub center_drill: u32,
    /// Twist drill for through-holes.
    pub drill: u32,
    /// Counterbore tool.
    pub counterbore: u32,
    /// Tap.
    pub tap: u32,
}

impl Default for ToolAssignments {
    fn default() -> Self {
        Self {
            center_drill: 1,
            drill: 2,
            counterbore: 3,
            tap: 4,
        }
    }
}

/// Default spindle speed and feed rate for one operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleDefaults {
    /// Spindle speed in RPM.
    pub spindle_speed: f64,
    /// Feed rate in mm/min.
    pub feed_rate: f64,
}

/// Configuration for the toolpath compiler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program number for the `O` header.
    pub program_number: u32,
    /// Max center distance for two circles to count as concentric (units).
    pub duplicate_distance_threshold: f64,
    /// Minimum outer/inner radius ratio for a counterbore pair.
    pub radius_ratio_min: f64,
    /// Maximum outer/inner radius ratio for a counterbore pair.
    pub radius_ratio_max: f64,
    /// Additive clearance in the actual-depth formula (mm).
    pub depth_factor: f64,
    /// Safe travel height for rapids (mm).
    pub safe_height: f64,
    /// Canned-cycle retract plane R (mm).
    pub retract_plane: f64,
    /// Peck increment Q for G83 (mm).
    pub peck_increment: f64,
    /// Center-drill depth for the counterbore pilot pass (mm).
    pub pilot_depth: f64,
    /// Dwell at counterbore depth for G82 (ms).
    pub dwell_ms: u32,
    /// Substituted when the requirement states no diameter (mm).
    pub default_diameter: f64,
    /// Substituted when the requirement states no depth (mm).
    pub default_depth: f64,
    /// Substituted when the requirement states no counterbore depth (mm).
    pub default_counterbore_depth: f64,
    /// Origin selection strategy.
    pub coordinate_strategy: CoordinateStrategy,
    /// Tool numbers per operation.
    pub tools: ToolAssignments,
    /// Defaults for single-pass drilling.
    pub drilling: CycleDefaults,
    /// Defaults for peck drilling.
    pub peck_drilling: CycleDefaults,
    /// Defaults for counterboring.
    pub counterbore: CycleDefaults,
    /// Defaults for tapping (feed is computed from pitch).
    pub tapping: CycleDefaults,
    /// Metric coarse thread pitch per nominal size (mm).
    pub thread_pitches: BTreeMap<String, f64>,
    /// Speed/feed scaling per material name; 1.0 when absent.
    pub material_factors: BTreeMap<String, f64>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let mut thread_pitches = BTreeMap::new();
        thread_pitches.insert("M3".to_string(), 0.5);
        thread_pitches.insert("M4".to_string(), 0.7);
        thread_pitches.insert("M5".to_string(), 0.8);
        thread_pitches.insert("M6".to_string(), 1.0);
        thread_pitches.insert("M8".to_string(), 1.25);
        thread_pitches.insert("M10".to_string(), 1.5);
        thread_pitches.insert("M12".to_string(), 1.75);

        let mut material_factors = BTreeMap::new();
        material_factors.insert("aluminum".to_string(), 1.2);
        material_factors.insert("steel".to_string(), 1.0);
        material_factors.insert("stainless".to_string(), 0.7);

        Self {
            program_number: 1000,
            duplicate_distance_threshold: 3.0,
            radius_ratio_min: 1.2,
            radius_ratio_max: 3.0,
            depth_factor: 1.5,
            safe_height: 100.0,
            retract_plane: 2.0,
            peck_increment: 3.0,
            pilot_depth: 3.0,
            dwell_ms: 2000,
            default_diameter: 5.5,
            default_depth: 14.0,
            default_counterbore_depth: 5.0,
            coordinate_strategy: CoordinateStrategy::HighestY,
            tools: ToolAssignments::default(),
            drilling: CycleDefaults {
                spindle_speed: 1000.0,
                feed_rate: 100.0,
            },
            peck_drilling: CycleDefaults {
                spindle_speed: 800.0,
                feed_rate: 80.0,
            },
            counterbore: CycleDefaults {
                spindle_speed: 600.0,
                feed_rate: 60.0,
            },
            tapping: CycleDefaults {
                spindle_speed: 500.0,
                feed_rate: 0.0,
            },
            thread_pitches,
            material_factors,
        }
    }
}

impl CompilerConfig {
    /// Speed/feed defaults for the given operation
    pub fn cycle_defaults(&self, processing_type: ProcessingType) -> CycleDefaults {
        match processing_type {
            ProcessingType::Drilling => self.drilling,
            ProcessingType::PeckDrilling => self.peck_drilling,
            ProcessingType::Counterbore => self.counterbore,
            ProcessingType::Tapping => self.tapping,
        }
    }

    /// Scaling factor for the given material name, 1.0 when unknown
    pub fn material_factor(&self, material: &str) -> f64 {
        let needle = material.to_lowercase();
        self.material_factors
            .iter()
            .find(|(name, _)| needle.contains(name.as_str()))
            .map(|(_, factor)| *factor)
            .unwrap_or(1.0)
    }

    /// Thread pitch for the nominal size nearest the given diameter
    ///
    /// Falls back to 1.0 mm when the pitch table is empty.
    pub fn thread_pitch(&self, diameter: f64) -> f64 {
        self.thread_pitches
            .iter()
            .filter_map(|(name, pitch)| {
                let nominal: f64 = name.trim_start_matches('M').parse().ok()?;
                Some(((nominal - diameter).abs(), *pitch))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, pitch)| pitch)
            .unwrap_or(1.0)
    }

    /// Check that every setting is in its valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(name: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
            if value < min || value > max || !value.is_finite() {
                return Err(ConfigError::OutOfRange {
                    name: name.to_string(),
                    value,
                    min,
                    max,
                });
            }
            Ok(())
        }

        check(
            "duplicate_distance_threshold",
            self.duplicate_distance_threshold,
            0.1,
            100.0,
        )?;
        check("radius_ratio_min", self.radius_ratio_min, 1.0, 10.0)?;
        check("radius_ratio_max", self.radius_ratio_max, 1.0, 10.0)?;
        check("depth_factor", self.depth_factor, 0.0, 10.0)?;
        check("safe_height", self.safe_height, 50.0, 1000.0)?;
        check("retract_plane", self.retract_plane, 0.5, 50.0)?;
        check("peck_increment", self.peck_increment, 0.1, 50.0)?;
        check("pilot_depth", self.pilot_depth, 0.1, 50.0)?;
        check("default_diameter", self.default_diameter, 0.1, 100.0)?;
        check("default_depth", self.default_depth, 0.1, 500.0)?;

        if self.radius_ratio_min >= self.radius_ratio_max {
            return Err(ConfigError::Incompatible(
                "radius_ratio_min must be below radius_ratio_max".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a config from a JSON or TOML file, selected by extension
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("none").to_string(),
                ))
            }
        };
        config.validate()?;
        debug!(path = %path.display(), "loaded compiler configuration");
        Ok(config)
    }

    /// Save the config to a JSON or TOML file, selected by extension
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("none").to_string(),
                ))
            }
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "saved compiler configuration");
        Ok(())
    }

    /// Platform default config file location
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("partcam")
            .join("partcam.toml")
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}
