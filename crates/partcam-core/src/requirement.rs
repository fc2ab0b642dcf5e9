//! Processing requirement contract
//!
//! The record produced by external description analysis (NLP/regex over
//! the drawing's text notes). The compiler consumes it read-only; missing
//! numeric fields are substituted with documented defaults at
//! parameter-resolution time, never silently dropped.

use serde::{Deserialize, Serialize};

/// Requested machining operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    /// Single-pass drilling (G81)
    Drilling,
    /// Peck drilling with chip clearing (G83)
    PeckDrilling,
    /// Counterbore with dwell at depth (G82)
    Counterbore,
    /// Rigid tapping (G84)
    Tapping,
}

impl std::fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drilling => write!(f, "drilling"),
            Self::PeckDrilling => write!(f, "peck_drilling"),
            Self::Counterbore => write!(f, "counterbore"),
            Self::Tapping => write!(f, "tapping"),
        }
    }
}

/// Machining requirements extracted from the drawing description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRequirement {
    /// Requested operation.
    pub processing_type: ProcessingType,
    /// Nominal hole diameter in mm, when stated.
    pub diameter: Option<f64>,
    /// Drawing depth in mm, when stated.
    pub depth: Option<f64>,
    /// Depth of the counterbore recess in mm, when stated.
    pub counterbore_depth: Option<f64>,
    /// Requested feed rate in mm/min, when stated.
    pub feed_rate: Option<f64>,
    /// Workpiece material name.
    pub material: String,
    /// Free-form notes carried through for the caller.
    pub special_requirements: Vec<String>,
}

impl ProcessingRequirement {
    /// Requirement for the given operation with no stated numerics
    pub fn new(processing_type: ProcessingType) -> Self {
        Self {
            processing_type,
            diameter: None,
            depth: None,
            counterbore_depth: None,
            feed_rate: None,
            material: "steel".to_string(),
            special_requirements: Vec::new(),
        }
    }

    /// Set the nominal diameter
    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = Some(diameter);
        self
    }

    /// Set the drawing depth
    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the counterbore recess depth
    pub fn with_counterbore_depth(mut self, depth: f64) -> Self {
        self.counterbore_depth = Some(depth);
        self
    }

    /// Set the requested feed rate
    pub fn with_feed_rate(mut self, feed_rate: f64) -> Self {
        self.feed_rate = Some(feed_rate);
        self
    }

    /// Set the workpiece material
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }
}

impl Default for ProcessingRequirement {
    fn default() -> Self {
        Self::new(ProcessingType::Drilling)
    }
}
