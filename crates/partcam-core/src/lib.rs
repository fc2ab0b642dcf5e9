//! # PartCam Core
//!
//! Core types and utilities for the PartCam toolpath compiler.
//! Provides the feature model produced by external detection, the
//! processing-requirement contract, compiler configuration, and the
//! error taxonomy shared by every pipeline stage.

pub mod config;
pub mod coordinate;
pub mod error;
pub mod feature;
pub mod requirement;

pub use config::{CompilerConfig, CycleDefaults, ToolAssignments};
pub use coordinate::{CoordinateReference, CoordinateStrategy};
pub use error::{ConfigError, Error, InputError, Result};
pub use feature::{BoundingBox, Feature, FeatureId, FeatureKind, Shape};
pub use requirement::{ProcessingRequirement, ProcessingType};
