//! # PartCam
//!
//! A deterministic toolpath compiler for CNC programmers: takes the
//! geometric features detected on a machine-part drawing (holes, pockets,
//! counterbore circle pairs), establishes a machining origin, merges
//! composite features, batches by machining parameters, and emits
//! validated FANUC canned-cycle G-code.
//!
//! ## Architecture
//!
//! PartCam is organized as a workspace with two crates:
//!
//! 1. **partcam-core** - Feature model, processing requirements,
//!    configuration, error taxonomy
//! 2. **partcam-toolpath** - Coordinate resolution, counterbore
//!    composition, feature grouping, G-code generation, safety validation
//!
//! This crate is the library facade: it re-exports the public surface of
//! both and wires up logging. There is no CLI or GUI here; the compiler
//! is consumed by external transport layers via plain data contracts.

pub use partcam_core::{
    BoundingBox, CompilerConfig, ConfigError, CoordinateReference, CoordinateStrategy,
    CycleDefaults, Error, Feature, FeatureId, FeatureKind, InputError, ProcessingRequirement,
    ProcessingType, Result, Shape, ToolAssignments,
};

pub use partcam_toolpath::{
    actual_depth, compile_drawing, compose, group, resolve, tapping_feed, transform, BlockKind,
    CompilationOutput, CompiledBatch, CompositionOutcome, CompositionWarning, FeatureBatch,
    GCodeBlock, GCodeProgram, Issue, MachiningParameters, MissingParameterWarning,
    ParameterSignature, ProgramBuilder, SafetyValidator, Severity, ToolpathCompiler,
    ValidationReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
