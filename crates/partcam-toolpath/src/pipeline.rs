//! End-to-end compilation pipeline
//!
//! Chains the stages in dependency order: input validation, coordinate
//! resolution, composition, grouping, per-batch compilation, program
//! assembly, safety validation. Each stage is a pure function over
//! immutable values; the pipeline always produces a program for
//! structurally valid input and lets the caller decide what to do with
//! the validation report.

use crate::compositor::{compose, CompositionWarning};
use crate::coordinate::{resolve, transform};
use crate::grouper::group;
use crate::machining::MissingParameterWarning;
use crate::program::{GCodeProgram, ProgramBuilder};
use crate::toolpath::ToolpathCompiler;
use crate::validator::{SafetyValidator, ValidationReport};
use anyhow::{Context, Result};
use partcam_core::{CompilerConfig, CoordinateReference, Feature, ProcessingRequirement};

/// Everything one compilation run produces
#[derive(Debug)]
pub struct CompilationOutput {
    /// The assembled program.
    pub program: GCodeProgram,
    /// The machining origin that was chosen.
    pub reference: CoordinateReference,
    /// Post-composition feature list, origin-relative; merged circles are
    /// retained with their `consumed` marker for auditing.
    pub features: Vec<Feature>,
    /// Ambiguity warnings from composition.
    pub composition_warnings: Vec<CompositionWarning>,
    /// Defaults substituted during parameter resolution.
    pub parameter_warnings: Vec<MissingParameterWarning>,
    /// Safety findings; `errors` should block machine execution.
    pub report: ValidationReport,
}

/// Compile a drawing's detected features into a validated program
pub fn compile_drawing(
    features: &[Feature],
    requirement: &ProcessingRequirement,
    config: &CompilerConfig,
) -> Result<CompilationOutput> {
    config
        .validate()
        .context("compiler configuration rejected")?;

    let reference = resolve(features, config.coordinate_strategy)
        .context("resolving machining origin")?;
    tracing::debug!(origin = ?reference.point(), strategy = %reference.strategy, "origin resolved");

    let adjusted = transform(features, &reference);
    let composition = compose(&adjusted, requirement, config);
    let batches = group(&composition.features);
    tracing::debug!(
        features = composition.features.len(),
        batches = batches.len(),
        "feature batches ready"
    );

    let compiler = ToolpathCompiler::new(config);
    let mut builder = ProgramBuilder::new(config);
    let mut parameter_warnings = Vec::new();
    for batch in &batches {
        let compiled = compiler.compile(batch, requirement);
        parameter_warnings.extend(compiled.warnings);
        for block in compiled.blocks {
            builder.push_block(block);
        }
    }
    let program = builder.finish();

    let report = SafetyValidator::new().validate(&program);
    tracing::info!(
        program = %format!("O{:04}", program.number),
        lines = program.line_count(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "compilation complete"
    );

    Ok(CompilationOutput {
        program,
        reference,
        features: composition.features,
        composition_warnings: composition.warnings,
        parameter_warnings,
        report,
    })
}
