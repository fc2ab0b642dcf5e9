//! Toolpath compiler
//!
//! Emits FANUC canned-cycle G-code for one feature batch. The tool
//! change, spindle start, and cycle header are emitted once per batch;
//! every subsequent feature contributes a single X/Y line, because FANUC
//! controllers keep the last canned cycle modal and re-execute it at each
//! new position. This bounds tool changes to one per distinct parameter
//! signature instead of one per feature.

use crate::grouper::FeatureBatch;
use crate::machining::{MachiningParameters, MissingParameterWarning};
use partcam_core::{
    CompilerConfig, Feature, FeatureId, FeatureKind, ProcessingRequirement, ProcessingType, Shape,
};
use serde::{Deserialize, Serialize};

/// Role of a block within the program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    /// Preamble, termination, and other non-cutting housekeeping.
    ProgramControl,
    /// One canned cycle over one feature batch.
    FeatureOperation,
}

/// An ordered run of G-code lines with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GCodeBlock {
    /// Position in the program; assigned at assembly time.
    pub id: u32,
    /// Role of the block.
    pub kind: BlockKind,
    /// Instruction lines, without line numbers.
    pub lines: Vec<String>,
    /// Features machined by this block.
    pub feature_ids: Vec<FeatureId>,
}

impl GCodeBlock {
    /// Block pending an id from program assembly
    pub fn new(kind: BlockKind, lines: Vec<String>, feature_ids: Vec<FeatureId>) -> Self {
        Self {
            id: 0,
            kind,
            lines,
            feature_ids,
        }
    }
}

/// Compiled blocks for one batch plus any default substitutions
#[derive(Debug, Clone)]
pub struct CompiledBatch {
    /// One block per cycle pass (three for counterbores).
    pub blocks: Vec<GCodeBlock>,
    /// Defaults substituted while resolving parameters.
    pub warnings: Vec<MissingParameterWarning>,
}

/// FANUC coordinate word: up to three decimals, trailing point kept
pub(crate) fn coord(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let mut s = format!("{value:.3}");
    while s.ends_with('0') {
        s.pop();
    }
    s
}

/// Compiles feature batches into canned-cycle blocks
pub struct ToolpathCompiler<'a> {
    config: &'a CompilerConfig,
}

impl<'a> ToolpathCompiler<'a> {
    /// Compiler over the given configuration
    pub fn new(config: &'a CompilerConfig) -> Self {
        Self { config }
    }

    /// Compile one batch
    ///
    /// A counterbore batch expands to three chained sub-cycles (center
    /// drill, peck drill, counterbore); everything else compiles to a
    /// single cycle selected by the requested processing type.
    pub fn compile(
        &self,
        batch: &FeatureBatch,
        requirement: &ProcessingRequirement,
    ) -> CompiledBatch {
        if batch.signature.kind() == FeatureKind::Counterbore {
            self.compile_counterbore(batch, requirement)
        } else {
            self.compile_single(batch, requirement)
        }
    }

    fn compile_single(
        &self,
        batch: &FeatureBatch,
        requirement: &ProcessingRequirement,
    ) -> CompiledBatch {
        let diameter = batch.features[0].circle_radius().map(|r| r * 2.0);
        let (params, warnings) = MachiningParameters::resolve(
            requirement.processing_type,
            diameter,
            requirement,
            self.config,
        );
        let header = self.cycle_header(requirement.processing_type, &params);
        let block = self.cycle_block(&params, header, &batch.features);
        CompiledBatch {
            blocks: vec![block],
            warnings,
        }
    }

    fn compile_counterbore(
        &self,
        batch: &FeatureBatch,
        requirement: &ProcessingRequirement,
    ) -> CompiledBatch {
        let (outer_diameter, inner_diameter, depth) = match batch.features[0].shape {
            Shape::Counterbore {
                outer_diameter,
                inner_diameter,
                depth,
            } => (outer_diameter, inner_diameter, depth),
            // Grouper guarantees a homogeneous batch.
            _ => unreachable!("counterbore batch without counterbore features"),
        };
        let mut local = requirement.clone();
        local.depth = Some(depth);

        // Pass 1: center drill at shallow pilot depth.
        let (mut pilot, mut warnings) = MachiningParameters::resolve(
            ProcessingType::Drilling,
            Some(inner_diameter),
            &local,
            self.config,
        );
        pilot.tool_number = self.config.tools.center_drill;
        let pilot_header = format!(
            "G81 Z{} R{} F{}",
            coord(-self.config.pilot_depth),
            coord(self.config.retract_plane),
            coord(pilot.feed_rate),
        );
        let pilot_block = self.cycle_block(&pilot, pilot_header, &batch.features);

        // Pass 2: peck drill the through-hole to full depth.
        let (drill, drill_warnings) = MachiningParameters::resolve(
            ProcessingType::PeckDrilling,
            Some(inner_diameter),
            &local,
            self.config,
        );
        warnings.extend(drill_warnings);
        let drill_header = format!(
            "G83 Z{} R{} Q{} F{}",
            coord(-drill.actual_depth),
            coord(self.config.retract_plane),
            coord(self.config.peck_increment),
            coord(drill.feed_rate),
        );
        let drill_block = self.cycle_block(&drill, drill_header, &batch.features);

        // Pass 3: counterbore the recess with a dwell at depth.
        let (bore, bore_warnings) = MachiningParameters::resolve(
            ProcessingType::Counterbore,
            Some(outer_diameter),
            &local,
            self.config,
        );
        warnings.extend(bore_warnings);
        let bore_depth = requirement
            .counterbore_depth
            .unwrap_or(self.config.default_counterbore_depth);
        let bore_header = format!(
            "G82 Z{} R{} P{} F{}",
            coord(-bore_depth),
            coord(self.config.retract_plane),
            self.config.dwell_ms,
            coord(bore.feed_rate),
        );
        let bore_block = self.cycle_block(&bore, bore_header, &batch.features);

        CompiledBatch {
            blocks: vec![pilot_block, drill_block, bore_block],
            warnings,
        }
    }

    fn cycle_header(&self, processing_type: ProcessingType, params: &MachiningParameters) -> String {
        let z = coord(-params.actual_depth);
        let r = coord(self.config.retract_plane);
        let f = coord(params.feed_rate);
        match processing_type {
            ProcessingType::Drilling => format!("G81 Z{z} R{r} F{f}"),
            ProcessingType::PeckDrilling => {
                format!("G83 Z{z} R{r} Q{} F{f}", coord(self.config.peck_increment))
            }
            ProcessingType::Counterbore => {
                format!("G82 Z{z} R{r} P{} F{f}", self.config.dwell_ms)
            }
            ProcessingType::Tapping => format!("G84 Z{z} R{r} F{f}"),
        }
    }

    /// Tool change, spindle start, compensation, header at the first
    /// position, X/Y-only repeats, cancel, retract.
    fn cycle_block(
        &self,
        params: &MachiningParameters,
        cycle_header: String,
        features: &[Feature],
    ) -> GCodeBlock {
        let safe = coord(self.config.safe_height);
        let mut lines = Vec::with_capacity(features.len() + 7);
        lines.push(format!("T{:02} M06", params.tool_number));
        lines.push(format!("S{:.0} M03", params.spindle_speed));
        lines.push(format!("G43 H{:02} Z{safe}", params.tool_number));
        let first = features[0].center;
        lines.push(format!("G0 X{} Y{}", coord(first.0), coord(first.1)));
        lines.push(cycle_header);
        for feature in &features[1..] {
            lines.push(format!(
                "X{} Y{}",
                coord(feature.center.0),
                coord(feature.center.1)
            ));
        }
        lines.push("G80".to_string());
        lines.push(format!("G0 Z{safe}"));

        GCodeBlock::new(
            BlockKind::FeatureOperation,
            lines,
            features.iter().map(|f| f.id).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouper::group;

    fn batch_of_circles(radius: f64, centers: &[(f64, f64)]) -> FeatureBatch {
        let features: Vec<Feature> = centers
            .iter()
            .enumerate()
            .map(|(i, &c)| Feature::circle(i as u32 + 1, c, radius, 1.0))
            .collect();
        group(&features).remove(0)
    }

    #[test]
    fn test_coord_format() {
        assert_eq!(coord(100.0), "100.");
        assert_eq!(coord(-19.8), "-19.8");
        assert_eq!(coord(2.0), "2.");
        assert_eq!(coord(0.0), "0.");
        assert_eq!(coord(10.125), "10.125");
    }

    #[test]
    fn test_drilling_batch_line_shape() {
        let config = CompilerConfig::default();
        let requirement = ProcessingRequirement::new(ProcessingType::Drilling).with_depth(10.0);
        let batch = batch_of_circles(11.0, &[(0.0, 0.0), (10.0, 5.0), (20.0, 5.0)]);
        let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);

        assert_eq!(compiled.blocks.len(), 1);
        let lines = &compiled.blocks[0].lines;
        // 4 setup + 1 header + 2 repeats + cancel + retract
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "T02 M06");
        assert_eq!(lines[1], "S1000 M03");
        assert_eq!(lines[2], "G43 H02 Z100.");
        assert_eq!(lines[3], "G0 X0. Y0.");
        assert_eq!(lines[4], "G81 Z-19.8 R2. F100.");
        assert_eq!(lines[5], "X10. Y5.");
        assert_eq!(lines[6], "X20. Y5.");
        assert_eq!(lines[7], "G80");
        assert_eq!(lines[8], "G0 Z100.");
        assert!(compiled.warnings.is_empty());
    }

    #[test]
    fn test_header_once_repeats_n_minus_one() {
        let config = CompilerConfig::default();
        let requirement = ProcessingRequirement::new(ProcessingType::Drilling).with_depth(10.0);
        for n in 1..=5 {
            let centers: Vec<(f64, f64)> = (0..n).map(|i| (i as f64 * 10.0, 0.0)).collect();
            let batch = batch_of_circles(4.0, &centers);
            let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);
            let lines = &compiled.blocks[0].lines;
            let headers = lines.iter().filter(|l| l.starts_with("G81")).count();
            let repeats = lines.iter().filter(|l| l.starts_with('X')).count();
            let cancels = lines.iter().filter(|l| *l == "G80").count();
            assert_eq!(headers, 1);
            assert_eq!(repeats, n - 1);
            assert_eq!(cancels, 1);
        }
    }

    #[test]
    fn test_peck_drilling_header() {
        let config = CompilerConfig::default();
        let requirement =
            ProcessingRequirement::new(ProcessingType::PeckDrilling).with_depth(20.0);
        let batch = batch_of_circles(5.0, &[(0.0, 0.0)]);
        let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);
        // 20 + 10/3 + 1.5 = 24.833... -> 24.8
        assert_eq!(compiled.blocks[0].lines[4], "G83 Z-24.8 R2. Q3. F80.");
    }

    #[test]
    fn test_tapping_header_uses_pitch_feed() {
        let config = CompilerConfig::default();
        let requirement = ProcessingRequirement::new(ProcessingType::Tapping).with_depth(12.0);
        let batch = batch_of_circles(3.0, &[(5.0, 5.0)]);
        let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);
        let lines = &compiled.blocks[0].lines;
        assert_eq!(lines[0], "T04 M06");
        // M6 pitch 1.0 at 500 rpm -> F500
        assert!(lines[4].starts_with("G84 "));
        assert!(lines[4].ends_with("F500."));
    }

    #[test]
    fn test_counterbore_three_pass_chain() {
        let config = CompilerConfig::default();
        let requirement = ProcessingRequirement::new(ProcessingType::Counterbore)
            .with_depth(10.0)
            .with_counterbore_depth(4.0);
        let feature = Feature::shape(
            9,
            Shape::Counterbore {
                outer_diameter: 22.0,
                inner_diameter: 14.5,
                depth: 10.0,
            },
            (0.0, 0.0),
            (22.0, 22.0),
        );
        let batch = group(&[feature]).remove(0);
        let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);

        assert_eq!(compiled.blocks.len(), 3);
        assert_eq!(compiled.blocks[0].lines[0], "T01 M06");
        assert_eq!(compiled.blocks[1].lines[0], "T02 M06");
        assert_eq!(compiled.blocks[2].lines[0], "T03 M06");
        assert_eq!(compiled.blocks[0].lines[4], "G81 Z-3. R2. F100.");
        // 10 + 14.5/3 + 1.5 = 16.333... -> 16.3
        assert_eq!(compiled.blocks[1].lines[4], "G83 Z-16.3 R2. Q3. F80.");
        assert_eq!(compiled.blocks[2].lines[4], "G82 Z-4. R2. P2000 F60.");
        for block in &compiled.blocks {
            assert_eq!(block.feature_ids, vec![FeatureId(9)]);
        }
    }

    #[test]
    fn test_missing_parameters_degrade_with_warnings() {
        let config = CompilerConfig::default();
        let requirement = ProcessingRequirement::new(ProcessingType::Drilling);
        let feature = Feature::shape(1, Shape::Rectangle, (0.0, 0.0), (10.0, 8.0));
        let batch = group(&[feature]).remove(0);
        let compiled = ToolpathCompiler::new(&config).compile(&batch, &requirement);
        // still a complete cycle with Z and F words
        assert!(compiled.blocks[0].lines[4].contains("Z-17.3"));
        assert_eq!(compiled.warnings.len(), 2);
    }
}
