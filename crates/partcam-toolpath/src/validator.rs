//! Safety validator
//!
//! Static checks over an assembled program: initialization and
//! termination codes, safe-height rapids, feed/speed sanity, and a
//! collision heuristic over Z moves. Checks are independent and never
//! short-circuit; the validator reads the program but never mutates it.
//! Callers decide whether `errors` block export to the machine.

use crate::program::GCodeProgram;
use crate::toolpath::BlockKind;
use regex::Regex;
use std::sync::OnceLock;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed before the program runs on a machine.
    Error,
    /// Suspicious but not necessarily unsafe.
    Warning,
}

/// One finding of the validator
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// Severity of the finding.
    pub severity: Severity,
    /// Stable category tag, e.g. `"program end"` or `"collision"`.
    pub tag: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Originating block, when attributable.
    pub block_id: Option<u32>,
    /// 1-based program line, when attributable.
    pub line: Option<usize>,
}

impl Issue {
    fn error(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            tag,
            message: message.into(),
            block_id: None,
            line: None,
        }
    }

    fn warning(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            tag,
            message: message.into(),
            block_id: None,
            line: None,
        }
    }

    fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    fn at_block(mut self, block_id: u32) -> Self {
        self.block_id = Some(block_id);
        self
    }
}

/// Outcome of one validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Findings that should block machine execution.
    pub errors: Vec<Issue>,
    /// Findings worth reviewing.
    pub warnings: Vec<Issue>,
    /// Set when the collision heuristic fired.
    pub has_collisions: bool,
}

impl ValidationReport {
    /// True when no error-severity issues were found
    pub fn is_safe(&self) -> bool {
        self.errors.is_empty()
    }
}

/// G-code word: address letter plus signed value
fn words(line: &str) -> impl Iterator<Item = (char, f64)> + '_ {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let re = WORD.get_or_init(|| {
        Regex::new(r"([A-Za-z])(-?\d+(?:\.\d*)?)").expect("word pattern is valid")
    });
    re.captures_iter(line).filter_map(|cap| {
        let letter = cap[1].chars().next()?.to_ascii_uppercase();
        let value: f64 = cap[2].parse().ok()?;
        Some((letter, value))
    })
}

fn word(line: &str, letter: char) -> Option<f64> {
    words(line).find(|&(l, _)| l == letter).map(|(_, v)| v)
}

fn has_code(line: &str, letter: char, value: f64) -> bool {
    words(line).any(|(l, v)| l == letter && v == value)
}

/// Static safety checks over an assembled program
#[derive(Debug, Clone)]
pub struct SafetyValidator {
    /// Reasonable feed range in mm/min.
    pub feed_range: (f64, f64),
    /// Maximum reasonable spindle speed in RPM.
    pub spindle_max: f64,
    /// A rapid above this Z counts as a safe-height move.
    pub safe_height_min: f64,
    /// Retract plane used by the collision heuristic.
    pub retract_plane: f64,
}

impl Default for SafetyValidator {
    fn default() -> Self {
        Self {
            feed_range: (1.0, 5000.0),
            spindle_max: 20000.0,
            safe_height_min: 50.0,
            retract_plane: 0.0,
        }
    }
}

impl SafetyValidator {
    /// Validator with the default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every check and collect the findings
    pub fn validate(&self, program: &GCodeProgram) -> ValidationReport {
        let mut report = ValidationReport::default();
        let lines: Vec<&str> = program.lines().collect();

        self.check_initialization(&lines, &mut report);
        self.check_safe_height(&lines, &mut report);
        self.check_termination(&lines, &mut report);
        self.check_modal_presence(&lines, &mut report);
        self.check_feeds_and_speeds(&lines, &mut report);
        self.check_collisions(program, &mut report);

        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validation pass complete"
        );
        report
    }

    fn check_initialization(&self, lines: &[&str], report: &mut ValidationReport) {
        let head = &lines[..lines.len().min(20)];
        let required = [21.0, 90.0, 40.0, 49.0, 80.0];
        let missing: Vec<String> = required
            .iter()
            .filter(|&&code| !head.iter().any(|l| has_code(l, 'G', code)))
            .map(|code| format!("G{code:.0}"))
            .collect();
        if !missing.is_empty() {
            report.errors.push(Issue::error(
                "initialization",
                format!(
                    "initialization block incomplete; missing {}",
                    missing.join(", ")
                ),
            ));
        }
    }

    fn check_safe_height(&self, lines: &[&str], report: &mut ValidationReport) {
        let found = lines.iter().any(|l| {
            (has_code(l, 'G', 0.0) || has_code(l, 'G', 43.0))
                && word(l, 'Z').is_some_and(|z| z > self.safe_height_min)
        });
        if !found {
            report.errors.push(Issue::error(
                "safe height",
                format!("no rapid above Z{} found", self.safe_height_min),
            ));
        }
    }

    fn check_termination(&self, lines: &[&str], report: &mut ValidationReport) {
        let tail = &lines[lines.len().saturating_sub(5)..];
        let ended = tail
            .iter()
            .any(|l| has_code(l, 'M', 30.0) || has_code(l, 'M', 2.0));
        if !ended {
            report.errors.push(Issue::error(
                "program end",
                "program does not terminate with M30 or M02",
            ));
        }
    }

    fn check_modal_presence(&self, lines: &[&str], report: &mut ValidationReport) {
        if !lines.iter().any(|l| has_code(l, 'G', 43.0)) {
            report.warnings.push(Issue::warning(
                "tool compensation",
                "no G43 tool length compensation found",
            ));
        }
        let spindle = lines.iter().any(|l| {
            has_code(l, 'M', 3.0) || has_code(l, 'M', 4.0) || has_code(l, 'M', 5.0)
        });
        if !spindle {
            report.warnings.push(Issue::warning(
                "spindle control",
                "no spindle control (M03/M04/M05) found",
            ));
        }
    }

    fn check_feeds_and_speeds(&self, lines: &[&str], report: &mut ValidationReport) {
        for (i, line) in lines.iter().enumerate() {
            if let Some(feed) = word(line, 'F') {
                if feed < self.feed_range.0 || feed > self.feed_range.1 {
                    report.warnings.push(
                        Issue::warning(
                            "feed rate",
                            format!("unreasonable feed rate F{feed} on line {}", i + 1),
                        )
                        .at_line(i + 1),
                    );
                }
            }
            if let Some(speed) = word(line, 'S') {
                if speed <= 0.0 || speed > self.spindle_max {
                    report.warnings.push(
                        Issue::warning(
                            "spindle speed",
                            format!("unreasonable spindle speed S{speed} on line {}", i + 1),
                        )
                        .at_line(i + 1),
                    );
                }
            }
        }
    }

    /// Collision heuristic (reconstruction, see design notes): within each
    /// feature block, a cut below the block's own cycle depth, or a rapid
    /// at negative Z without a retract since the last plunge, is an error.
    fn check_collisions(&self, program: &GCodeProgram, report: &mut ValidationReport) {
        for block in &program.blocks {
            if block.kind != BlockKind::FeatureOperation {
                continue;
            }
            let cycle_depth = block
                .lines
                .iter()
                .filter(|l| is_cycle_header(l.as_str()))
                .filter_map(|l| word(l, 'Z'))
                .min_by(|a, b| a.total_cmp(b));

            let mut retracted = true;
            for line in &block.lines {
                let z = word(line, 'Z');
                let rapid = has_code(line, 'G', 0.0);
                if let Some(z) = z {
                    if rapid && z < 0.0 && !retracted {
                        report.errors.push(
                            Issue::error(
                                "collision",
                                format!("rapid move to Z{z} without a preceding retract"),
                            )
                            .at_block(block.id),
                        );
                        report.has_collisions = true;
                    }
                    if let Some(depth) = cycle_depth {
                        if !rapid && !is_cycle_header(line) && z < depth - 1e-3 {
                            report.errors.push(
                                Issue::error(
                                    "collision",
                                    format!("cut to Z{z} below expected depth Z{depth}"),
                                )
                                .at_block(block.id),
                            );
                            report.has_collisions = true;
                        }
                    }
                    retracted = z >= self.retract_plane;
                }
            }
        }
    }
}

fn is_cycle_header(line: &str) -> bool {
    [81.0, 82.0, 83.0, 84.0]
        .iter()
        .any(|&code| has_code(line, 'G', code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;
    use crate::toolpath::GCodeBlock;
    use partcam_core::CompilerConfig;

    fn feature_block(lines: &[&str]) -> GCodeBlock {
        GCodeBlock::new(
            BlockKind::FeatureOperation,
            lines.iter().map(|l| l.to_string()).collect(),
            Vec::new(),
        )
    }

    fn standard_program() -> GCodeProgram {
        let config = CompilerConfig::default();
        let mut builder = ProgramBuilder::new(&config);
        builder.push_block(feature_block(&[
            "T02 M06",
            "S1000 M03",
            "G43 H02 Z100.",
            "G0 X0. Y0.",
            "G81 Z-17.3 R2. F150.",
            "X10. Y5.",
            "G80",
            "G0 Z100.",
        ]));
        builder.finish()
    }

    #[test]
    fn test_well_formed_program_is_safe() {
        let report = SafetyValidator::new().validate(&standard_program());
        assert!(report.is_safe(), "unexpected errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
        assert!(!report.has_collisions);
    }

    #[test]
    fn test_missing_termination_is_flagged() {
        let mut program = standard_program();
        // drop the termination block
        program.blocks.pop();
        let report = SafetyValidator::new().validate(&program);
        assert!(report.errors.iter().any(|i| i.tag == "program end"));
    }

    #[test]
    fn test_missing_initialization_is_flagged() {
        let mut program = standard_program();
        program.blocks[0].lines.remove(1);
        let report = SafetyValidator::new().validate(&program);
        assert!(report.errors.iter().any(|i| i.tag == "initialization"));
    }

    #[test]
    fn test_missing_safe_height_is_flagged() {
        let config = CompilerConfig::default();
        let mut program = ProgramBuilder::new(&config).finish();
        for block in &mut program.blocks {
            block.lines.retain(|l| !l.starts_with("G0 Z"));
        }
        let report = SafetyValidator::new().validate(&program);
        assert!(report.errors.iter().any(|i| i.tag == "safe height"));
    }

    #[test]
    fn test_reasonable_feed_and_speed_produce_no_warnings() {
        // 150 mm/min and 1000 rpm are well inside the sane ranges
        let report = SafetyValidator::new().validate(&standard_program());
        assert!(!report.warnings.iter().any(|i| i.tag == "feed rate"));
        assert!(!report.warnings.iter().any(|i| i.tag == "spindle speed"));
    }

    #[test]
    fn test_unreasonable_feed_and_speed_warn() {
        let config = CompilerConfig::default();
        let mut builder = ProgramBuilder::new(&config);
        builder.push_block(feature_block(&[
            "G43 H02 Z100.",
            "S25000 M03",
            "G81 Z-5. R2. F6000.",
            "G80",
        ]));
        let report = SafetyValidator::new().validate(&builder.finish());
        assert!(report.warnings.iter().any(|i| i.tag == "feed rate"));
        assert!(report.warnings.iter().any(|i| i.tag == "spindle speed"));
    }

    #[test]
    fn test_missing_spindle_control_warns() {
        let config = CompilerConfig::default();
        let mut program = ProgramBuilder::new(&config).finish();
        program.blocks[1].lines.retain(|l| l != "M05");
        let report = SafetyValidator::new().validate(&program);
        assert!(report.warnings.iter().any(|i| i.tag == "spindle control"));
        assert!(report.warnings.iter().any(|i| i.tag == "tool compensation"));
    }

    #[test]
    fn test_rapid_plunge_without_retract_is_collision() {
        let config = CompilerConfig::default();
        let mut builder = ProgramBuilder::new(&config);
        builder.push_block(feature_block(&[
            "G43 H02 Z100.",
            "S1000 M03",
            "G1 Z-5. F100.",
            "G0 Z-8.",
            "G0 Z100.",
        ]));
        let program = builder.finish();
        let report = SafetyValidator::new().validate(&program);
        assert!(report.has_collisions);
        let collision = report
            .errors
            .iter()
            .find(|i| i.tag == "collision")
            .expect("collision issue");
        assert_eq!(collision.block_id, Some(1));
    }

    #[test]
    fn test_cut_below_cycle_depth_is_collision() {
        let config = CompilerConfig::default();
        let mut builder = ProgramBuilder::new(&config);
        builder.push_block(feature_block(&[
            "G43 H02 Z100.",
            "S1000 M03",
            "G81 Z-10. R2. F100.",
            "G1 Z-25. F100.",
            "G80",
            "G0 Z100.",
        ]));
        let report = SafetyValidator::new().validate(&builder.finish());
        assert!(report.has_collisions);
        assert!(report.errors.iter().any(|i| i.tag == "collision"));
    }

    #[test]
    fn test_validator_does_not_mutate_program() {
        let program = standard_program();
        let before = program.render();
        let _ = SafetyValidator::new().validate(&program);
        assert_eq!(program.render(), before);
    }
}
