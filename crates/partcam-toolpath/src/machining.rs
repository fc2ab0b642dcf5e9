//! Machining parameter resolution
//!
//! Turns a parameter signature plus the processing requirement and config
//! into the numeric plan for one cycle: tool number, spindle speed, feed
//! rate, and the computed cutting depth. Missing requirement values fall
//! back to documented defaults and are surfaced as warnings; a cycle is
//! never emitted without Z/F/S values.

use partcam_core::{CompilerConfig, ProcessingRequirement, ProcessingType};

/// Cutting depth for a drilled hole
///
/// `drawing_depth + diameter/3 + depth_factor`, rounded to one decimal
/// place. The rounding is load-bearing for downstream part programs and
/// must not change.
pub fn actual_depth(drawing_depth: f64, diameter: f64, depth_factor: f64) -> f64 {
    ((drawing_depth + diameter / 3.0 + depth_factor) * 10.0).round() / 10.0
}

/// Feed rate for rigid tapping: one pitch per revolution, floored at 1
pub fn tapping_feed(spindle_speed: f64, thread_pitch: f64) -> f64 {
    (spindle_speed * thread_pitch).max(1.0)
}

/// A requirement value that had to be substituted with a default
#[derive(Debug, Clone, PartialEq)]
pub struct MissingParameterWarning {
    /// Name of the missing parameter.
    pub name: &'static str,
    /// The default that was substituted.
    pub substituted: f64,
}

/// Resolved numeric plan for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct MachiningParameters {
    /// Tool number for the T/H words.
    pub tool_number: u32,
    /// Spindle speed in RPM, after material scaling.
    pub spindle_speed: f64,
    /// Feed rate in mm/min.
    pub feed_rate: f64,
    /// Hole diameter used for depth computation.
    pub diameter: f64,
    /// Computed cutting depth (positive; emitted as negative Z).
    pub actual_depth: f64,
    /// Computed tapping feed, set only for tapping.
    pub tapping_feed: Option<f64>,
}

impl MachiningParameters {
    /// Resolve the plan for one batch
    ///
    /// `feature_diameter` is the diameter read from the batch geometry,
    /// when the shape has one; the requirement diameter and finally the
    /// configured default fill the gaps.
    pub fn resolve(
        processing_type: ProcessingType,
        feature_diameter: Option<f64>,
        requirement: &ProcessingRequirement,
        config: &CompilerConfig,
    ) -> (Self, Vec<MissingParameterWarning>) {
        let mut warnings = Vec::new();

        let diameter = match feature_diameter.or(requirement.diameter) {
            Some(d) => d,
            None => {
                tracing::warn!(
                    default = config.default_diameter,
                    "no diameter available; using default"
                );
                warnings.push(MissingParameterWarning {
                    name: "diameter",
                    substituted: config.default_diameter,
                });
                config.default_diameter
            }
        };
        let drawing_depth = match requirement.depth {
            Some(d) => d,
            None => {
                tracing::warn!(default = config.default_depth, "no depth stated; using default");
                warnings.push(MissingParameterWarning {
                    name: "depth",
                    substituted: config.default_depth,
                });
                config.default_depth
            }
        };

        let defaults = config.cycle_defaults(processing_type);
        let factor = config.material_factor(&requirement.material);
        let spindle_speed = defaults.spindle_speed * factor;

        let tool_number = match processing_type {
            ProcessingType::Drilling | ProcessingType::PeckDrilling => config.tools.drill,
            ProcessingType::Counterbore => config.tools.counterbore,
            ProcessingType::Tapping => config.tools.tap,
        };

        let tap_feed = if processing_type == ProcessingType::Tapping {
            Some(tapping_feed(spindle_speed, config.thread_pitch(diameter)))
        } else {
            None
        };
        let feed_rate = tap_feed.unwrap_or_else(|| {
            requirement.feed_rate.unwrap_or(defaults.feed_rate * factor)
        });

        (
            Self {
                tool_number,
                spindle_speed,
                feed_rate,
                diameter,
                actual_depth: actual_depth(drawing_depth, diameter, config.depth_factor),
                tapping_feed: tap_feed,
            },
            warnings,
        )
    }
}
