//! # PartCam Toolpath
//!
//! The deterministic toolpath compiler: takes detected 2D geometric
//! features, establishes a machining origin, merges concentric circle
//! pairs into counterbores, batches features by machining parameters, and
//! emits validated FANUC canned-cycle G-code.
//!
//! ## Pipeline stages
//!
//! - **Coordinate resolver**: picks the machining origin and rewrites
//!   every feature relative to it
//! - **Compositor**: merges concentric circle pairs into counterbores
//! - **Grouper**: batches features sharing one parameter signature
//! - **Toolpath compiler**: one canned cycle per batch, modal X/Y repeats
//! - **Program assembly**: O-number header, init preamble, termination
//! - **Safety validator**: static checks over the assembled program
//!
//! Every stage is a pure function from one immutable value to the next;
//! `pipeline::compile_drawing` chains them end to end.

pub mod compositor;
pub mod coordinate;
pub mod grouper;
pub mod machining;
pub mod pipeline;
pub mod program;
pub mod toolpath;
pub mod validator;

pub use compositor::{compose, CompositionOutcome, CompositionWarning};
pub use coordinate::{resolve, transform};
pub use grouper::{group, FeatureBatch, ParameterSignature};
pub use machining::{actual_depth, tapping_feed, MachiningParameters, MissingParameterWarning};
pub use pipeline::{compile_drawing, CompilationOutput};
pub use program::{GCodeProgram, ProgramBuilder};
pub use toolpath::{BlockKind, CompiledBatch, GCodeBlock, ToolpathCompiler};
pub use validator::{Issue, SafetyValidator, Severity, ValidationReport};
