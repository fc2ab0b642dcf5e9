//! Program assembly
//!
//! Wraps compiled feature blocks in the fixed FANUC program frame: the
//! `O` number header and initialization preamble up front, spindle stop
//! and `M30` at the end. The assembled program is an immutable value; the
//! safety validator reads it but never rewrites instruction lines.

use crate::toolpath::{coord, BlockKind, GCodeBlock};
use chrono::{DateTime, Utc};
use partcam_core::CompilerConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A complete, ordered G-code program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GCodeProgram {
    /// Unique identity of this compilation run.
    pub id: Uuid,
    /// FANUC program number (the `O` word).
    pub number: u32,
    /// When the program was assembled.
    pub created_at: DateTime<Utc>,
    /// Ordered blocks; ids match block positions.
    pub blocks: Vec<GCodeBlock>,
}

impl GCodeProgram {
    /// All instruction lines in program order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter().map(String::as_str))
    }

    /// Number of instruction lines
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }

    /// Render to a line-oriented text blob
    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.lines() {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Assembles blocks into a framed program
pub struct ProgramBuilder {
    number: u32,
    safe_height: f64,
    blocks: Vec<GCodeBlock>,
}

impl ProgramBuilder {
    /// Builder with the preamble block already in place
    pub fn new(config: &CompilerConfig) -> Self {
        let preamble = GCodeBlock::new(
            BlockKind::ProgramControl,
            vec![
                format!("O{:04}", config.program_number),
                "G21 G90 G40 G49 G80".to_string(),
                format!("G0 Z{}", coord(config.safe_height)),
            ],
            Vec::new(),
        );
        let mut builder = Self {
            number: config.program_number,
            safe_height: config.safe_height,
            blocks: Vec::new(),
        };
        builder.push_block(preamble);
        builder
    }

    /// Append a block, assigning its program-order id
    pub fn push_block(&mut self, mut block: GCodeBlock) {
        block.id = self.blocks.len() as u32;
        self.blocks.push(block);
    }

    /// Append the termination block and produce the program
    pub fn finish(mut self) -> GCodeProgram {
        let termination = GCodeBlock::new(
            BlockKind::ProgramControl,
            vec![
                format!("G0 Z{}", coord(self.safe_height)),
                "M05".to_string(),
                "M30".to_string(),
            ],
            Vec::new(),
        );
        self.push_block(termination);
        GCodeProgram {
            id: Uuid::new_v4(),
            number: self.number,
            created_at: Utc::now(),
            blocks: self.blocks,
        }
    }
}
