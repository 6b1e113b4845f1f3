//! Shroom Engine - AI instruction automation for kanban boards
//!
//! A user-authored instruction ("shroom") is turned into a structured edit
//! of a board snapshot: new cards, card enrichments, or card moves. The
//! engine prompts a language model with the board, inferred user feedback and
//! the capabilities the instruction allows, then parses and validates the
//! model's JSON. It never writes to the board itself.

pub mod board;
pub mod core;
pub mod engine;
pub mod feedback;
pub mod instruction;
pub mod llm;
pub mod prompt;

pub use crate::board::BoardSnapshot;
pub use crate::core::{EngineConfig, EngineError, Result};
pub use crate::engine::{ExecutionResult, InstructionEngine};
pub use crate::instruction::Instruction;
