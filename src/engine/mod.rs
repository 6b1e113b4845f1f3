//! Execution orchestration
//!
//! `InstructionEngine` sequences the other components for one instruction
//! and returns an `ExecutionResult`. Side effects live in hooks.

pub mod executor;
pub mod fallback;
pub mod hooks;
pub mod result;
pub mod validate;

pub use executor::InstructionEngine;
pub use fallback::{fallback_cards, fallback_result};
pub use hooks::{ExecutionEvent, ExecutionHook, LoggingHook};
pub use result::{CardDraft, CardPatch, CardProperty, ExecutionResult, MoveDecision, MultiStepResult, TaskDraft};
