//! Instruction (shroom) definitions
//!
//! An instruction is authored elsewhere and arrives immutable. It names an
//! action, where that action lands (target) and what board state the model
//! may read (context). Multi-step instructions declare their steps explicitly.

pub mod capabilities;
pub mod resolver;

pub use capabilities::{parse_capabilities, Capabilities, Capability};
pub use resolver::{resolve_columns, ResolvedColumns};

use crate::core::error::{EngineError, Result};
use crate::core::types::{ColumnId, InstructionId};
use serde::{Deserialize, Serialize};

/// Types of actions an instruction can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionAction {
    /// Create new cards
    Generate,
    /// Enrich existing cards
    Modify,
    /// Relocate cards between columns
    Move,
}

impl InstructionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Modify => "modify",
            Self::Move => "move",
        }
    }
}

/// Where an action's effect lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstructionTarget {
    Board,
    Column {
        #[serde(rename = "columnId")]
        column_id: ColumnId,
    },
    Columns {
        #[serde(rename = "columnIds")]
        column_ids: Vec<ColumnId>,
    },
}

/// Which columns the model may read as context
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextColumns {
    #[default]
    All,
    Columns {
        #[serde(rename = "columnIds")]
        column_ids: Vec<ColumnId>,
    },
}

/// One declared step of a multi-step instruction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionStep {
    pub action: InstructionAction,
    pub target_column_id: ColumnId,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub id: InstructionId,
    pub title: String,
    pub instructions_text: String,
    pub action: InstructionAction,
    pub target: InstructionTarget,
    #[serde(default)]
    pub context_columns: Option<ContextColumns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_count: Option<usize>,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
}

impl Instruction {
    /// Convenience constructor for single-action instructions
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        instructions_text: impl Into<String>,
        action: InstructionAction,
        target: InstructionTarget,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            instructions_text: instructions_text.into(),
            action,
            target,
            context_columns: None,
            card_count: None,
            steps: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: ContextColumns) -> Self {
        self.context_columns = Some(context);
        self
    }

    pub fn with_card_count(mut self, count: usize) -> Self {
        self.card_count = Some(count);
        self
    }

    pub fn with_steps(mut self, steps: Vec<InstructionStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn is_multi_step(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Actions this instruction performs, in declaration order without repeats
    pub fn actions(&self) -> Vec<InstructionAction> {
        if !self.is_multi_step() {
            return vec![self.action];
        }
        let mut actions = Vec::new();
        for step in &self.steps {
            if !actions.contains(&step.action) {
                actions.push(step.action);
            }
        }
        actions
    }

    /// Reject instructions the engine cannot act on
    pub fn validate(&self) -> Result<()> {
        if self.instructions_text.trim().is_empty() {
            return Err(EngineError::InvalidInstruction(format!(
                "instruction '{}' has no text",
                self.title
            )));
        }
        if let InstructionTarget::Columns { column_ids } = &self.target {
            if column_ids.is_empty() && self.steps.is_empty() {
                return Err(EngineError::InvalidInstruction(format!(
                    "instruction '{}' targets an empty column list",
                    self.title
                )));
            }
        }
        if let Some(step) = self.steps.iter().find(|s| s.target_column_id.trim().is_empty()) {
            return Err(EngineError::InvalidInstruction(format!(
                "{} step of '{}' has no target column",
                step.action.as_str(),
                self.title
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_deserialization() {
        let json = r#"{
            "id": "s1",
            "title": "Weeknight dinners",
            "instructionsText": "Suggest quick dinners",
            "action": "generate",
            "target": {"type": "column", "columnId": "inbox"},
            "contextColumns": {"type": "columns", "columnIds": ["liked"]},
            "cardCount": 3
        }"#;
        let instruction: Instruction = serde_json::from_str(json).unwrap();
        assert_eq!(instruction.action, InstructionAction::Generate);
        assert_eq!(
            instruction.target,
            InstructionTarget::Column { column_id: "inbox".into() }
        );
        assert_eq!(instruction.card_count, Some(3));
        assert!(!instruction.is_multi_step());
    }

    #[test]
    fn test_board_target_and_default_context() {
        let json = r#"{
            "id": "s2",
            "title": "Tidy",
            "instructionsText": "Sort things",
            "action": "move",
            "target": {"type": "board"}
        }"#;
        let instruction: Instruction = serde_json::from_str(json).unwrap();
        assert_eq!(instruction.target, InstructionTarget::Board);
        assert!(instruction.context_columns.is_none());
    }

    #[test]
    fn test_multi_step_actions_deduplicated() {
        let instruction = Instruction::new(
            "s3",
            "Triage",
            "Enrich then sort",
            InstructionAction::Modify,
            InstructionTarget::Board,
        )
        .with_steps(vec![
            InstructionStep {
                action: InstructionAction::Modify,
                target_column_id: "a".into(),
                description: String::new(),
                card_count: None,
            },
            InstructionStep {
                action: InstructionAction::Move,
                target_column_id: "a".into(),
                description: String::new(),
                card_count: None,
            },
            InstructionStep {
                action: InstructionAction::Modify,
                target_column_id: "b".into(),
                description: String::new(),
                card_count: None,
            },
        ]);
        assert!(instruction.is_multi_step());
        assert_eq!(
            instruction.actions(),
            vec![InstructionAction::Modify, InstructionAction::Move]
        );
    }

    #[test]
    fn test_validate_rejects_blank_text() {
        let instruction = Instruction::new(
            "s4",
            "Empty",
            "   ",
            InstructionAction::Generate,
            InstructionTarget::Board,
        );
        assert!(instruction.validate().is_err());
    }
}
