//! Execution output types
//!
//! Every value in here was produced by the model and survived validation.
//! The result is always JSON-serializable and always present, possibly empty.

use crate::core::types::{CardId, ColumnId};
use crate::instruction::InstructionAction;
use serde::{Deserialize, Serialize};

/// A new card to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub title: String,
    pub initial_message: String,
    /// Column the card lands in, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<String>>,
}

impl CardDraft {
    pub fn new(title: impl Into<String>, initial_message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            initial_message: initial_message.into(),
            column_id: None,
            assigned_to: None,
        }
    }
}

/// A key/value property attached to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProperty {
    pub key: String,
    pub value: String,
}

/// A task to attach to a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Changes to an existing card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPatch {
    pub id: CardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<CardProperty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Vec<String>>,
}

/// Relocation of one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDecision {
    pub card_id: CardId,
    pub destination_column_id: ColumnId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Combined output of a multi-step instruction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiStepResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<Vec<CardDraft>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<Vec<CardPatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<Vec<MoveDecision>>,
}

impl MultiStepResult {
    /// Empty collections for every action the instruction declares
    pub fn for_actions(actions: &[InstructionAction]) -> Self {
        Self {
            generated: actions.contains(&InstructionAction::Generate).then(Vec::new),
            modified: actions.contains(&InstructionAction::Modify).then(Vec::new),
            moved: actions.contains(&InstructionAction::Move).then(Vec::new),
        }
    }
}

/// Result of one instruction execution, tagged by action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExecutionResult {
    Generate { cards: Vec<CardDraft> },
    Modify { cards: Vec<CardPatch> },
    Move { moves: Vec<MoveDecision> },
    MultiStep(MultiStepResult),
}

impl ExecutionResult {
    /// Empty result shaped for an action
    pub fn empty(action: InstructionAction) -> Self {
        match action {
            InstructionAction::Generate => Self::Generate { cards: Vec::new() },
            InstructionAction::Modify => Self::Modify { cards: Vec::new() },
            InstructionAction::Move => Self::Move { moves: Vec::new() },
        }
    }

    /// Number of produced items across every collection
    pub fn item_count(&self) -> usize {
        match self {
            Self::Generate { cards } => cards.len(),
            Self::Modify { cards } => cards.len(),
            Self::Move { moves } => moves.len(),
            Self::MultiStep(multi) => {
                multi.generated.as_ref().map_or(0, Vec::len)
                    + multi.modified.as_ref().map_or(0, Vec::len)
                    + multi.moved.as_ref().map_or(0, Vec::len)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Generate { .. } => "generate",
            Self::Modify { .. } => "modify",
            Self::Move { .. } => "move",
            Self::MultiStep(_) => "multi_step",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_result_wire_format() {
        let result = ExecutionResult::Generate {
            cards: vec![CardDraft::new("X", "Y")],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "generate", "cards": [{"title": "X", "initialMessage": "Y"}]})
        );
    }

    #[test]
    fn test_multi_step_omits_undeclared_collections() {
        let result = ExecutionResult::MultiStep(MultiStepResult::for_actions(&[
            InstructionAction::Modify,
            InstructionAction::Move,
        ]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"action": "multi_step", "modified": [], "moved": []})
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_item_count() {
        let result = ExecutionResult::MultiStep(MultiStepResult {
            generated: Some(vec![CardDraft::new("a", "b")]),
            modified: None,
            moved: Some(vec![MoveDecision {
                card_id: "c".into(),
                destination_column_id: "d".into(),
                reason: None,
            }]),
        });
        assert_eq!(result.item_count(), 2);
        assert_eq!(result.action_name(), "multi_step");
    }
}
