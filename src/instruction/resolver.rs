//! Context resolution - maps target/context selectors onto concrete columns

use crate::board::BoardSnapshot;
use crate::core::types::ColumnId;
use crate::instruction::{ContextColumns, Instruction, InstructionTarget};

/// Columns an execution writes to and reads from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    /// Where the action's effect lands
    pub target_column_ids: Vec<ColumnId>,
    /// Whose cards the model sees as current board state
    pub context_column_ids: Vec<ColumnId>,
    /// Selector ids that did not exist on the board
    pub notes: Vec<String>,
}

impl ResolvedColumns {
    /// The single target column, when exactly one is targeted
    pub fn single_target(&self) -> Option<&str> {
        match self.target_column_ids.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Resolves an instruction's selectors against one board
pub struct ColumnResolver<'a> {
    board: &'a BoardSnapshot,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(board: &'a BoardSnapshot) -> Self {
        Self { board }
    }

    pub fn resolve(&self, instruction: &Instruction) -> ResolvedColumns {
        let mut notes = Vec::new();

        let requested_targets = match &instruction.target {
            InstructionTarget::Board => self.board.column_ids(),
            InstructionTarget::Column { column_id } => vec![column_id.clone()],
            InstructionTarget::Columns { column_ids } => column_ids.clone(),
        };
        // Step targets widen the target set for multi-step instructions
        let requested_targets = requested_targets
            .into_iter()
            .chain(instruction.steps.iter().map(|s| s.target_column_id.clone()));
        let target_column_ids = self.known(requested_targets, "target", &mut notes);

        let requested_context = match instruction.context_columns.as_ref() {
            None | Some(ContextColumns::All) => self.board.column_ids(),
            Some(ContextColumns::Columns { column_ids }) => column_ids.clone(),
        };
        let context_column_ids = self.known(requested_context, "context", &mut notes);

        for note in &notes {
            tracing::warn!(instruction = %instruction.id, "{}", note);
        }

        ResolvedColumns {
            target_column_ids,
            context_column_ids,
            notes,
        }
    }

    fn known(
        &self,
        ids: impl IntoIterator<Item = ColumnId>,
        role: &str,
        notes: &mut Vec<String>,
    ) -> Vec<ColumnId> {
        let mut resolved: Vec<ColumnId> = Vec::new();
        for id in ids {
            if self.board.column(&id).is_none() {
                notes.push(format!("Unknown {} column '{}' ignored", role, id));
                continue;
            }
            if !resolved.contains(&id) {
                resolved.push(id);
            }
        }
        resolved
    }
}

/// Resolve target and context columns for an instruction
pub fn resolve_columns(instruction: &Instruction, board: &BoardSnapshot) -> ResolvedColumns {
    ColumnResolver::new(board).resolve(instruction)
}
