//! Referential checks of parsed model output against the board
//!
//! The parser guarantees shape; this pass guarantees that every id in the
//! result points at something real. Anything that does not is dropped with
//! a warning.

use crate::board::BoardSnapshot;
use crate::core::types::{CardId, ColumnId};
use crate::engine::result::{CardDraft, CardPatch, MoveDecision, MultiStepResult};
use ahash::AHashSet;

pub struct ReferenceValidator<'a> {
    board: &'a BoardSnapshot,
    /// Columns new cards may land in; the first is the default
    generate_columns: Vec<ColumnId>,
    /// Cards a patch may touch
    modifiable: AHashSet<CardId>,
}

impl<'a> ReferenceValidator<'a> {
    pub fn new(board: &'a BoardSnapshot, generate_columns: Vec<ColumnId>, modifiable: AHashSet<CardId>) -> Self {
        Self {
            board,
            generate_columns,
            modifiable,
        }
    }

    /// Member references resolved to member ids; unknown names are dropped
    fn assignees(&self, assigned_to: Option<Vec<String>>) -> Option<Vec<String>> {
        let mut resolved: Vec<String> = Vec::new();
        for reference in assigned_to.unwrap_or_default() {
            match self.board.resolve_member(&reference) {
                Some(member) if !resolved.contains(&member.id) => resolved.push(member.id.clone()),
                Some(_) => {}
                None => tracing::warn!(assignee = %reference, "Dropping unknown assignee"),
            }
        }
        (!resolved.is_empty()).then_some(resolved)
    }

    pub fn drafts(&self, drafts: Vec<CardDraft>) -> Vec<CardDraft> {
        drafts
            .into_iter()
            .map(|mut draft| {
                let requested = draft.column_id.take();
                draft.column_id = match requested {
                    Some(id) if self.generate_columns.contains(&id) => Some(id),
                    other => {
                        if let Some(id) = other {
                            tracing::warn!(column = %id, title = %draft.title, "Generated card names a column outside the targets");
                        }
                        self.generate_columns.first().cloned()
                    }
                };
                draft.assigned_to = self.assignees(draft.assigned_to.take());
                draft
            })
            .collect()
    }

    pub fn patches(&self, patches: Vec<CardPatch>) -> Vec<CardPatch> {
        let mut seen: AHashSet<CardId> = AHashSet::new();
        patches
            .into_iter()
            .filter(|patch| {
                if !self.modifiable.contains(&patch.id) {
                    tracing::warn!(card = %patch.id, "Dropping patch for a card outside the target columns");
                    return false;
                }
                if !seen.insert(patch.id.clone()) {
                    tracing::warn!(card = %patch.id, "Dropping duplicate patch");
                    return false;
                }
                true
            })
            .map(|mut patch| {
                patch.assigned_to = self.assignees(patch.assigned_to.take());
                patch
            })
            .collect()
    }

    pub fn moves(&self, moves: Vec<MoveDecision>) -> Vec<MoveDecision> {
        let mut seen: AHashSet<CardId> = AHashSet::new();
        moves
            .into_iter()
            .filter(|decision| {
                let Some(current) = self.board.column_of(&decision.card_id) else {
                    tracing::warn!(card = %decision.card_id, "Dropping move of an unknown card");
                    return false;
                };
                if self.board.column(&decision.destination_column_id).is_none() {
                    tracing::warn!(
                        card = %decision.card_id,
                        column = %decision.destination_column_id,
                        "Dropping move to an unknown column"
                    );
                    return false;
                }
                if current.id == decision.destination_column_id {
                    tracing::debug!(card = %decision.card_id, "Dropping move to the current column");
                    return false;
                }
                seen.insert(decision.card_id.clone())
            })
            .collect()
    }

    pub fn multi_step(&self, result: MultiStepResult) -> MultiStepResult {
        MultiStepResult {
            generated: result.generated.map(|d| self.drafts(d)),
            modified: result.modified.map(|p| self.patches(p)),
            moved: result.moved.map(|m| self.moves(m)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Card, Column, Member};

    fn board() -> BoardSnapshot {
        BoardSnapshot {
            id: "b".into(),
            name: "Team".into(),
            columns: vec![
                Column {
                    id: "todo".into(),
                    name: "To Do".into(),
                    instructions: None,
                    card_ids: vec!["c1".into(), "c2".into()],
                },
                Column {
                    id: "done".into(),
                    name: "Done".into(),
                    instructions: None,
                    card_ids: vec![],
                },
            ],
            cards: vec![
                Card {
                    id: "c1".into(),
                    title: "One".into(),
                    ..Default::default()
                },
                Card {
                    id: "c2".into(),
                    title: "Two".into(),
                    ..Default::default()
                },
            ],
            members: vec![Member {
                id: "m1".into(),
                name: "Sam Lee".into(),
                role: None,
                role_description: None,
            }],
            ..Default::default()
        }
    }

    fn validator(board: &BoardSnapshot) -> ReferenceValidator<'_> {
        ReferenceValidator::new(board, vec!["todo".into()], ["c1".to_string()].into_iter().collect())
    }

    fn patch(id: &str) -> CardPatch {
        CardPatch {
            id: id.into(),
            title: "t".into(),
            content: None,
            tags: None,
            properties: None,
            tasks: None,
            assigned_to: None,
        }
    }

    fn decision(card: &str, dest: &str) -> MoveDecision {
        MoveDecision {
            card_id: card.into(),
            destination_column_id: dest.into(),
            reason: None,
        }
    }

    #[test]
    fn test_drafts_default_column_and_assignees() {
        let board = board();
        let mut draft = CardDraft::new("New", "Body");
        draft.column_id = Some("elsewhere".into());
        draft.assigned_to = Some(vec!["sam lee".into(), "m1".into(), "Nobody".into()]);
        let drafts = validator(&board).drafts(vec![draft]);
        assert_eq!(drafts[0].column_id.as_deref(), Some("todo"));
        assert_eq!(drafts[0].assigned_to, Some(vec!["m1".to_string()]));
    }

    #[test]
    fn test_patches_restricted_to_targets() {
        let board = board();
        let patches = validator(&board).patches(vec![patch("c1"), patch("c2"), patch("ghost"), patch("c1")]);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].id, "c1");
    }

    #[test]
    fn test_moves_checked() {
        let board = board();
        let moves = validator(&board).moves(vec![
            decision("c1", "done"),
            decision("c2", "todo"),
            decision("c2", "nowhere"),
            decision("ghost", "done"),
            decision("c1", "done"),
        ]);
        assert_eq!(moves, vec![decision("c1", "done")]);
    }
}
