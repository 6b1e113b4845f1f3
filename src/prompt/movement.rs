//! Prompt for moving cards between columns

use super::board_view::{render_channel, render_column_rules};
use super::{sections, PromptContext, PromptPair};
use crate::board::BoardSnapshot;
use crate::core::types::excerpt;

/// Every board column with its rules
pub fn render_columns(board: &BoardSnapshot) -> String {
    let mut out = String::from("## Columns");
    for column in &board.columns {
        out.push('\n');
        out.push_str(&render_column_rules(column));
    }
    out
}

pub const MOVE_EXAMPLE: &str =
    r#"{"cardId": "card-id", "destinationColumnId": "column-id", "reason": "short reason"}"#;

pub fn build_move_prompt(ctx: &PromptContext<'_>) -> PromptPair {
    let mut pair = PromptPair::default();

    pair.system.push(
        sections::ROLE,
        "You are organizing a kanban board by moving cards between columns according to the user's instructions \
         and each column's rules.\n\
         Only include cards that should change column. If no card should move, respond with [].",
    );
    pair.system.push(sections::COLUMNS, render_columns(ctx.board));
    pair.system.push(
        sections::OUTPUT,
        format!(
            "Use column ids exactly as listed.\n\
             Respond with ONLY a JSON array, no other text:\n[{}]",
            MOVE_EXAMPLE
        ),
    );

    let candidates = ctx.actionable_cards(&ctx.columns.target_column_ids);
    let mut cards = String::from("## Cards To Consider");
    if candidates.is_empty() {
        cards.push_str("\n(no cards)");
    }
    for card in &candidates {
        let column = ctx
            .board
            .column_of(&card.id)
            .map(|c| c.name.as_str())
            .unwrap_or("unknown");
        cards.push_str(&format!("\n- {} (id: {}, currently in \"{}\")", card.title, card.id, column));
        if let Some(preview) = card.preview_source() {
            let preview = excerpt(preview, ctx.config.summary_excerpt_chars);
            if !preview.is_empty() {
                cards.push_str(&format!(": {}", preview));
            }
        }
    }

    pair.user.push(sections::CHANNEL, render_channel(ctx.board));
    pair.user.push(sections::CARDS, cards);
    pair.user.push(
        sections::INSTRUCTIONS,
        format!("## Instructions\n{}", ctx.instruction.instructions_text.trim()),
    );

    tracing::debug!(
        cards = candidates.len(),
        system_chars = pair.system.render().len(),
        user_chars = pair.user.render().len(),
        "Built move prompt"
    );
    pair
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Card, Column};
    use crate::core::config::EngineConfig;
    use crate::instruction::{
        parse_capabilities, resolve_columns, Instruction, InstructionAction, InstructionTarget,
    };

    #[test]
    fn test_move_prompt_lists_columns_and_cards() {
        let board = BoardSnapshot {
            id: "b".into(),
            name: "Triage".into(),
            columns: vec![
                Column {
                    id: "inbox".into(),
                    name: "Inbox".into(),
                    instructions: None,
                    card_ids: vec!["c1".into()],
                },
                Column {
                    id: "urgent".into(),
                    name: "Urgent".into(),
                    instructions: Some("Deadlines this week".into()),
                    card_ids: vec![],
                },
            ],
            cards: vec![Card {
                id: "c1".into(),
                title: "Tax return".into(),
                summary: Some("Due Friday".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let instruction = Instruction::new(
            "i1",
            "Sort",
            "Move urgent items",
            InstructionAction::Move,
            InstructionTarget::Column {
                column_id: "inbox".into(),
            },
        );
        let columns = resolve_columns(&instruction, &board);
        let config = EngineConfig::default();
        let ctx = PromptContext {
            instruction: &instruction,
            board: &board,
            columns: &columns,
            capabilities: parse_capabilities(&instruction.instructions_text),
            feedback: None,
            card_count: 0,
            config: &config,
        };
        let pair = build_move_prompt(&ctx);

        let system = pair.system.render();
        assert!(system.contains("- \"Urgent\" (id: urgent): Deadlines this week"));
        assert!(system.contains("respond with []"));
        let user = pair.user.render();
        assert!(user.contains("- Tax return (id: c1, currently in \"Inbox\"): Due Friday"));
        assert_eq!(pair.user.names().last(), Some(&sections::INSTRUCTIONS));
    }
}
