//! Single-request prompt for multi-step instructions
//!
//! All declared steps are answered in one JSON object, so a card modified by
//! one step can be moved by a later one in the same response.

use super::board_view::{column_label, render_board_state, render_card_full, render_channel, render_members};
use super::modify::{patch_schema, render_tag_definitions, restrictions_section};
use super::movement::{render_columns, MOVE_EXAMPLE};
use super::{sections, PromptContext, PromptPair};
use crate::instruction::{InstructionAction, InstructionStep};
use crate::llm::parser::{GENERATED_KEY, MODIFIED_KEY, MOVED_KEY};

/// Cards requested by one generate step
pub fn step_card_count(ctx: &PromptContext<'_>, step: &InstructionStep) -> usize {
    ctx.config
        .card_count(step.card_count.or(ctx.instruction.card_count))
}

fn render_step(ctx: &PromptContext<'_>, index: usize, step: &InstructionStep) -> String {
    let column = column_label(ctx.board, &step.target_column_id);
    let head = match step.action {
        InstructionAction::Generate => format!(
            "GENERATE {} new cards for column \"{}\" (id: {})",
            step_card_count(ctx, step),
            column,
            step.target_column_id
        ),
        InstructionAction::Modify => format!(
            "MODIFY cards in column \"{}\" (id: {})",
            column, step.target_column_id
        ),
        InstructionAction::Move => format!(
            "MOVE cards currently in column \"{}\" (id: {}) to the column where they belong",
            column, step.target_column_id
        ),
    };
    if step.description.trim().is_empty() {
        format!("{}. {}", index + 1, head)
    } else {
        format!("{}. {}: {}", index + 1, head, step.description.trim())
    }
}

pub fn build_unified_prompt(ctx: &PromptContext<'_>) -> PromptPair {
    let capabilities = ctx.output_capabilities();
    let actions = ctx.instruction.actions();
    let has = |action: InstructionAction| actions.contains(&action);
    let mut pair = PromptPair::default();

    pair.system.push(
        sections::ROLE,
        "You are running a multi-step automation on a kanban board.\n\
         Perform ALL of the steps below and answer them together in a single response.\n\
         Steps apply in order: a card modified in one step may also be moved in a later step. \
         Refer to existing cards by their exact id.",
    );

    let steps: Vec<String> = ctx
        .instruction
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| render_step(ctx, i, step))
        .collect();
    pair.system.push(sections::STEPS, format!("## Steps\n{}", steps.join("\n")));

    let mut keys = Vec::new();
    if has(InstructionAction::Generate) {
        let mut example = String::from(r#"{"title": "...", "content": "...", "columnId": "column-id""#);
        if capabilities.allow_assignment {
            example.push_str(r#", "assignedTo": ["member name"]"#);
        }
        example.push('}');
        keys.push(format!("- \"{}\": new cards, each with its target column id: [{}]", GENERATED_KEY, example));
    }
    if has(InstructionAction::Modify) {
        let schema = patch_schema(&capabilities);
        keys.push(format!(
            "- \"{}\": changed cards: [{}]\n  Fields:\n{}",
            MODIFIED_KEY,
            schema.example,
            schema
                .fields
                .lines()
                .map(|l| format!("  {}", l))
                .collect::<Vec<_>>()
                .join("\n")
        ));
    }
    if has(InstructionAction::Move) {
        keys.push(format!(
            "- \"{}\": cards that should change column: [{}]",
            MOVED_KEY, MOVE_EXAMPLE
        ));
    }
    pair.system.push(
        sections::OUTPUT,
        format!(
            "## Response Format\nRespond with ONLY a JSON object, no other text, with these keys:\n{}\n\
             Use an empty array for a key when nothing applies.",
            keys.join("\n")
        ),
    );
    if has(InstructionAction::Modify) || has(InstructionAction::Generate) {
        pair.system.push_opt(sections::RESTRICTIONS, restrictions_section(&capabilities));
    }
    pair.system.push(sections::COLUMNS, render_columns(ctx.board));

    let step_columns: Vec<String> = ctx
        .instruction
        .steps
        .iter()
        .filter(|s| s.action != InstructionAction::Generate)
        .map(|s| s.target_column_id.clone())
        .fold(Vec::new(), |mut acc, id| {
            if !acc.contains(&id) {
                acc.push(id);
            }
            acc
        });
    let step_cards = ctx.actionable_cards(&step_columns);

    pair.user.push(sections::CHANNEL, render_channel(ctx.board));
    if capabilities.allow_tags && has(InstructionAction::Modify) {
        pair.user.push_opt(sections::TAGS, render_tag_definitions(ctx.board));
    }
    pair.user.push_opt(
        sections::BOARD,
        render_board_state(
            ctx.board,
            &ctx.columns.context_column_ids,
            ctx.config.summary_excerpt_chars,
        ),
    );
    if has(InstructionAction::Generate) {
        pair.user.push_opt(
            sections::FEEDBACK,
            ctx.feedback.map(|f| format!("## Feedback From Board Activity\n{}", f)),
        );
    }
    if capabilities.allow_assignment {
        pair.user.push_opt(sections::MEMBERS, render_members(&ctx.board.members));
    }
    if !step_columns.is_empty() {
        let body = if step_cards.is_empty() {
            String::from("## Cards In Step Columns\n(no cards)")
        } else {
            let rendered: Vec<String> = step_cards
                .iter()
                .map(|card| render_card_full(ctx.board, card, capabilities.allow_tasks))
                .collect();
            format!("## Cards In Step Columns\n\n{}", rendered.join("\n\n"))
        };
        pair.user.push(sections::CARDS, body);
    }
    pair.user.push(
        sections::INSTRUCTIONS,
        format!("## Instructions\n{}", ctx.instruction.instructions_text.trim()),
    );

    tracing::debug!(
        steps = ctx.instruction.steps.len(),
        cards = step_cards.len(),
        system_chars = pair.system.render().len(),
        user_chars = pair.user.render().len(),
        "Built unified multi-step prompt"
    );
    pair
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardSnapshot, Card, Column};
    use crate::core::config::EngineConfig;
    use crate::instruction::{
        parse_capabilities, resolve_columns, Capability, Instruction, InstructionTarget,
    };

    fn board() -> BoardSnapshot {
        BoardSnapshot {
            id: "b".into(),
            name: "Reading".into(),
            columns: vec![
                Column {
                    id: "a".into(),
                    name: "Backlog".into(),
                    instructions: None,
                    card_ids: vec!["c1".into()],
                },
                Column {
                    id: "b".into(),
                    name: "Shortlist".into(),
                    instructions: Some("Books under 300 pages".into()),
                    card_ids: vec![],
                },
            ],
            cards: vec![Card {
                id: "c1".into(),
                title: "Dune".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn step(action: InstructionAction, column: &str) -> InstructionStep {
        InstructionStep {
            action,
            target_column_id: column.into(),
            description: String::new(),
            card_count: None,
        }
    }

    fn build(steps: Vec<InstructionStep>, text: &str) -> PromptPair {
        let board = board();
        let instruction = Instruction::new(
            "i1",
            "Pipeline",
            text,
            InstructionAction::Modify,
            InstructionTarget::Column { column_id: "a".into() },
        )
        .with_steps(steps);
        let columns = resolve_columns(&instruction, &board);
        let config = EngineConfig::default();
        let ctx = PromptContext {
            instruction: &instruction,
            board: &board,
            columns: &columns,
            capabilities: parse_capabilities(text),
            feedback: Some("Prefers short books"),
            card_count: 5,
            config: &config,
        };
        build_unified_prompt(&ctx)
    }

    #[test]
    fn test_modify_then_move_keys() {
        let pair = build(
            vec![
                step(InstructionAction::Modify, "a"),
                step(InstructionAction::Move, "a"),
            ],
            "Summarize each book then shortlist the short ones",
        );
        let system = pair.system.render();
        assert!(system.contains("\"modifiedCards\""));
        assert!(system.contains("\"movedCards\""));
        assert!(!system.contains("\"generatedCards\""));
        assert!(system.contains("1. MODIFY cards in column \"Backlog\""));
        assert!(system.contains("2. MOVE cards currently in column \"Backlog\""));
        assert_eq!(system.matches("Do NOT").count(), Capability::ALL.len());

        let user = pair.user.render();
        assert_eq!(user.matches("### Card (id: c1)").count(), 1);
        assert!(!pair.user.has(sections::FEEDBACK));
    }

    #[test]
    fn test_generate_step_counts_and_feedback() {
        let mut generate = step(InstructionAction::Generate, "b");
        generate.card_count = Some(2);
        let pair = build(vec![generate], "Suggest books");
        let system = pair.system.render();
        assert!(system.contains("GENERATE 2 new cards for column \"Shortlist\""));
        assert!(system.contains("\"generatedCards\""));
        assert!(!system.contains("\"modifiedCards\""));
        assert!(pair.user.has(sections::FEEDBACK));
        assert!(!pair.user.has(sections::CARDS));
    }
}
