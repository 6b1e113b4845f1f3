//! Prompt for creating new cards

use super::board_view::{render_board_state, render_channel, render_column_rules, render_members};
use super::{sections, PromptContext, PromptPair};

pub fn build_generate_prompt(ctx: &PromptContext<'_>) -> PromptPair {
    let capabilities = ctx.output_capabilities();
    let mut pair = PromptPair::default();

    pair.system.push(
        sections::ROLE,
        format!(
            "You are helping a user fill a kanban board with useful cards.\n\
             Generate exactly {} new cards that follow the user's instructions.\n\
             Do not repeat cards that already exist on the board.",
            ctx.card_count
        ),
    );

    let mut fields = String::from(
        "Each card has:\n\
         - \"title\": a short, specific title\n\
         - \"content\": the card body with useful detail (markdown allowed)",
    );
    let mut example = String::from(r#"{"title": "...", "content": "...""#);
    if capabilities.allow_assignment {
        fields.push_str("\n- \"assignedTo\": names of team members who should own the card");
        example.push_str(r#", "assignedTo": ["member name"]"#);
    }
    example.push('}');
    pair.system.push(
        sections::OUTPUT,
        format!(
            "{}\n\nRespond with ONLY a JSON array of {} cards, no other text:\n[{}]",
            fields, ctx.card_count, example
        ),
    );

    if let Some(column) = ctx.columns.single_target().and_then(|id| ctx.board.column(id)) {
        if column.instructions.as_deref().is_some_and(|r| !r.trim().is_empty()) {
            pair.system.push(
                sections::RULES,
                format!(
                    "## Column Rules\nNew cards are placed in column \"{}\". Every card must satisfy its rules:\n{}",
                    column.name,
                    render_column_rules(column)
                ),
            );
        }
    }

    pair.user.push(sections::CHANNEL, render_channel(ctx.board));
    pair.user.push_opt(
        sections::BOARD,
        render_board_state(
            ctx.board,
            &ctx.columns.context_column_ids,
            ctx.config.summary_excerpt_chars,
        ),
    );
    pair.user.push_opt(
        sections::FEEDBACK,
        ctx.feedback.map(|f| format!("## Feedback From Board Activity\n{}", f)),
    );
    if capabilities.allow_assignment {
        pair.user.push_opt(sections::MEMBERS, render_members(&ctx.board.members));
    }
    pair.user.push(
        sections::INSTRUCTIONS,
        format!(
            "## Instructions\n{}\n\nGenerate {} cards now.",
            ctx.instruction.instructions_text.trim(),
            ctx.card_count
        ),
    );

    tracing::debug!(
        system_chars = pair.system.render().len(),
        user_chars = pair.user.render().len(),
        "Built generate prompt"
    );
    pair
}
