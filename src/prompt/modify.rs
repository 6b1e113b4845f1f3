//! Prompt for enriching existing cards
//!
//! The response schema is assembled from the enabled capabilities. Fields
//! for disabled capabilities never appear; each one gets a "Do NOT" line
//! instead.

use super::board_view::{render_board_state, render_card_full, render_channel, render_members};
use super::{sections, PromptContext, PromptPair};
use crate::board::BoardSnapshot;
use crate::instruction::{Capabilities, Capability};

/// Field descriptions and a one-object JSON example for card patches
pub struct PatchSchema {
    pub fields: String,
    pub example: String,
}

pub fn patch_schema(capabilities: &Capabilities) -> PatchSchema {
    let mut fields = String::from(
        "- \"id\": the card id, exactly as given (required)\n\
         - \"title\": the card title, rewritten or unchanged (required)\n\
         - \"content\": text to add to the card (optional)",
    );
    let mut example = String::from(r#"{"id": "card-id", "title": "...", "content": "...""#);

    for capability in capabilities.enabled() {
        let (field, sample) = match capability {
            Capability::Tags => (
                "- \"tags\": tag names for the card",
                r#", "tags": ["tag"]"#,
            ),
            Capability::Properties => (
                "- \"properties\": key/value details about the card",
                r#", "properties": [{"key": "name", "value": "value"}]"#,
            ),
            Capability::Tasks => (
                "- \"tasks\": action items to add to the card",
                r#", "tasks": [{"title": "...", "description": "..."}]"#,
            ),
            Capability::Assignment => (
                "- \"assignedTo\": names of team members who should own the card",
                r#", "assignedTo": ["member name"]"#,
            ),
        };
        fields.push('\n');
        fields.push_str(field);
        example.push_str(sample);
    }
    example.push('}');

    PatchSchema { fields, example }
}

/// One "Do NOT" line per disabled capability
pub fn restrictions_section(capabilities: &Capabilities) -> Option<String> {
    let lines = capabilities.restrictions();
    if lines.is_empty() {
        return None;
    }
    let mut out = String::from("## Restrictions");
    for line in lines {
        out.push_str("\n- ");
        out.push_str(line);
    }
    Some(out)
}

/// Tag vocabulary of the board
pub fn render_tag_definitions(board: &BoardSnapshot) -> Option<String> {
    if board.tag_definitions.is_empty() {
        return None;
    }
    let names: Vec<&str> = board.tag_definitions.iter().map(|t| t.name.as_str()).collect();
    Some(format!(
        "## Available Tags\nPrefer these existing tags: {}",
        names.join(", ")
    ))
}

pub fn build_modify_prompt(ctx: &PromptContext<'_>) -> PromptPair {
    let capabilities = ctx.output_capabilities();
    let schema = patch_schema(&capabilities);
    let mut pair = PromptPair::default();

    pair.system.push(
        sections::ROLE,
        "You are updating existing cards on a kanban board according to the user's instructions.\n\
         Return one entry for every card you change and leave out cards that need no change.\n\
         Never invent card ids.",
    );
    pair.system.push(
        sections::OUTPUT,
        format!(
            "Each entry has:\n{}\n\nRespond with ONLY a JSON array, no other text:\n[{}]",
            schema.fields, schema.example
        ),
    );
    pair.system.push_opt(sections::RESTRICTIONS, restrictions_section(&capabilities));

    let targets = ctx.actionable_cards(&ctx.columns.target_column_ids);
    let cards = if targets.is_empty() {
        String::from("## Cards To Modify\n(no cards)")
    } else {
        let rendered: Vec<String> = targets
            .iter()
            .map(|card| render_card_full(ctx.board, card, capabilities.allow_tasks))
            .collect();
        format!("## Cards To Modify\n\n{}", rendered.join("\n\n"))
    };

    pair.user.push(sections::CHANNEL, render_channel(ctx.board));
    if capabilities.allow_tags {
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
    if capabilities.allow_assignment {
        pair.user.push_opt(sections::MEMBERS, render_members(&ctx.board.members));
    }
    pair.user.push(sections::CARDS, cards);
    pair.user.push(
        sections::INSTRUCTIONS,
        format!("## Instructions\n{}", ctx.instruction.instructions_text.trim()),
    );

    tracing::debug!(
        cards = targets.len(),
        system_chars = pair.system.render().len(),
        user_chars = pair.user.render().len(),
        "Built modify prompt"
    );
    pair
}
