//! Natural-language feedback context for prompts
//!
//! Turns the current board layout into a few short paragraphs the model can
//! use to steer generation. There is no movement history; everything here is
//! read off where cards sit right now.

use crate::board::{BoardSnapshot, Card};
use crate::core::config::EngineConfig;
use crate::feedback::effectiveness::measure_effectiveness;
use crate::feedback::sentiment::{
    classify_column, classify_topology, column_roles, ColumnSentiment,
};
use crate::feedback::themes::{extract_themes, format_themes};

/// Build the feedback context string, or `None` when there is nothing to say
///
/// Boards with fewer than `min_cards_for_feedback` cards never produce context.
pub fn build_feedback_context(board: &BoardSnapshot, config: &EngineConfig) -> Option<String> {
    if board.total_cards() < config.min_cards_for_feedback {
        return None;
    }

    let roles = column_roles(board);
    let sentiments: Vec<ColumnSentiment> = roles.iter().map(|r| r.sentiment).collect();
    let mut sections: Vec<String> = Vec::new();

    // Board type
    if let Some(sentence) = classify_topology(&sentiments).describe() {
        sections.push(sentence.to_string());
    }

    // Column roles
    let names_with = |sentiment: ColumnSentiment| -> Vec<String> {
        roles
            .iter()
            .filter(|r| r.sentiment == sentiment)
            .map(|r| format!("\"{}\"", r.name))
            .collect()
    };
    let positive_names = names_with(ColumnSentiment::Positive);
    let negative_names = names_with(ColumnSentiment::Negative);
    let mut column_lines = Vec::new();
    if !positive_names.is_empty() {
        column_lines.push(format!(
            "Columns where the user keeps cards they like: {}",
            positive_names.join(", ")
        ));
    }
    if !negative_names.is_empty() {
        column_lines.push(format!(
            "Columns where the user puts cards they rejected: {}",
            negative_names.join(", ")
        ));
    }
    if !column_lines.is_empty() {
        sections.push(column_lines.join("\n"));
    }

    if let Some(block) = content_preferences(board, config) {
        sections.push(block);
    }

    if let Some(note) = measure_effectiveness(board).note(config) {
        sections.push(note);
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}

/// Avoid/prefer lists from the themes of rejected and liked cards
fn content_preferences(board: &BoardSnapshot, config: &EngineConfig) -> Option<String> {
    let mut negative_cards: Vec<&Card> = Vec::new();
    let mut positive_cards: Vec<&Card> = Vec::new();
    for (column, card) in board.placed_cards() {
        match classify_column(&column.name) {
            ColumnSentiment::Negative => negative_cards.push(card),
            ColumnSentiment::Positive => positive_cards.push(card),
            _ => {}
        }
    }

    let avoid = extract_themes(&negative_cards, config);
    let prefer = extract_themes(&positive_cards, config);

    let mut lines = Vec::new();
    if !avoid.is_empty() {
        lines.push(format!("- AVOID (frequently rejected): {}", format_themes(&avoid)));
    }
    if !prefer.is_empty() {
        lines.push(format!("- PREFER (frequently kept): {}", format_themes(&prefer)));
    }

    let ratio = negative_cards.len() as f64 / positive_cards.len().max(1) as f64;
    if !negative_cards.is_empty() && ratio >= config.negative_ratio_warning {
        lines.push(format!(
            "- WARNING: the user rejected {} cards but kept only {}. Recent suggestions have missed; change direction rather than repeating them.",
            negative_cards.len(),
            positive_cards.len()
        ));
    }

    if lines.is_empty() {
        None
    } else {
        Some(format!("Content Preferences:\n{}", lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CardSource, Column};

    fn board(columns: Vec<(&str, Vec<&str>)>) -> BoardSnapshot {
        let mut board = BoardSnapshot::default();
        for (name, titles) in columns {
            let mut column = Column {
                id: name.to_lowercase(),
                name: name.to_string(),
                ..Default::default()
            };
            for title in titles {
                let id = format!("{}-{}", name, title);
                column.card_ids.push(id.clone());
                board.cards.push(Card {
                    id,
                    title: title.to_string(),
                    source: CardSource::Ai,
                    ..Default::default()
                });
            }
            board.columns.push(column);
        }
        board
    }

    #[test]
    fn test_small_board_has_no_context() {
        let board = board(vec![("Liked", vec!["Pad thai"]), ("Rejected", vec!["Tacos"])]);
        assert!(build_feedback_context(&board, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_neutral_board_has_no_context() {
        let board = board(vec![("Stuff", vec!["A", "B", "C"])]);
        assert!(build_feedback_context(&board, &EngineConfig::default()).is_none());
    }

    #[test]
    fn test_triage_context_sections_in_order() {
        let board = board(vec![
            ("Liked", vec!["Thai curry", "Pad thai", "Thai basil"]),
            ("Rejected", vec!["Beef tacos", "Fish tacos"]),
        ]);
        let context = build_feedback_context(&board, &EngineConfig::default()).unwrap();

        let topology = context.find("triage").unwrap();
        let columns = context.find("\"Liked\"").unwrap();
        let prefs = context.find("Content Preferences").unwrap();
        assert!(topology < columns && columns < prefs);
        assert!(context.contains("AVOID (frequently rejected): Mexican (2)"));
        assert!(context.contains("PREFER (frequently kept): Thai (3)"));
        assert!(!context.contains("WARNING"));
    }

    #[test]
    fn test_rejection_ratio_warning() {
        let board = board(vec![("Love", vec!["Soup"]), ("Nope", vec!["A", "B", "C"])]);
        let context = build_feedback_context(&board, &EngineConfig::default()).unwrap();
        assert!(context.contains("WARNING: the user rejected 3 cards but kept only 1"));
    }
}
