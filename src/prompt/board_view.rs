//! Text renderings of board state shared by the prompt builders

use crate::board::{BoardSnapshot, Card, Column, Member, TaskStatus};
use crate::core::types::excerpt;

/// Channel name, description, and any answered channel questions
pub fn render_channel(board: &BoardSnapshot) -> String {
    let mut out = format!("## Channel\nName: {}", board.name);
    if !board.description.trim().is_empty() {
        out.push_str(&format!("\nDescription: {}", board.description.trim()));
    }

    let answered: Vec<_> = board
        .questions
        .iter()
        .filter_map(|q| q.answer.as_deref().map(|a| (q.question.as_str(), a)))
        .filter(|(_, a)| !a.trim().is_empty())
        .collect();
    if !answered.is_empty() {
        out.push_str("\n\nWhat the user told us about this channel:");
        for (question, answer) in answered {
            out.push_str(&format!("\n- Q: {}\n  A: {}", question.trim(), answer.trim()));
        }
    }
    out
}

/// Card titles and short excerpts for each context column
pub fn render_board_state(board: &BoardSnapshot, column_ids: &[String], excerpt_chars: usize) -> Option<String> {
    let columns: Vec<&Column> = column_ids.iter().filter_map(|id| board.column(id)).collect();
    if columns.is_empty() {
        return None;
    }

    let mut out = String::from("## Current Board");
    for column in columns {
        let cards = board.cards_in(&column.id);
        out.push_str(&format!("\n\n### {} ({} cards)", column.name, cards.len()));
        if cards.is_empty() {
            out.push_str("\n(empty)");
        }
        for card in cards {
            match card.preview_source().map(|text| excerpt(text, excerpt_chars)) {
                Some(preview) if !preview.is_empty() => {
                    out.push_str(&format!("\n- {}: {}", card.title, preview));
                }
                _ => out.push_str(&format!("\n- {}", card.title)),
            }
        }
    }
    Some(out)
}

/// Full content of one card, optionally with its existing tasks
pub fn render_card_full(board: &BoardSnapshot, card: &Card, include_tasks: bool) -> String {
    let mut out = format!("### Card (id: {})\nTitle: {}", card.id, card.title);
    if let Some(column) = board.column_of(&card.id) {
        out.push_str(&format!("\nColumn: {} (id: {})", column.name, column.id));
    }
    if !card.tags.is_empty() {
        out.push_str(&format!("\nTags: {}", card.tags.join(", ")));
    }

    let content = card.content();
    if content.is_empty() {
        out.push_str("\nContent: (none)");
    } else {
        out.push_str(&format!("\nContent:\n{}", content));
    }

    if include_tasks {
        let tasks: Vec<_> = card.task_ids.iter().filter_map(|id| board.task(id)).collect();
        if !tasks.is_empty() {
            out.push_str("\nExisting tasks:");
            for task in tasks {
                let mark = if task.status == TaskStatus::Done { "x" } else { " " };
                out.push_str(&format!("\n- [{}] {}", mark, task.title));
            }
        }
    }
    out
}

/// Team roster for assignment
pub fn render_members(members: &[Member]) -> Option<String> {
    if members.is_empty() {
        return None;
    }
    let mut out = String::from("## Team Members\nAssign cards using these names:");
    for member in members {
        out.push_str(&format!("\n- {}", member.name));
        if let Some(role) = member.role.as_deref().filter(|r| !r.trim().is_empty()) {
            out.push_str(&format!(" ({})", role.trim()));
        }
        if let Some(description) = member.role_description.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push_str(&format!(": {}", description.trim()));
        }
    }
    Some(out)
}

/// One line per column with its rules
pub fn render_column_rules(column: &Column) -> String {
    match column.instructions.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(rules) => format!("- \"{}\" (id: {}): {}", column.name, column.id, rules),
        None => format!("- \"{}\" (id: {}): no specific rules", column.name, column.id),
    }
}

/// Column display name, falling back to its id
pub fn column_label(board: &BoardSnapshot, column_id: &str) -> String {
    board
        .column(column_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| column_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CardMessage, ChannelQuestion, MessageType, Task};

    fn sample_board() -> BoardSnapshot {
        BoardSnapshot {
            id: "b1".into(),
            name: "Dinner Ideas".into(),
            description: "Weeknight meals".into(),
            columns: vec![
                Column {
                    id: "inbox".into(),
                    name: "Inbox".into(),
                    instructions: None,
                    card_ids: vec!["c1".into()],
                },
                Column {
                    id: "done".into(),
                    name: "Done".into(),
                    instructions: Some("Only cooked meals".into()),
                    card_ids: vec![],
                },
            ],
            cards: vec![Card {
                id: "c1".into(),
                title: "Pad Thai".into(),
                messages: vec![CardMessage {
                    kind: MessageType::Note,
                    content: "x".repeat(400),
                }],
                task_ids: vec!["t1".into()],
                ..Default::default()
            }],
            tasks: vec![Task {
                id: "t1".into(),
                title: "Buy noodles".into(),
                status: TaskStatus::Done,
            }],
            questions: vec![ChannelQuestion {
                id: "q1".into(),
                question: "Any allergies?".into(),
                answer: Some("Peanuts".into()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_channel_includes_answers() {
        let text = render_channel(&sample_board());
        assert!(text.contains("Name: Dinner Ideas"));
        assert!(text.contains("A: Peanuts"));
    }

    #[test]
    fn test_board_state_excerpts() {
        let board = sample_board();
        let text = render_board_state(&board, &board.column_ids(), 150).unwrap();
        assert!(text.contains("### Inbox (1 cards)"));
        assert!(text.contains(&format!("- Pad Thai: {}...", "x".repeat(150))));
        assert!(!text.contains(&"x".repeat(151)));
        assert!(text.contains("### Done (0 cards)\n(empty)"));
    }

    #[test]
    fn test_board_state_none_without_columns() {
        assert!(render_board_state(&sample_board(), &[], 150).is_none());
    }

    #[test]
    fn test_card_full_tasks_optional() {
        let board = sample_board();
        let card = board.card("c1").unwrap();
        assert!(render_card_full(&board, card, true).contains("- [x] Buy noodles"));
        assert!(!render_card_full(&board, card, false).contains("Buy noodles"));
    }

    #[test]
    fn test_column_rules() {
        let board = sample_board();
        assert_eq!(
            render_column_rules(board.column("done").unwrap()),
            "- \"Done\" (id: done): Only cooked meals"
        );
        assert!(render_column_rules(board.column("inbox").unwrap()).ends_with("no specific rules"));
    }
}
