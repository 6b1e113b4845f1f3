//! Core type definitions and small text helpers used throughout the codebase

/// Identifier of a column on a board
pub type ColumnId = String;

/// Identifier of a card
pub type CardId = String;

/// Identifier of a task attached to a card
pub type TaskId = String;

/// Identifier of a channel member
pub type MemberId = String;

/// Identifier of an instruction (shroom)
pub type InstructionId = String;

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate and mark the cut with an ellipsis
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let cut = truncate_chars(trimmed, max_chars);
    if cut.len() < trimmed.len() {
        format!("{}...", cut.trim_end())
    } else {
        cut.to_string()
    }
}

/// Collapse every whitespace run (including newlines) into a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
