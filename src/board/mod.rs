//! Read-only board snapshot
//!
//! The engine receives one snapshot per execution and never mutates it.
//! Column `card_ids` order defines current membership; there is no movement
//! history, so every placement signal is derived from where cards sit now.

use crate::core::types::{CardId, ColumnId, InstructionId, MemberId, TaskId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Snapshot of a board (channel) at execution time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub tag_definitions: Vec<TagDefinition>,
    /// Card records referenced by the columns
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Questions asked to the user about this channel
    #[serde(default)]
    pub questions: Vec<ChannelQuestion>,
    /// Free-text instruction revision notes, newest last
    #[serde(default)]
    pub instruction_history: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    /// Column rules authored by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub card_ids: Vec<CardId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDefinition {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSource {
    #[default]
    Manual,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Note,
    Question,
    AiResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub messages: Vec<CardMessage>,
    #[serde(default)]
    pub task_ids: Vec<TaskId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub processed_by_instructions: AHashMap<InstructionId, serde_json::Value>,
    #[serde(default)]
    pub source: CardSource,
}

impl Card {
    pub fn is_ai_generated(&self) -> bool {
        self.source == CardSource::Ai
    }

    /// Every message concatenated in order
    pub fn content(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Summary if present, otherwise the first message
    pub fn preview_source(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.messages.first().map(|m| m.content.as_str()))
    }

    pub fn was_processed_by(&self, instruction_id: &str) -> bool {
        self.processed_by_instructions.contains_key(instruction_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelQuestion {
    pub id: String,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl BoardSnapshot {
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// All column ids in board order
    pub fn column_ids(&self) -> Vec<ColumnId> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Cards of a column in column order; ids without a card record are skipped
    pub fn cards_in(&self, column_id: &str) -> Vec<&Card> {
        let Some(column) = self.column(column_id) else {
            return Vec::new();
        };
        let index = self.card_index();
        column
            .card_ids
            .iter()
            .filter_map(|id| index.get(id.as_str()).copied())
            .collect()
    }

    /// Every placed card paired with the column it currently sits in
    pub fn placed_cards(&self) -> Vec<(&Column, &Card)> {
        let index = self.card_index();
        self.columns
            .iter()
            .flat_map(|column| {
                column
                    .card_ids
                    .iter()
                    .filter_map(|id| index.get(id.as_str()).map(|card| (column, *card)))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Number of cards currently placed in columns
    pub fn total_cards(&self) -> usize {
        self.placed_cards().len()
    }

    /// Column a card currently sits in
    pub fn column_of(&self, card_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.card_ids.iter().any(|id| id == card_id))
    }

    /// Resolve a member by id or case-insensitive name
    pub fn resolve_member(&self, reference: &str) -> Option<&Member> {
        let wanted = reference.trim();
        self.members
            .iter()
            .find(|m| m.id == wanted)
            .or_else(|| self.members.iter().find(|m| m.name.eq_ignore_ascii_case(wanted)))
    }

    fn card_index(&self) -> AHashMap<&str, &Card> {
        self.cards.iter().map(|c| (c.id.as_str(), c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardSnapshot {
        serde_json::from_str(
            r#"{
                "id": "b1",
                "name": "Dinner ideas",
                "columns": [
                    {"id": "inbox", "name": "Inbox", "cardIds": ["c2", "c1", "ghost"]},
                    {"id": "liked", "name": "Liked", "cardIds": ["c3"]}
                ],
                "cards": [
                    {"id": "c1", "title": "Pad thai", "messages": [{"type": "note", "content": "Rice noodles"}]},
                    {"id": "c2", "title": "Tacos", "summary": "Street style", "source": "ai"},
                    {"id": "c3", "title": "Ramen", "processedByInstructions": {"s1": true}}
                ],
                "members": [{"id": "m1", "name": "Dana"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cards_in_preserves_column_order() {
        let board = board();
        let titles: Vec<_> = board.cards_in("inbox").iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Tacos", "Pad thai"]);
    }

    #[test]
    fn test_total_cards_skips_missing_records() {
        assert_eq!(board().total_cards(), 3);
    }

    #[test]
    fn test_column_of() {
        let board = board();
        assert_eq!(board.column_of("c3").map(|c| c.id.as_str()), Some("liked"));
        assert!(board.column_of("nope").is_none());
    }

    #[test]
    fn test_card_preview_prefers_summary() {
        let board = board();
        assert_eq!(board.card("c2").unwrap().preview_source(), Some("Street style"));
        assert_eq!(board.card("c1").unwrap().preview_source(), Some("Rice noodles"));
        assert!(board.card("c2").unwrap().is_ai_generated());
    }

    #[test]
    fn test_processed_marker() {
        let board = board();
        assert!(board.card("c3").unwrap().was_processed_by("s1"));
        assert!(!board.card("c1").unwrap().was_processed_by("s1"));
    }

    #[test]
    fn test_resolve_member_by_name_or_id() {
        let board = board();
        assert_eq!(board.resolve_member("dana").map(|m| m.id.as_str()), Some("m1"));
        assert_eq!(board.resolve_member("m1").map(|m| m.name.as_str()), Some("Dana"));
        assert!(board.resolve_member("Eli").is_none());
    }
}
