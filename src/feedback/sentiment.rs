//! Column sentiment and board topology inference
//!
//! A column's role is inferred from its name alone. Lexicons are checked in
//! a fixed order; negative is checked before positive so that names like
//! "I dislike this" never match the "like" keyword.

use crate::board::BoardSnapshot;
use crate::core::types::ColumnId;
use serde::Serialize;

/// Inferred semantic role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSentiment {
    Inbox,
    Done,
    Progress,
    Negative,
    Positive,
    Neutral,
}

impl ColumnSentiment {
    /// Columns that represent a final decision about a card
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Positive | Self::Negative | Self::Done)
    }

    /// Cards here count as accepted suggestions
    pub fn is_accepting(&self) -> bool {
        matches!(self, Self::Positive | Self::Done)
    }
}

const INBOX_KEYWORDS: &[&str] = &[
    "inbox", "incoming", "backlog", "unsorted", "to review", "queue", "new ideas", "fresh",
];
const DONE_KEYWORDS: &[&str] = &[
    "done", "complete", "finished", "shipped", "archived", "cooked", "tried",
];
const PROGRESS_KEYWORDS: &[&str] = &[
    "progress", "doing", "working on", "in review", "wip", "started", "this week", "next up",
    "planned",
];
const NEGATIVE_KEYWORDS: &[&str] = &[
    "dislike", "reject", "not for me", "not interested", "nope", "no thanks", "pass", "skip",
    "hate", "meh", "discard", "trash", "declined", "never",
];
const POSITIVE_KEYWORDS: &[&str] = &[
    "like", "love", "favorite", "favourite", "yes", "keep", "approved", "accepted", "save",
    "interested", "good", "great", "want", "yum",
];

/// Lookup order is significant
const SENTIMENT_LEXICONS: &[(ColumnSentiment, &[&str])] = &[
    (ColumnSentiment::Inbox, INBOX_KEYWORDS),
    (ColumnSentiment::Done, DONE_KEYWORDS),
    (ColumnSentiment::Progress, PROGRESS_KEYWORDS),
    (ColumnSentiment::Negative, NEGATIVE_KEYWORDS),
    (ColumnSentiment::Positive, POSITIVE_KEYWORDS),
];

/// Classify a column name into a sentiment
pub fn classify_column(name: &str) -> ColumnSentiment {
    let name = name.to_lowercase();
    SENTIMENT_LEXICONS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(sentiment, _)| *sentiment)
        .unwrap_or(ColumnSentiment::Neutral)
}

/// A column with its inferred sentiment
#[derive(Debug, Clone, Serialize)]
pub struct ColumnRole {
    pub column_id: ColumnId,
    pub name: String,
    pub sentiment: ColumnSentiment,
}

/// Sentiment of every column in board order
pub fn column_roles(board: &BoardSnapshot) -> Vec<ColumnRole> {
    board
        .columns
        .iter()
        .map(|c| ColumnRole {
            column_id: c.id.clone(),
            name: c.name.clone(),
            sentiment: classify_column(&c.name),
        })
        .collect()
}

/// How the board is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardTopology {
    /// Cards progress through stages toward completion
    Workflow,
    /// Cards are sorted into liked and rejected piles
    Triage,
    /// An inbox feeding several outcome columns
    Hybrid,
    Unknown,
}

impl BoardTopology {
    /// Sentence describing the board type for prompts
    pub fn describe(&self) -> Option<&'static str> {
        match self {
            Self::Workflow => Some(
                "This board is a workflow: cards move through stages from new to in progress to done.",
            ),
            Self::Triage => Some(
                "This board is used for triage: the user sorts cards into columns they like and columns they reject.",
            ),
            Self::Hybrid => Some(
                "This board has an inbox for new cards that the user sorts into several outcome columns.",
            ),
            Self::Unknown => None,
        }
    }
}

/// Classify topology from the set of column sentiments
pub fn classify_topology(sentiments: &[ColumnSentiment]) -> BoardTopology {
    let has = |s: ColumnSentiment| sentiments.contains(&s);
    let terminal = sentiments.iter().filter(|s| s.is_terminal()).count();

    if has(ColumnSentiment::Progress) || (has(ColumnSentiment::Inbox) && has(ColumnSentiment::Done)) {
        BoardTopology::Workflow
    } else if has(ColumnSentiment::Positive) && has(ColumnSentiment::Negative) {
        BoardTopology::Triage
    } else if has(ColumnSentiment::Inbox) && terminal >= 2 {
        BoardTopology::Hybrid
    } else {
        BoardTopology::Unknown
    }
}
