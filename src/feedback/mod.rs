//! Behavioral feedback inferred from current card placement
//!
//! Column names are classified into sentiments, which in turn drive board
//! topology, AI acceptance, content themes and drift detection. Everything
//! is computed from a single snapshot; no history is required.

pub mod context;
pub mod drift;
pub mod effectiveness;
pub mod keywords;
pub mod sentiment;
pub mod themes;

pub use context::build_feedback_context;
pub use drift::{detect_drift, DriftInsight, InsightKind, Severity};
pub use effectiveness::{measure_effectiveness, Effectiveness};
pub use sentiment::{classify_column, classify_topology, BoardTopology, ColumnRole, ColumnSentiment};
pub use themes::{extract_themes, ThemeMatch};

use crate::board::{BoardSnapshot, Card};
use crate::core::config::EngineConfig;
use serde::Serialize;

/// Everything the analyzer can say about a board, in one serializable report
#[derive(Debug, Clone, Serialize)]
pub struct BoardAnalysis {
    pub columns: Vec<ColumnRole>,
    pub topology: BoardTopology,
    pub effectiveness: Effectiveness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceptance_rate: Option<f64>,
    pub themes: Vec<ThemeMatch>,
    pub insights: Vec<DriftInsight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_context: Option<String>,
}

/// Run every analyzer over a board
pub fn analyze_board(board: &BoardSnapshot, config: &EngineConfig) -> BoardAnalysis {
    let columns = sentiment::column_roles(board);
    let sentiments: Vec<ColumnSentiment> = columns.iter().map(|c| c.sentiment).collect();
    let effectiveness = measure_effectiveness(board);
    let cards: Vec<&Card> = board.placed_cards().into_iter().map(|(_, card)| card).collect();

    BoardAnalysis {
        topology: classify_topology(&sentiments),
        columns,
        acceptance_rate: effectiveness.acceptance_rate(),
        effectiveness,
        themes: extract_themes(&cards, config),
        insights: detect_drift(board, config),
        feedback_context: build_feedback_context(board, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;

    #[test]
    fn test_analyze_empty_board() {
        let board = BoardSnapshot {
            columns: vec![Column {
                id: "inbox".into(),
                name: "Inbox".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let analysis = analyze_board(&board, &EngineConfig::default());
        assert_eq!(analysis.topology, BoardTopology::Unknown);
        assert_eq!(analysis.columns[0].sentiment, ColumnSentiment::Inbox);
        assert!(analysis.acceptance_rate.is_none());
        assert!(analysis.feedback_context.is_none());
        assert!(analysis.insights.is_empty());
    }
}
