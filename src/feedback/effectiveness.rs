//! Acceptance of AI-generated cards, judged by where they sit now

use crate::board::BoardSnapshot;
use crate::core::config::EngineConfig;
use crate::feedback::sentiment::{classify_column, ColumnSentiment};
use serde::Serialize;

/// Buckets of AI-sourced cards by their current column's sentiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Effectiveness {
    /// In positive or done columns
    pub accepted: usize,
    /// In negative columns
    pub rejected: usize,
    /// Anywhere else (inbox, progress, neutral)
    pub neutral: usize,
}

impl Effectiveness {
    pub fn total(&self) -> usize {
        self.accepted + self.rejected + self.neutral
    }

    /// accepted / total; `None` when there are no AI cards
    pub fn acceptance_rate(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(self.accepted as f64 / total as f64),
        }
    }

    /// Qualitative note, only when the sample is large and the signal clear
    pub fn note(&self, config: &EngineConfig) -> Option<String> {
        if self.total() < config.min_ai_cards_for_effectiveness {
            return None;
        }
        let rate = self.acceptance_rate()?;
        let percent = (rate * 100.0).round() as u32;

        if rate >= config.working_well_rate {
            Some(format!(
                "AI suggestions are working well: {}% of {} AI-generated cards were kept. Continue in a similar direction.",
                percent,
                self.total()
            ))
        } else if rate < config.needs_improvement_rate {
            Some(format!(
                "AI suggestions need improvement: only {}% of {} AI-generated cards were kept ({} rejected). Try a noticeably different direction.",
                percent,
                self.total(),
                self.rejected
            ))
        } else {
            None
        }
    }
}

/// Bucket every placed AI-sourced card by its column's sentiment
pub fn measure_effectiveness(board: &BoardSnapshot) -> Effectiveness {
    let mut effectiveness = Effectiveness::default();
    for (column, card) in board.placed_cards() {
        if !card.is_ai_generated() {
            continue;
        }
        match classify_column(&column.name) {
            s if s.is_accepting() => effectiveness.accepted += 1,
            ColumnSentiment::Negative => effectiveness.rejected += 1,
            _ => effectiveness.neutral += 1,
        }
    }
    effectiveness
}
