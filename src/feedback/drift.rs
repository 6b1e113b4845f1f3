//! Preference drift detection
//!
//! Compares what the user said they want (question answers and recorded
//! "User preference:" lines) against where matching cards actually ended up.
//! A stated preference whose cards mostly sit in rejection columns is drift.

use crate::board::BoardSnapshot;
use crate::core::config::EngineConfig;
use crate::feedback::effectiveness::measure_effectiveness;
use crate::feedback::keywords::extract_keywords;
use crate::feedback::sentiment::{classify_column, ColumnSentiment};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PREFERENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*User preference:\s*(.+?)\s*$").expect("valid preference regex")
});

static NEGATIVE_PHRASING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(avoid|don['’]?t|do not|never|without|less|fewer|exclude|no more)\b")
        .expect("valid negation regex")
});

/// Where a preference was stated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceSource {
    QuestionAnswer,
    InstructionHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preference {
    pub text: String,
    pub source: PreferenceSource,
}

impl Preference {
    /// "Avoid X" style preferences; rejecting X is consistent, not drift
    pub fn is_negative(&self) -> bool {
        NEGATIVE_PHRASING.is_match(&self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    PreferenceBehaviorMismatch,
    LowAcceptance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftInsight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub message: String,
    pub evidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
}

/// Collect stated preferences from answered questions and instruction history
pub fn extract_preferences(board: &BoardSnapshot) -> Vec<Preference> {
    let answers = board.questions.iter().filter_map(|q| {
        let answer = q.answer.as_deref()?.trim();
        (!answer.is_empty()).then(|| Preference {
            text: answer.to_string(),
            source: PreferenceSource::QuestionAnswer,
        })
    });

    let history = board.instruction_history.iter().flat_map(|entry| {
        PREFERENCE_LINE
            .captures_iter(entry)
            .filter_map(|caps| caps.get(1))
            .map(|m| Preference {
                text: m.as_str().to_string(),
                source: PreferenceSource::InstructionHistory,
            })
            .collect::<Vec<_>>()
    });

    answers.chain(history).collect()
}

/// Rejection rate at which a mismatch becomes high severity
const HIGH_SEVERITY_RATE: f64 = 0.8;

/// Rejection rate at which a mismatch becomes medium severity
///
/// Two thirds, which reads as 0.7 at one decimal; 2 of 3 rejected is medium.
const MEDIUM_SEVERITY_RATE: f64 = 2.0 / 3.0 - 1e-9;

/// Severity of a preference/behavior mismatch
fn mismatch_severity(rejection_rate: f64) -> Severity {
    if rejection_rate >= HIGH_SEVERITY_RATE {
        Severity::High
    } else if rejection_rate >= MEDIUM_SEVERITY_RATE {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Detect drift between stated preferences and card placement
pub fn detect_drift(board: &BoardSnapshot, config: &EngineConfig) -> Vec<DriftInsight> {
    let placed: Vec<(ColumnSentiment, String)> = board
        .placed_cards()
        .into_iter()
        .map(|(column, card)| {
            let text = format!(
                "{} {} {}",
                card.title,
                card.summary.as_deref().unwrap_or(""),
                card.content()
            )
            .to_lowercase();
            (classify_column(&column.name), text)
        })
        .collect();

    let mut insights = Vec::new();

    for preference in extract_preferences(board) {
        if preference.is_negative() {
            continue;
        }
        let keywords = extract_keywords(&preference.text);
        if keywords.is_empty() {
            continue;
        }

        let matching: Vec<ColumnSentiment> = placed
            .iter()
            .filter(|(_, text)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(sentiment, _)| *sentiment)
            .collect();
        if matching.len() < config.drift_min_matches {
            continue;
        }

        let negative = matching.iter().filter(|s| **s == ColumnSentiment::Negative).count();
        let positive = matching.iter().filter(|s| s.is_accepting()).count();
        let rejection_rate = negative as f64 / matching.len() as f64;
        if rejection_rate < config.drift_rejection_threshold {
            continue;
        }

        tracing::debug!(
            preference = %preference.text,
            negative,
            total = matching.len(),
            "Preference/behavior mismatch"
        );
        insights.push(DriftInsight {
            kind: InsightKind::PreferenceBehaviorMismatch,
            severity: mismatch_severity(rejection_rate),
            message: format!(
                "The user said \"{}\" but rejects most matching cards ({}% rejected). Their stated preference may have changed.",
                preference.text,
                (rejection_rate * 100.0).round() as u32
            ),
            evidence: format!(
                "{} in negative, {} in positive out of {} matching cards",
                negative,
                positive,
                matching.len()
            ),
            preference: Some(preference.text),
        });
    }

    let effectiveness = measure_effectiveness(board);
    if effectiveness.total() >= config.min_ai_cards_for_effectiveness {
        if let Some(rate) = effectiveness.acceptance_rate() {
            if rate <= config.low_acceptance_rate {
                let severity = if rate <= config.critical_acceptance_rate {
                    Severity::High
                } else {
                    Severity::Medium
                };
                insights.push(DriftInsight {
                    kind: InsightKind::LowAcceptance,
                    severity,
                    message: format!(
                        "Only {}% of AI-generated cards were kept.",
                        (rate * 100.0).round() as u32
                    ),
                    evidence: format!(
                        "{} accepted, {} rejected, {} undecided out of {} AI cards",
                        effectiveness.accepted,
                        effectiveness.rejected,
                        effectiveness.neutral,
                        effectiveness.total()
                    ),
                    preference: None,
                });
            }
        }
    }

    insights
}
