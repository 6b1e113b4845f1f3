//! Engine configuration with documented constants
//!
//! All tunable thresholds are collected here with explanations of their
//! purpose and how they interact with each other.

use crate::core::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How instructions with several declared steps are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiStepMode {
    /// One prompt, one LLM call, one JSON object covering every step
    Unified,
    /// One LLM call per step, run in declaration order, results merged
    Sequential,
}

impl Default for MultiStepMode {
    fn default() -> Self {
        Self::Unified
    }
}

/// Configuration for the instruction engine
///
/// These values shape how much board state reaches the model and when
/// feedback signals are considered strong enough to mention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === GENERATION ===
    /// Cards requested from a generate action when the instruction omits a count
    pub default_card_count: usize,

    /// Upper bound on cards a single generate action may request
    ///
    /// Larger counts are clamped before the prompt is built, so the
    /// parser cap and the prompt always agree.
    pub max_card_count: usize,

    // === PROMPT RENDERING ===
    /// Characters of summary (or first message) shown per card in board state
    pub summary_excerpt_chars: usize,

    /// Characters of card content scanned for content themes
    pub theme_content_chars: usize,

    /// Characters of the instruction text used as a web search query
    pub web_query_chars: usize,

    // === FEEDBACK ===
    /// Minimum cards on the board before any feedback context is built
    pub min_cards_for_feedback: usize,

    /// Minimum AI-sourced cards before an effectiveness note is emitted
    pub min_ai_cards_for_effectiveness: usize,

    /// Acceptance rate at or above which AI suggestions are "working well"
    pub working_well_rate: f64,

    /// Acceptance rate below which AI suggestions "need improvement"
    pub needs_improvement_rate: f64,

    /// Floor on matches before a content theme qualifies
    pub theme_min_matches: usize,

    /// Share of cards a content theme must match (combined with the floor via max)
    pub theme_min_share: f64,

    /// Number of themes reported per card group
    pub max_themes: usize,

    /// Negative:positive card ratio that triggers an over-rejection warning
    pub negative_ratio_warning: f64,

    // === DRIFT ===
    /// Minimum cards matching a preference before drift is considered
    pub drift_min_matches: usize,

    /// Share of matching cards in negative columns that counts as drift
    pub drift_rejection_threshold: f64,

    /// Acceptance rate at or below which a low-acceptance insight is raised
    pub low_acceptance_rate: f64,

    /// Acceptance rate at or below which the low-acceptance insight is high severity
    pub critical_acceptance_rate: f64,

    // === EXECUTION ===
    /// Multi-step execution strategy
    pub multi_step_mode: MultiStepMode,

    /// Exclude cards already marked as processed by the running instruction
    /// from modify targets
    pub skip_processed_cards: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_card_count: 5,
            max_card_count: 20,

            summary_excerpt_chars: 150,
            theme_content_chars: 500,
            web_query_chars: 300,

            min_cards_for_feedback: 3,
            min_ai_cards_for_effectiveness: 5,
            working_well_rate: 0.7,
            needs_improvement_rate: 0.3,
            theme_min_matches: 2,
            theme_min_share: 0.3,
            max_themes: 5,
            negative_ratio_warning: 3.0,

            drift_min_matches: 2,
            drift_rejection_threshold: 0.6,
            low_acceptance_rate: 0.3,
            critical_acceptance_rate: 0.15,

            multi_step_mode: MultiStepMode::Unified,
            skip_processed_cards: true,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| EngineError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate().map_err(EngineError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.default_card_count == 0 || self.default_card_count > self.max_card_count {
            return Err(format!(
                "default_card_count ({}) must be between 1 and max_card_count ({})",
                self.default_card_count, self.max_card_count
            ));
        }

        if self.needs_improvement_rate >= self.working_well_rate {
            return Err(format!(
                "needs_improvement_rate ({}) should be < working_well_rate ({})",
                self.needs_improvement_rate, self.working_well_rate
            ));
        }

        if self.critical_acceptance_rate > self.low_acceptance_rate {
            return Err(format!(
                "critical_acceptance_rate ({}) should be <= low_acceptance_rate ({})",
                self.critical_acceptance_rate, self.low_acceptance_rate
            ));
        }

        let rates = [
            self.working_well_rate,
            self.needs_improvement_rate,
            self.theme_min_share,
            self.drift_rejection_threshold,
            self.low_acceptance_rate,
            self.critical_acceptance_rate,
        ];
        if rates.iter().any(|r| !(0.0..=1.0).contains(r)) {
            return Err("Rates and shares must lie within 0.0..=1.0".into());
        }

        if self.summary_excerpt_chars == 0 || self.web_query_chars == 0 {
            return Err("Excerpt lengths must be positive".into());
        }

        Ok(())
    }

    /// Requested card count, defaulted and clamped to the configured bounds
    pub fn card_count(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_card_count)
            .clamp(1, self.max_card_count)
    }
}
