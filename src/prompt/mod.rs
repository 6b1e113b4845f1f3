//! Prompt assembly
//!
//! Prompts are built as ordered lists of named sections and joined once at
//! the end. Section order is part of the contract: the user's instruction
//! text always comes last among the builder's sections so it carries the
//! most recency weight; research results are appended after it.

pub mod board_view;
pub mod generate;
pub mod modify;
pub mod movement;
pub mod research;
pub mod unified;

pub use generate::build_generate_prompt;
pub use modify::build_modify_prompt;
pub use movement::build_move_prompt;
pub use research::{append_research, fetch_research, needs_web_research};
pub use unified::build_unified_prompt;

use crate::board::{BoardSnapshot, Card};
use crate::core::config::EngineConfig;
use crate::instruction::{Capabilities, Instruction, ResolvedColumns};
use crate::llm::ChatMessage;

/// Section names shared by every prompt variant
pub mod sections {
    pub const ROLE: &str = "role";
    pub const OUTPUT: &str = "output";
    pub const RULES: &str = "rules";
    pub const RESTRICTIONS: &str = "restrictions";
    pub const STEPS: &str = "steps";
    pub const COLUMNS: &str = "columns";
    pub const CHANNEL: &str = "channel";
    pub const TAGS: &str = "tags";
    pub const BOARD: &str = "board";
    pub const FEEDBACK: &str = "feedback";
    pub const MEMBERS: &str = "members";
    pub const CARDS: &str = "cards";
    pub const INSTRUCTIONS: &str = "instructions";
    pub const RESEARCH: &str = "research";
}

/// One named block of prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSection {
    pub name: &'static str,
    pub body: String,
}

/// Ordered sections rendered into a single message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptDocument {
    sections: Vec<PromptSection>,
}

impl PromptDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section; blank bodies are skipped
    pub fn push(&mut self, name: &'static str, body: impl Into<String>) -> &mut Self {
        let body = body.into();
        if !body.trim().is_empty() {
            self.sections.push(PromptSection { name, body });
        }
        self
    }

    pub fn push_opt(&mut self, name: &'static str, body: Option<String>) -> &mut Self {
        if let Some(body) = body {
            self.push(name, body);
        }
        self
    }

    pub fn section(&self, name: &str) -> Option<&PromptSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Section names in order
    pub fn names(&self) -> Vec<&'static str> {
        self.sections.iter().map(|s| s.name).collect()
    }

    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.body.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// System and user documents for one LLM call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPair {
    pub system: PromptDocument,
    pub user: PromptDocument,
}

impl PromptPair {
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.render()),
            ChatMessage::user(self.user.render()),
        ]
    }
}

/// Everything a prompt builder reads
pub struct PromptContext<'a> {
    pub instruction: &'a Instruction,
    pub board: &'a BoardSnapshot,
    pub columns: &'a ResolvedColumns,
    pub capabilities: Capabilities,
    pub feedback: Option<&'a str>,
    pub card_count: usize,
    pub config: &'a EngineConfig,
}

impl<'a> PromptContext<'a> {
    /// Capabilities that may actually appear in output
    ///
    /// Assignment additionally requires members to assign to.
    pub fn output_capabilities(&self) -> Capabilities {
        Capabilities {
            allow_assignment: self.capabilities.allow_assignment && !self.board.members.is_empty(),
            ..self.capabilities
        }
    }

    /// Cards in the given columns, minus those this instruction already processed
    pub fn actionable_cards(&self, column_ids: &[String]) -> Vec<&'a Card> {
        let board: &'a BoardSnapshot = self.board;
        let instruction_id = self.instruction.id.as_str();
        let skip_processed = self.config.skip_processed_cards;
        column_ids
            .iter()
            .flat_map(|id| board.cards_in(id))
            .filter(|card| !(skip_processed && card.was_processed_by(instruction_id)))
            .collect()
    }
}
