//! Canned content returned when no model output is available

use crate::engine::result::{CardDraft, ExecutionResult, MultiStepResult};
use crate::instruction::{Instruction, InstructionAction};
use rand::seq::SliceRandom;

/// Number of canned cards in a fallback generate result
pub const FALLBACK_CARD_COUNT: usize = 5;

const FALLBACK_IDEAS: &[&str] = &[
    "Brainstorm three quick wins",
    "Review what worked last week",
    "Write down one open question",
    "Pick a small experiment to try",
    "Ask a teammate for input",
    "Collect useful links on this topic",
    "Outline the next milestone",
    "List what is blocking progress",
];

const FALLBACK_BODY: &str = "This is a placeholder idea. The AI assistant could not be reached, \
     so no tailored cards were generated for this instruction. Check the AI configuration and run it again.";

/// Five shuffled placeholder cards
pub fn fallback_cards() -> Vec<CardDraft> {
    let mut ideas = FALLBACK_IDEAS.to_vec();
    ideas.shuffle(&mut rand::thread_rng());
    ideas
        .into_iter()
        .take(FALLBACK_CARD_COUNT)
        .map(|title| CardDraft::new(title, FALLBACK_BODY))
        .collect()
}

/// Degraded result for an instruction
///
/// Only generation gets placeholder cards. Modify and move fall back to
/// "nothing to do".
pub fn fallback_result(instruction: &Instruction) -> ExecutionResult {
    if instruction.is_multi_step() {
        let mut multi = MultiStepResult::for_actions(&instruction.actions());
        if let Some(generated) = multi.generated.as_mut() {
            *generated = fallback_cards();
        }
        return ExecutionResult::MultiStep(multi);
    }
    match instruction.action {
        InstructionAction::Generate => ExecutionResult::Generate {
            cards: fallback_cards(),
        },
        action => ExecutionResult::empty(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{InstructionStep, InstructionTarget};

    fn instruction(action: InstructionAction) -> Instruction {
        Instruction::new("i1", "T", "do things", action, InstructionTarget::Board)
    }

    #[test]
    fn test_fallback_cards_unique_and_explained() {
        let cards = fallback_cards();
        assert_eq!(cards.len(), FALLBACK_CARD_COUNT);
        let mut titles: Vec<_> = cards.iter().map(|c| c.title.clone()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), FALLBACK_CARD_COUNT);
        assert!(cards.iter().all(|c| c.initial_message.contains("could not be reached")));
    }

    #[test]
    fn test_fallback_by_action() {
        assert_eq!(fallback_result(&instruction(InstructionAction::Generate)).item_count(), 5);
        assert!(fallback_result(&instruction(InstructionAction::Move)).is_empty());

        let multi = instruction(InstructionAction::Generate).with_steps(vec![InstructionStep {
            action: InstructionAction::Modify,
            target_column_id: "a".into(),
            description: String::new(),
            card_count: None,
        }]);
        assert_eq!(fallback_result(&multi).action_name(), "multi_step");
    }
}
