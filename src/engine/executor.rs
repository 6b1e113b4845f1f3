//! Instruction execution
//!
//! One execution runs: resolve columns, classify capabilities, analyze
//! feedback, build the prompt, optionally research, complete, parse and
//! validate. The board is never written; the result describes what the
//! caller should apply.

use crate::board::BoardSnapshot;
use crate::core::config::{EngineConfig, MultiStepMode};
use crate::core::error::{EngineError, Result};
use crate::core::types::{CardId, ColumnId};
use crate::engine::fallback::fallback_result;
use crate::engine::hooks::{dispatch, ExecutionEvent, ExecutionHook};
use crate::engine::result::{ExecutionResult, MultiStepResult};
use crate::engine::validate::ReferenceValidator;
use crate::feedback::{analyze_board, build_feedback_context, BoardAnalysis};
use crate::instruction::{
    parse_capabilities, resolve_columns, Capabilities, Instruction, InstructionAction,
    InstructionStep, InstructionTarget, ResolvedColumns,
};
use crate::llm::parser::{parse_generate, parse_modify, parse_move, parse_unified};
use crate::llm::LanguageModel;
use crate::prompt::unified::step_card_count;
use crate::prompt::{
    append_research, build_generate_prompt, build_modify_prompt, build_move_prompt,
    build_unified_prompt, fetch_research, PromptContext, PromptPair,
};
use ahash::AHashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Runs instructions against board snapshots
pub struct InstructionEngine {
    config: EngineConfig,
    llm: Option<Arc<dyn LanguageModel>>,
    hooks: Vec<Arc<dyn ExecutionHook>>,
    /// Hook tasks spawned by earlier executions and not yet reaped
    pending_hooks: Mutex<Vec<JoinHandle<()>>>,
}

impl InstructionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            llm: None,
            hooks: Vec::new(),
            pending_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Register a hook fired after every successful execution
    pub fn with_hook(mut self, hook: Arc<dyn ExecutionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Feedback analysis of a board, without any model call
    pub fn analyze(&self, board: &BoardSnapshot) -> BoardAnalysis {
        analyze_board(board, &self.config)
    }

    /// Execute one instruction
    ///
    /// Fails with `NoLlmConfigured` before any prompt work when no model is
    /// set, and with `LlmError` when the completion call fails. Malformed
    /// model output is not an error; it yields empty collections.
    pub async fn execute(&self, instruction: &Instruction, board: &BoardSnapshot) -> Result<ExecutionResult> {
        let llm = self.llm.as_deref().ok_or(EngineError::NoLlmConfigured)?;
        instruction.validate()?;

        let started = Instant::now();
        tracing::info!(
            instruction = %instruction.id,
            board = %board.id,
            action = instruction.action.as_str(),
            steps = instruction.steps.len(),
            "Executing instruction"
        );

        let columns = resolve_columns(instruction, board);
        let capabilities = parse_capabilities(&instruction.instructions_text);
        let feedback = if instruction.actions().contains(&InstructionAction::Generate) {
            build_feedback_context(board, &self.config)
        } else {
            None
        };

        let research = fetch_research(llm, &instruction.instructions_text, &self.config).await;
        let inputs = StepInputs {
            capabilities,
            feedback: feedback.as_deref(),
            research: research.as_deref(),
        };

        let result = if instruction.is_multi_step() {
            match self.config.multi_step_mode {
                MultiStepMode::Unified => self.run_unified(llm, instruction, board, &columns, inputs).await?,
                MultiStepMode::Sequential => self.run_sequential(llm, instruction, board, inputs).await?,
            }
        } else {
            self.run_single(llm, instruction, board, &columns, inputs).await?
        };

        tracing::info!(
            instruction = %instruction.id,
            action = result.action_name(),
            items = result.item_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Instruction finished"
        );

        let handles = dispatch(
            &self.hooks,
            ExecutionEvent {
                instruction_id: instruction.id.clone(),
                board_id: board.id.clone(),
                result: result.clone(),
            },
        );
        if let Ok(mut pending) = self.pending_hooks.lock() {
            pending.retain(|handle| !handle.is_finished());
            pending.extend(handles);
        }
        Ok(result)
    }

    /// Wait up to `timeout` for hook tasks spawned by earlier executions
    ///
    /// Execution itself never waits on hooks; short-lived callers use this
    /// before dropping their runtime. Returns whether every hook finished.
    pub async fn wait_for_hooks(&self, timeout: Duration) -> bool {
        let handles = self
            .pending_hooks
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default();
        if handles.is_empty() {
            return true;
        }

        let count = handles.len();
        let finished = tokio::time::timeout(timeout, async {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "Execution hook task aborted");
                }
            }
        })
        .await
        .is_ok();
        if !finished {
            tracing::warn!(hooks = count, "Execution hooks still running after grace period");
        }
        finished
    }

    /// Execute, substituting canned content when the model is unavailable
    ///
    /// Configuration and transport errors, and generate runs that produced no
    /// cards, yield the fallback result. Invalid instructions still fail.
    pub async fn execute_or_fallback(&self, instruction: &Instruction, board: &BoardSnapshot) -> Result<ExecutionResult> {
        match self.execute(instruction, board).await {
            Ok(ExecutionResult::Generate { cards }) if cards.is_empty() => {
                tracing::warn!(instruction = %instruction.id, "Model generated no cards, using fallback ideas");
                Ok(fallback_result(instruction))
            }
            Ok(result) => Ok(result),
            Err(e) if e.is_configuration() || matches!(e, EngineError::LlmError(_)) => {
                tracing::warn!(instruction = %instruction.id, error = %e, "Execution failed, using fallback result");
                Ok(fallback_result(instruction))
            }
            Err(e) => Err(e),
        }
    }

    /// Cards a modify may touch: placed in a target column and not yet
    /// processed by this instruction
    fn modifiable_cards(&self, instruction: &Instruction, board: &BoardSnapshot, column_ids: &[ColumnId]) -> AHashSet<CardId> {
        column_ids
            .iter()
            .flat_map(|id| board.cards_in(id))
            .filter(|card| !(self.config.skip_processed_cards && card.was_processed_by(&instruction.id)))
            .map(|card| card.id.clone())
            .collect()
    }

    async fn complete(&self, llm: &dyn LanguageModel, mut prompt: PromptPair, research: Option<&str>) -> Result<String> {
        append_research(&mut prompt, research);
        let completion = llm.complete(&prompt.messages()).await?;
        tracing::debug!(chars = completion.content.len(), "Received completion");
        Ok(completion.content)
    }

    async fn run_single(
        &self,
        llm: &dyn LanguageModel,
        instruction: &Instruction,
        board: &BoardSnapshot,
        columns: &ResolvedColumns,
        inputs: StepInputs<'_>,
    ) -> Result<ExecutionResult> {
        let card_count = self.config.card_count(instruction.card_count);
        let ctx = PromptContext {
            instruction,
            board,
            columns,
            capabilities: inputs.capabilities,
            feedback: inputs.feedback,
            card_count,
            config: &self.config,
        };
        let output_capabilities = ctx.output_capabilities();

        let prompt = match instruction.action {
            InstructionAction::Generate => build_generate_prompt(&ctx),
            InstructionAction::Modify => build_modify_prompt(&ctx),
            InstructionAction::Move => build_move_prompt(&ctx),
        };
        let text = self.complete(llm, prompt, inputs.research).await?;

        let modifiable = match instruction.action {
            InstructionAction::Modify => self.modifiable_cards(instruction, board, &columns.target_column_ids),
            _ => AHashSet::new(),
        };
        let validator = ReferenceValidator::new(board, columns.target_column_ids.clone(), modifiable);

        Ok(match instruction.action {
            InstructionAction::Generate => ExecutionResult::Generate {
                cards: validator.drafts(parse_generate(&text, card_count, &output_capabilities)),
            },
            InstructionAction::Modify => ExecutionResult::Modify {
                cards: validator.patches(parse_modify(&text, &output_capabilities)),
            },
            InstructionAction::Move => ExecutionResult::Move {
                moves: validator.moves(parse_move(&text)),
            },
        })
    }

    /// All steps answered by one completion
    async fn run_unified(
        &self,
        llm: &dyn LanguageModel,
        instruction: &Instruction,
        board: &BoardSnapshot,
        columns: &ResolvedColumns,
        inputs: StepInputs<'_>,
    ) -> Result<ExecutionResult> {
        let mut ctx = PromptContext {
            instruction,
            board,
            columns,
            capabilities: inputs.capabilities,
            feedback: inputs.feedback,
            card_count: 0,
            config: &self.config,
        };
        let card_count: usize = instruction
            .steps
            .iter()
            .filter(|s| s.action == InstructionAction::Generate)
            .map(|s| step_card_count(&ctx, s))
            .sum();
        ctx.card_count = card_count;
        let output_capabilities = ctx.output_capabilities();

        let prompt = build_unified_prompt(&ctx);
        let text = self.complete(llm, prompt, inputs.research).await?;
        let parsed = parse_unified(&text, &instruction.actions(), ctx.card_count, &output_capabilities);

        let generate_columns = step_columns(board, &instruction.steps, InstructionAction::Generate);
        let modify_columns = step_columns(board, &instruction.steps, InstructionAction::Modify);
        let validator = ReferenceValidator::new(
            board,
            generate_columns,
            self.modifiable_cards(instruction, board, &modify_columns),
        );
        Ok(ExecutionResult::MultiStep(validator.multi_step(parsed)))
    }

    /// Legacy path: one completion per step, results merged in step order
    async fn run_sequential(
        &self,
        llm: &dyn LanguageModel,
        instruction: &Instruction,
        board: &BoardSnapshot,
        inputs: StepInputs<'_>,
    ) -> Result<ExecutionResult> {
        let mut merged = MultiStepResult::for_actions(&instruction.actions());

        for (index, step) in instruction.steps.iter().enumerate() {
            tracing::debug!(step = index + 1, action = step.action.as_str(), "Running step");
            let step_instruction = step_instruction(instruction, step);
            let columns = resolve_columns(&step_instruction, board);
            let step_inputs = StepInputs {
                feedback: inputs.feedback.filter(|_| step.action == InstructionAction::Generate),
                ..inputs
            };
            let result = self
                .run_single(llm, &step_instruction, board, &columns, step_inputs)
                .await?;

            match result {
                ExecutionResult::Generate { cards } => merged.generated.get_or_insert_with(Vec::new).extend(cards),
                ExecutionResult::Modify { cards } => merged.modified.get_or_insert_with(Vec::new).extend(cards),
                ExecutionResult::Move { moves } => merged.moved.get_or_insert_with(Vec::new).extend(moves),
                ExecutionResult::MultiStep(_) => {}
            }
        }
        Ok(ExecutionResult::MultiStep(merged))
    }
}

/// Per-execution inputs shared by every completion of one run
#[derive(Clone, Copy)]
struct StepInputs<'a> {
    capabilities: Capabilities,
    feedback: Option<&'a str>,
    /// Rendered web research, fetched once for the whole execution
    research: Option<&'a str>,
}

/// Single-action instruction equivalent to one step
fn step_instruction(instruction: &Instruction, step: &InstructionStep) -> Instruction {
    let text = if step.description.trim().is_empty() {
        instruction.instructions_text.clone()
    } else {
        format!("{}\n\nThis step: {}", instruction.instructions_text.trim(), step.description.trim())
    };
    Instruction {
        id: instruction.id.clone(),
        title: instruction.title.clone(),
        instructions_text: text,
        action: step.action,
        target: InstructionTarget::Column {
            column_id: step.target_column_id.clone(),
        },
        context_columns: instruction.context_columns.clone(),
        card_count: step.card_count.or(instruction.card_count),
        steps: Vec::new(),
    }
}

/// Existing step target columns for one action, in step order
fn step_columns(board: &BoardSnapshot, steps: &[InstructionStep], action: InstructionAction) -> Vec<ColumnId> {
    let mut columns: Vec<ColumnId> = Vec::new();
    for step in steps.iter().filter(|s| s.action == action) {
        if board.column(&step.target_column_id).is_some() && !columns.contains(&step.target_column_id) {
            columns.push(step.target_column_id.clone());
        }
    }
    columns
}
