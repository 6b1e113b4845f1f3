//! Shroom Engine - Command line entry point
//!
//! `run` executes one instruction against a board snapshot and prints the
//! result JSON. `analyze` prints the feedback analysis of a board.

use shroom_engine::core::error::Result;
use shroom_engine::engine::LoggingHook;
use shroom_engine::llm::client::LlmClient;
use shroom_engine::{BoardSnapshot, EngineConfig, Instruction, InstructionEngine};

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// How long `run` waits for execution hooks before exiting
const HOOK_GRACE: Duration = Duration::from_secs(1);

/// Shroom instruction automation engine
#[derive(Parser, Debug)]
#[command(name = "shroom")]
#[command(about = "Run AI instructions against kanban board snapshots")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute one instruction and print the result JSON
    Run {
        /// Board snapshot JSON file
        #[arg(long)]
        board: PathBuf,

        /// Instruction JSON file
        #[arg(long)]
        instruction: PathBuf,

        /// Engine config TOML file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Return canned ideas instead of failing when the model is unavailable
        #[arg(long)]
        fallback: bool,
    },
    /// Print the feedback analysis of a board
    Analyze {
        /// Board snapshot JSON file
        #[arg(long)]
        board: PathBuf,

        /// Engine config TOML file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shroom_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run {
            board,
            instruction,
            config,
            fallback,
        } => {
            let config = load_config(config.as_deref())?;
            let board: BoardSnapshot = read_json(&board)?;
            let instruction: Instruction = read_json(&instruction)?;

            let mut engine = InstructionEngine::new(config).with_hook(Arc::new(LoggingHook));
            match LlmClient::from_env() {
                Ok(client) => engine = engine.with_llm(Arc::new(client)),
                Err(e) => tracing::warn!(error = %e, "LLM client unavailable"),
            }

            let rt = Runtime::new()?;
            let result = rt.block_on(async {
                let result = if fallback {
                    engine.execute_or_fallback(&instruction, &board).await
                } else {
                    engine.execute(&instruction, &board).await
                };
                // Hook tasks die with the runtime
                engine.wait_for_hooks(HOOK_GRACE).await;
                result
            })?;
            print_json(&result)?;
        }
        Command::Analyze { board, config } => {
            let config = load_config(config.as_deref())?;
            let board: BoardSnapshot = read_json(&board)?;
            let analysis = InstructionEngine::new(config).analyze(&board);
            print_json(&analysis)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path),
        None => Ok(EngineConfig::default()),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
