//! Post-execution hooks
//!
//! Hooks carry the side effects of a successful execution (usage accounting,
//! notifications). They run on spawned tasks after the result is final and
//! are never awaited by the engine; failures are only logged. Fallback
//! results do not fire hooks.

use crate::core::error::Result;
use crate::engine::result::ExecutionResult;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What a hook learns about a finished execution
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    pub instruction_id: String,
    pub board_id: String,
    pub result: ExecutionResult,
}

#[async_trait]
pub trait ExecutionHook: Send + Sync {
    fn name(&self) -> &str;

    async fn on_executed(&self, event: &ExecutionEvent) -> Result<()>;
}

/// Hook that records every execution in the log
pub struct LoggingHook;

#[async_trait]
impl ExecutionHook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    async fn on_executed(&self, event: &ExecutionEvent) -> Result<()> {
        tracing::info!(
            instruction = %event.instruction_id,
            board = %event.board_id,
            action = event.result.action_name(),
            items = event.result.item_count(),
            "Instruction executed"
        );
        Ok(())
    }
}

/// Spawn every hook for one event
///
/// Must be called from within a tokio runtime; otherwise hooks are skipped
/// with a warning. The returned handles may be dropped.
pub fn dispatch(hooks: &[Arc<dyn ExecutionHook>], event: ExecutionEvent) -> Vec<JoinHandle<()>> {
    if hooks.is_empty() {
        return Vec::new();
    }
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::warn!(hooks = hooks.len(), "No tokio runtime, skipping execution hooks");
        return Vec::new();
    };

    let event = Arc::new(event);
    hooks
        .iter()
        .map(|hook| {
            let hook = Arc::clone(hook);
            let event = Arc::clone(&event);
            runtime.spawn(async move {
                if let Err(e) = hook.on_executed(&event).await {
                    tracing::warn!(hook = hook.name(), error = %e, "Execution hook failed");
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl ExecutionHook for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn on_executed(&self, event: &ExecutionEvent) -> Result<()> {
            self.0.fetch_add(event.result.item_count() + 1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ExecutionHook for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn on_executed(&self, _event: &ExecutionEvent) -> Result<()> {
            Err(EngineError::LlmError("notification sink down".into()))
        }
    }

    fn event() -> ExecutionEvent {
        ExecutionEvent {
            instruction_id: "i1".into(),
            board_id: "b1".into(),
            result: ExecutionResult::Move { moves: vec![] },
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_all_hooks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let hooks: Vec<Arc<dyn ExecutionHook>> = vec![
            Arc::new(Failing),
            Arc::new(Counting(Arc::clone(&counter))),
            Arc::new(LoggingHook),
        ];
        let handles = dispatch(&hooks, event());
        assert_eq!(handles.len(), 3);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_without_runtime_is_noop() {
        let hooks: Vec<Arc<dyn ExecutionHook>> = vec![Arc::new(LoggingHook)];
        assert!(dispatch(&hooks, event()).is_empty());
    }
}
