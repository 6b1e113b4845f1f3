pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, MultiStepMode};
pub use error::{EngineError, Result};
