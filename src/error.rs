use std::path::PathBuf;

use thiserror::Error;

use crate::state_machine::State;

#[derive(Debug, Error)]
pub enum JobDraftError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Event script has no events: {}", .0.display())]
    EmptyScript(PathBuf),

    #[error("Unsupported event script format (expected .json or .toml): {}", .0.display())]
    UnsupportedScript(PathBuf),

    #[error("Expected final state {expected}, got {actual}")]
    UnexpectedState { expected: State, actual: State },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
