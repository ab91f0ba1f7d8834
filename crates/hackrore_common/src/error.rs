//! Error types for HackRore.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HackroreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is not initialized. Start the session before using it.")]
    NotInitialized(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HackroreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        HackroreError::InvalidArgument(msg.into())
    }

    pub fn code(&self) -> i32 {
        match self {
            HackroreError::InvalidArgument(_) => -32602,
            HackroreError::NotInitialized(_) => -32000,
            HackroreError::Storage(_) => -32001,
            HackroreError::Config(_) => -32002,
            HackroreError::Io(_) => -32006,
            HackroreError::Json(_) => -32700,
        }
    }
}

pub type Result<T> = std::result::Result<T, HackroreError>;
