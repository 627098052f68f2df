// src/error.rs
//! Error types for the GPS to CoT gateway

use std::fmt;

pub type Result<T> = std::result::Result<T, LincotError>;

#[derive(Debug)]
pub enum LincotError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Url(url::ParseError),
    Command(String),
    Config(String),
    Transport(String),
    Other(String),
}

impl fmt::Display for LincotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LincotError::Io(e) => write!(f, "IO error: {}", e),
            LincotError::Json(e) => write!(f, "JSON error: {}", e),
            LincotError::Url(e) => write!(f, "URL error: {}", e),
            LincotError::Command(msg) => write!(f, "Command error: {}", msg),
            LincotError::Config(msg) => write!(f, "Configuration error: {}", msg),
            LincotError::Transport(msg) => write!(f, "Transport error: {}", msg),
            LincotError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for LincotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LincotError::Io(e) => Some(e),
            LincotError::Json(e) => Some(e),
            LincotError::Url(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LincotError {
    fn from(error: std::io::Error) -> Self {
        LincotError::Io(error)
    }
}

impl From<serde_json::Error> for LincotError {
    fn from(error: serde_json::Error) -> Self {
        LincotError::Json(error)
    }
}

impl From<url::ParseError> for LincotError {
    fn from(error: url::ParseError) -> Self {
        LincotError::Url(error)
    }
}
