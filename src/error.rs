//! Error types shared by the store, the time parser and the tracker client.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContextError>;

/// Coarse classification used by callers that only care about the category
/// of a failure (exit codes, inline reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Io,
    Remote,
    NotFound,
}

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("{0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt day file {path}: {source}")]
    CorruptDayFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error with status code {status} from {url}")]
    Remote { status: u16, url: String },

    #[error("activity tracker unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to decode {what}: {source}")]
    Decode {
        what: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    NotFound(String),
}

impl ContextError {
    pub fn validation(message: impl Into<String>) -> Self {
        ContextError::Validation(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ContextError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ContextError::Validation(_) => ErrorKind::Validation,
            ContextError::Io { .. } | ContextError::CorruptDayFile { .. } => ErrorKind::Io,
            ContextError::Remote { .. }
            | ContextError::Unreachable { .. }
            | ContextError::Timeout { .. }
            | ContextError::Decode { .. } => ErrorKind::Remote,
            ContextError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
