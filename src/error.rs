//! Error types shared by every adapter, cursor and sink.

use thiserror::Error;

/// Where in the document a cursor adapter was when it saw an unexpected event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the root element
    Prolog,
    /// Inside the root element
    Body,
    /// After the root element closed
    Epilog,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Prolog => "prolog",
            Phase::Body => "body",
            Phase::Epilog => "epilog",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("unexpected {event} event while processing {phase}")]
    Malformed { phase: Phase, event: &'static str },

    #[error("illegal cursor state: {0}")]
    IllegalState(String),

    #[error("XML syntax error at byte {offset}: {message}")]
    Syntax { message: String, offset: usize },

    #[error("tree hierarchy error: {0}")]
    Hierarchy(String),

    #[error("content handler rejected event: {0}")]
    Handler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

impl BridgeError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        BridgeError::Syntax {
            message: message.into(),
            offset,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
