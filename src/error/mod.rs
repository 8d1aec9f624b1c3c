//! This module defines the error type for this crate.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two compared documents something refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Original, // The first document, the "before" version
    Revised, // The second document, the "after" version
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Side::Original => write!(f, "original"),
            Side::Revised => write!(f, "revised"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The document is not well-formed XML
    #[error("Invalid XML in {side} document: {source}")]
    InvalidXml { side: Side, source: XmlError },
    /// Reading a document or the history file failed
    #[error("Error accessing file: {0}")]
    Io(#[from] std::io::Error),
    /// The comparison history could not be encoded or decoded
    #[error("Error encoding comparison history: {0}")]
    History(#[from] serde_json::Error),
}

/// A document failed to parse as well-formed XML
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {position})")]
pub struct XmlError {
    pub message: String,
    pub position: usize,
}
