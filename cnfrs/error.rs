//! Errors raised while building and encoding formulas.
use thiserror::Error;

use crate::formula::FormulaId;

/// Error of the CNF compiler. Every variant is fatal for the current run:
/// a malformed formula is a defect upstream, not something to recover from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CnfError {
    /// An operator is used with an unsupported operand count or shape.
    #[error("malformed formula node {node}: {reason}")]
    Structural { node: String, reason: String },

    /// An internal assumption of the encoder does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CnfError {
    pub(crate) fn structural(node: impl Into<String>, reason: impl Into<String>) -> Self {
        CnfError::Structural {
            node: node.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_literal(node: FormulaId) -> Self {
        CnfError::InvariantViolation(format!("operand {node} has not been encoded yet"))
    }
}

/// Error of the textual formula front-end.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, CnfError>;
