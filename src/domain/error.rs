//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::{BlockId, NodeId};

/// Domain errors represent violated invariants of the sorting models.
/// These are independent of rendering and scheduling concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("dataset is empty")]
    EmptyDataset,

    #[error("block {block} displays non-numeric value: {text:?}")]
    UnreadableBlockValue { block: BlockId, text: String },

    #[error("block {0} is not on display")]
    UnknownBlock(BlockId),

    #[error("tree node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("not an integer: {0:?}")]
    InvalidValue(String),

    #[error("unknown algorithm: {0} (expected bubble or tree)")]
    UnknownAlgorithm(String),

    #[error("invalid {what} range: {min}..={max}")]
    InvalidRange { what: &'static str, min: i64, max: i64 },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
