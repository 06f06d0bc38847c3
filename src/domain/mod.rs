//! Domain layer: datasets, blocks and the binary search tree model
//!
//! This layer is independent of external concerns (no rendering, no timers, no config loading).

pub mod arena;
pub mod entities;
pub mod error;

pub use arena::{BstArena, BstNode, Branch, InOrderIterator, NodeId};
pub use entities::*;
pub use error::{DomainError, DomainResult};
