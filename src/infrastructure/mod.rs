//! Infrastructure layer: render surfaces, tree layout and DI container
//!
//! This layer implements the rendering boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod layout;
pub mod terminal;
pub mod traits;

pub use error::{InfraError, InfraResult};
