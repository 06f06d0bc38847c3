//! Application layer: scheduling, animators and the session
//!
//! This layer orchestrates domain logic and depends on rendering boundary traits.

pub mod error;
pub mod error_ext;
pub mod scheduler;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::RenderResultExt;
pub use scheduler::{Scheduler, StepQueue};
