//! Error conversion helpers for render surface calls
//!
//! Provides an extension trait for attaching context to surface I/O failures.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait RenderResultExt<T> {
    /// Name the transition that failed.
    ///
    /// # Example
    /// ```ignore
    /// surface.apply(Transition::MarkBefore { slot })
    ///     .render_context("mark before slot")?;
    /// ```
    fn render_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> RenderResultExt<T> for io::Result<T> {
    fn render_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Render {
            context: action.to_string(),
            source: e,
        })
    }
}
