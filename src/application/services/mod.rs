//! Application services
//!
//! Concrete animators and the session controller that dispatches to them.
//! Services depend on the rendering boundary traits (RenderSurface, TreeLayout)
//! but are themselves concrete structs, not traits.

mod bubble;
mod session;
mod tree;

pub use bubble::{BubbleReport, BubbleSortAnimator, Comparison};
pub use session::{SessionController, SessionPhase, SortReport};
pub use tree::{TreeAnimator, TreeReport, TreeStep};
