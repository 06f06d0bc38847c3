//! Rendering boundary traits for testability
//!
//! Animators never draw anything themselves. They describe every visual
//! change as a [`Transition`] and hand it to a [`RenderSurface`], which may
//! draw it to a terminal, record it, or both.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{Algorithm, Block, BlockId, BlockState, Branch, NodeId, Placement, Tone};

/// One node of a tree render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub value: i32,
    pub parent: Option<NodeId>,
    pub branch: Option<Branch>,
    pub x: f64,
    pub y: f64,
    /// Target radius; entering nodes grow into it from zero
    pub radius: f64,
    /// Alert while freshly inserted, else the branch color (None for the root)
    pub stroke: Option<Tone>,
    /// Not part of any earlier frame
    pub entering: bool,
}

/// One parent to child connector of a tree render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    pub source: NodeId,
    pub target: NodeId,
    pub stroke: Tone,
    pub entering: bool,
}

impl LinkView {
    /// Diff key of the link, `source-target`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.source.0, self.target.0)
    }
}

/// Full tree snapshot: nodes in identity order, links ordered by child identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeFrame {
    pub nodes: Vec<NodeView>,
    pub links: Vec<LinkView>,
}

impl TreeFrame {
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn entering_nodes(&self) -> impl Iterator<Item = &NodeView> {
        self.nodes.iter().filter(|node| node.entering)
    }
}

/// A visual state change requested by an animator or the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Wipe every container
    Clear,
    /// Replace the "before" list
    ShowBefore { values: Vec<i32> },
    /// Mark a "before" slot as consumed
    MarkBefore { slot: usize },
    /// Make the container of the chosen algorithm visible
    Reveal { algorithm: Algorithm },
    /// Enable or disable the selector and the action controls
    ControlsEnabled(bool),
    /// Append a block to the display list
    CreateBlock(Block),
    AnimateHeight {
        block: BlockId,
        height: f64,
        duration: Duration,
    },
    AnimateOffset {
        block: BlockId,
        left: f64,
        duration: Duration,
    },
    SetBlockState { block: BlockId, state: BlockState },
    /// Move `second` in front of `first` in the display list
    ReorderBlocks { first: BlockId, second: BlockId },
    /// Put a value into the "after" list
    PlaceOutput { value: i32, placement: Placement },
    /// Animate the tree towards a new frame
    TreeUpdate { frame: TreeFrame, duration: Duration },
    /// Fade a node out once its value went to the output
    ExtractNode { node: NodeId, duration: Duration },
}

/// Rendering abstraction the animators drive.
pub trait RenderSurface: Send + Sync {
    /// Start a visual transition. Timed transitions are not awaited here;
    /// callers pace themselves with the scheduler.
    fn apply(&self, transition: Transition) -> io::Result<()>;

    /// Text currently displayed on a block, None if the block is unknown.
    fn block_text(&self, block: BlockId) -> Option<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

#[derive(Debug, Default)]
struct Recorded {
    log: Vec<Transition>,
    labels: HashMap<BlockId, String>,
}

/// Headless surface that keeps every transition in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<Recorded>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all transitions applied so far.
    pub fn transitions(&self) -> Vec<Transition> {
        self.state
            .lock()
            .map(|state| state.log.clone())
            .unwrap_or_default()
    }

    /// Overwrite the text shown on a block.
    pub fn set_block_text(&self, block: BlockId, text: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.labels.insert(block, text.into());
        }
    }

    /// Values of the "after" list as it currently reads.
    pub fn output(&self) -> Vec<i32> {
        let mut output = crate::domain::OutputList::new();
        for transition in self.transitions() {
            match transition {
                Transition::PlaceOutput { value, placement } => output.place(value, placement),
                Transition::Clear => output.clear(),
                _ => {}
            }
        }
        output.to_vec()
    }
}

impl RenderSurface for RecordingSurface {
    fn apply(&self, transition: Transition) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("recording surface lock poisoned"))?;
        match &transition {
            Transition::CreateBlock(block) => {
                state.labels.insert(block.id, block.value.to_string());
            }
            Transition::Clear => state.labels.clear(),
            _ => {}
        }
        state.log.push(transition);
        Ok(())
    }

    fn block_text(&self, block: BlockId) -> Option<String> {
        self.state.lock().ok()?.labels.get(&block).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(id: usize, value: i32) -> Block {
        Block {
            id: BlockId(id),
            value,
            left: 0.0,
            width: 10.0,
            height: 0.0,
            state: BlockState::Default,
        }
    }

    #[test]
    fn given_created_block_when_block_text_then_returns_value() {
        let surface = RecordingSurface::new();
        surface.apply(Transition::CreateBlock(block(0, 42))).unwrap();
        assert_eq!(surface.block_text(BlockId(0)).as_deref(), Some("42"));
        assert_eq!(surface.block_text(BlockId(1)), None);

        surface.set_block_text(BlockId(0), "n/a");
        assert_eq!(surface.block_text(BlockId(0)).as_deref(), Some("n/a"));
    }

    #[test]
    fn given_clear_when_output_then_restarts_list() {
        let surface = RecordingSurface::new();
        for transition in [
            Transition::PlaceOutput { value: 1, placement: Placement::Back },
            Transition::Clear,
            Transition::PlaceOutput { value: 8, placement: Placement::Front },
            Transition::PlaceOutput { value: 5, placement: Placement::Front },
        ] {
            surface.apply(transition).unwrap();
        }
        assert_eq!(surface.output(), vec![5, 8]);
        assert_eq!(surface.transitions().len(), 4);
    }
}
