//! Terminal surface: draws transitions as colored text
//!
//! Bubble sort is drawn as a strip of blocks, one line per visible change,
//! each block showing a height glyph and its value. Tree frames are drawn
//! with `termtree`. Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE through `colored`.

use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::Mutex;

use colored::{ColoredString, Colorize};
use itertools::Itertools;
use termtree::Tree;
use tracing::trace;

use crate::domain::{Algorithm, Block, BlockId, BlockState, Branch, NodeId, OutputList, Tone};
use crate::infrastructure::traits::{NodeView, RenderSurface, Transition, TreeFrame};

const GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Palette of the web page the visualizer started out as.
fn rgb(tone: Tone) -> (u8, u8, u8) {
    match tone {
        Tone::Default => (0x33, 0x99, 0xFF),
        Tone::Selected => (0x33, 0x66, 0xCC),
        Tone::Resolved => (0x66, 0xCC, 0x66),
        Tone::Visited => (0xE9, 0xEC, 0xEF),
        Tone::Alert => (0xFF, 0x00, 0x00),
        Tone::Muted => (0xCC, 0xCC, 0xCC),
        Tone::Extracted => (0xC0, 0xC0, 0xC0),
    }
}

fn paint(text: &str, tone: Tone) -> ColoredString {
    let (r, g, b) = rgb(tone);
    text.truecolor(r, g, b)
}

struct TerminalState {
    out: Box<dyn Write + Send>,
    before: Vec<i32>,
    visited: HashSet<usize>,
    blocks: Vec<Block>,
    output: OutputList,
    frame: TreeFrame,
    extracted: HashSet<NodeId>,
}

impl TerminalState {
    fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            before: Vec::new(),
            visited: HashSet::new(),
            blocks: Vec::new(),
            output: OutputList::new(),
            frame: TreeFrame::default(),
            extracted: HashSet::new(),
        }
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    fn strip(&self) -> String {
        let tallest = self
            .blocks
            .iter()
            .map(|block| block.height)
            .fold(0.0_f64, f64::max);
        self.blocks
            .iter()
            .map(|block| {
                let glyph = if tallest > 0.0 {
                    let level = (block.height / tallest * (GLYPHS.len() - 1) as f64).round();
                    GLYPHS[(level as usize).min(GLYPHS.len() - 1)]
                } else {
                    GLYPHS[0]
                };
                paint(&format!("{glyph}{:>3}", block.value), block.state.tone()).to_string()
            })
            .join(" ")
    }

    fn before_line(&self) -> String {
        self.before
            .iter()
            .enumerate()
            .map(|(slot, value)| {
                let text = value.to_string();
                if self.visited.contains(&slot) {
                    paint(&text, Tone::Visited).to_string()
                } else {
                    text
                }
            })
            .join(" ")
    }

    fn node_label(&self, node: &NodeView) -> String {
        let side = match node.branch {
            Some(Branch::Left) => "L ",
            Some(Branch::Right) => "R ",
            None => "",
        };
        let value = node.value.to_string();
        let value = if self.extracted.contains(&node.id) {
            paint(&value, Tone::Extracted).strikethrough()
        } else {
            match node.stroke {
                Some(tone) => paint(&value, tone),
                None => value.bold(),
            }
        };
        format!("{side}{value}")
    }

    fn subtree(&self, node: &NodeView) -> Tree<String> {
        let children = self
            .frame
            .nodes
            .iter()
            .filter(|child| child.parent == Some(node.id))
            .sorted_by_key(|child| child.branch == Some(Branch::Right))
            .map(|child| self.subtree(child));
        Tree::new(self.node_label(node)).with_leaves(children)
    }

    fn tree(&self) -> Option<Tree<String>> {
        self.frame
            .nodes
            .iter()
            .find(|node| node.parent.is_none())
            .map(|root| self.subtree(root))
    }

    fn draw(&mut self, transition: Transition) -> io::Result<()> {
        match transition {
            Transition::Clear => {
                self.before.clear();
                self.visited.clear();
                self.blocks.clear();
                self.output.clear();
                self.frame = TreeFrame::default();
                self.extracted.clear();
            }
            Transition::ShowBefore { values } => {
                self.before = values;
                let line = self.before_line();
                writeln!(self.out, "{} {}", "before:".cyan().bold(), line)?;
            }
            Transition::MarkBefore { slot } => {
                self.visited.insert(slot);
            }
            Transition::Reveal { algorithm } => {
                let title = match algorithm {
                    Algorithm::Bubble => "bubble sort",
                    Algorithm::Tree => "binary search tree sort",
                };
                writeln!(self.out, "{}", format!("== {title} ==").cyan().bold())?;
            }
            Transition::ControlsEnabled(enabled) => {
                trace!(enabled, "controls toggled");
            }
            Transition::CreateBlock(block) => {
                self.blocks.push(block);
            }
            Transition::AnimateHeight { block, height, .. } => {
                if let Some(target) = self.block_mut(block) {
                    target.height = height;
                }
                let strip = self.strip();
                writeln!(self.out, "{strip}")?;
            }
            Transition::AnimateOffset { block, left, .. } => {
                if let Some(target) = self.block_mut(block) {
                    target.left = left;
                }
            }
            Transition::SetBlockState { block, state } => {
                if let Some(target) = self.block_mut(block) {
                    target.state = state;
                }
                // Settling back to default is followed by the next highlight anyway
                if state != BlockState::Default {
                    let strip = self.strip();
                    writeln!(self.out, "{strip}")?;
                }
            }
            Transition::ReorderBlocks { first, second } => {
                let first = self.blocks.iter().position(|block| block.id == first);
                let second = self.blocks.iter().position(|block| block.id == second);
                if let (Some(first), Some(second)) = (first, second) {
                    self.blocks.swap(first, second);
                }
                let strip = self.strip();
                writeln!(self.out, "{strip}")?;
            }
            Transition::PlaceOutput { value, placement } => {
                self.output.place(value, placement);
                let after = self.output.to_vec().iter().join(" ");
                writeln!(self.out, "{} {}", "after:".green().bold(), after)?;
            }
            Transition::TreeUpdate { frame, .. } => {
                self.frame = frame;
                if let Some(tree) = self.tree() {
                    write!(self.out, "{tree}")?;
                }
                let before = self.before_line();
                writeln!(self.out, "{} {}", "before:".cyan(), before)?;
            }
            Transition::ExtractNode { node, .. } => {
                self.extracted.insert(node);
            }
        }
        self.out.flush()
    }
}

/// Surface that prints to a terminal (or any writer).
pub struct TerminalSurface {
    state: Mutex<TerminalState>,
}

impl std::fmt::Debug for TerminalSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface").finish_non_exhaustive()
    }
}

impl TerminalSurface {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            state: Mutex::new(TerminalState::new(out)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

impl RenderSurface for TerminalSurface {
    fn apply(&self, transition: Transition) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("terminal surface lock poisoned"))?;
        state.draw(transition)
    }

    fn block_text(&self, block: BlockId) -> Option<String> {
        let state = self.state.lock().ok()?;
        state
            .blocks
            .iter()
            .find(|candidate| candidate.id == block)
            .map(|candidate| candidate.value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{BstArena, Placement};
    use crate::infrastructure::traits::LinkView;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn frame_for(values: &[i32]) -> TreeFrame {
        let mut tree = BstArena::with_root(values[0]);
        for &value in &values[1..] {
            tree.insert(value);
        }
        TreeFrame {
            nodes: tree
                .nodes()
                .iter()
                .map(|node| NodeView {
                    id: node.id,
                    value: node.value,
                    parent: node.parent,
                    branch: node.branch,
                    x: 0.0,
                    y: 0.0,
                    radius: 15.0,
                    stroke: node.color(),
                    entering: false,
                })
                .collect(),
            links: tree
                .links()
                .into_iter()
                .map(|(source, target)| LinkView {
                    source,
                    target,
                    stroke: Tone::Muted,
                    entering: false,
                })
                .collect(),
        }
    }

    #[test]
    fn given_blocks_when_drawn_then_values_and_text_are_visible() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::new(Box::new(buffer.clone()));
        surface
            .apply(Transition::CreateBlock(Block {
                id: BlockId(0),
                value: 42,
                left: 0.0,
                width: 10.0,
                height: 0.0,
                state: BlockState::Default,
            }))
            .unwrap();
        surface
            .apply(Transition::AnimateHeight {
                block: BlockId(0),
                height: 126.0,
                duration: std::time::Duration::ZERO,
            })
            .unwrap();
        assert!(buffer.text().contains("42"));
        assert_eq!(surface.block_text(BlockId(0)).as_deref(), Some("42"));
        assert_eq!(surface.block_text(BlockId(9)), None);
    }

    #[test]
    fn given_tree_frame_when_drawn_then_left_child_precedes_right() {
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::new(Box::new(buffer.clone()));
        surface
            .apply(Transition::TreeUpdate {
                frame: frame_for(&[5, 8, 3]),
                duration: std::time::Duration::ZERO,
            })
            .unwrap();
        let text = buffer.text();
        let left = text.find("L ").unwrap();
        let right = text.find("R ").unwrap();
        assert!(left < right, "left branch should be listed first:\n{text}");
    }

    #[test]
    fn given_output_placements_when_drawn_then_after_line_follows_list() {
        colored::control::set_override(false);
        let buffer = SharedBuffer::default();
        let surface = TerminalSurface::new(Box::new(buffer.clone()));
        for value in [8, 5, 3] {
            surface
                .apply(Transition::PlaceOutput { value, placement: Placement::Front })
                .unwrap();
        }
        assert!(buffer.text().lines().last().unwrap().ends_with("3 5 8"));
    }
}
