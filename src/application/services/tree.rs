//! Binary search tree sort animator
//!
//! The first value becomes the root. Every remaining value gets an `Insert`
//! step, followed by one `Finalize` step; the scheduler drains them one per
//! tick. Finalizing walks the tree in order and queues one `Extract` per
//! node, so the sorted output is emitted at the same pace.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::application::error_ext::RenderResultExt;
use crate::application::scheduler::{Scheduler, StepQueue};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{BstArena, DomainError, NodeId, OutputList, Placement, Tone};
use crate::infrastructure::layout::TreeLayout;
use crate::infrastructure::traits::{LinkView, NodeView, RenderSurface, Transition, TreeFrame};

/// One queued operation of the tree animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeStep {
    /// Consume "before" slot `slot` by inserting its value
    Insert { slot: usize, value: i32 },
    /// Clear highlights, redraw, queue the extraction walk
    Finalize,
    /// Move one node's value to the output
    Extract { node: NodeId },
}

/// Outcome of a finished tree sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    /// The "after" list, front to back
    pub output: Vec<i32>,
    /// Compact structure, e.g. `5{L:3{L:1},R:8}`
    pub structure: String,
    pub depth: usize,
    /// Steps executed by the driver
    pub steps: usize,
}

pub struct TreeAnimator {
    values: Vec<i32>,
    tick: Duration,
    transition: Duration,
    node_radius: f64,
    scheduler: Scheduler,
    surface: Arc<dyn RenderSurface>,
    layout: Arc<dyn TreeLayout>,
    /// Nodes below this identity were part of an earlier frame
    rendered: usize,
    output: OutputList,
    tree: Option<BstArena>,
}

impl TreeAnimator {
    pub fn new(
        values: &[i32],
        settings: &Settings,
        scheduler: Scheduler,
        surface: Arc<dyn RenderSurface>,
        layout: Arc<dyn TreeLayout>,
    ) -> ApplicationResult<Self> {
        if values.is_empty() {
            return Err(DomainError::EmptyDataset.into());
        }
        Ok(Self {
            values: values.to_vec(),
            tick: settings.timing.tree_delay(),
            transition: settings.timing.transition(),
            node_radius: settings.tree.node_radius,
            scheduler,
            surface,
            layout,
            rendered: 0,
            output: OutputList::new(),
            tree: None,
        })
    }

    /// The tree built by the last run.
    pub fn tree(&self) -> Option<&BstArena> {
        self.tree.as_ref()
    }

    pub fn output(&self) -> Vec<i32> {
        self.output.to_vec()
    }

    /// Plant the root, queue the remaining work and drain it.
    #[instrument(level = "debug", skip(self), fields(values = self.values.len()))]
    pub async fn start(&mut self) -> ApplicationResult<TreeReport> {
        let values = self.values.clone();
        let (&root, rest) = values.split_first().ok_or(DomainError::EmptyDataset)?;
        info!(len = self.values.len(), root, "tree sort started");

        let mut tree = BstArena::with_root(root);
        self.surface
            .apply(Transition::MarkBefore { slot: 0 })
            .render_context("mark before slot")?;
        self.update(&tree)?;

        let mut queue: StepQueue<TreeStep> = rest
            .iter()
            .enumerate()
            .map(|(index, &value)| TreeStep::Insert {
                slot: index + 1,
                value,
            })
            .collect();
        queue.push(TreeStep::Finalize);

        let scheduler = self.scheduler.clone();
        let tick = self.tick;
        let result = scheduler
            .drain(&mut queue, tick, |step, queue| {
                self.run_step(&mut tree, step, queue)
            })
            .await;

        let report = TreeReport {
            output: self.output.to_vec(),
            structure: tree.to_string(),
            depth: tree.depth(),
            steps: result.as_ref().copied().unwrap_or_default(),
        };
        self.tree = Some(tree);
        result?;

        info!(depth = report.depth, steps = report.steps, "tree sort finished");
        Ok(report)
    }

    fn run_step(
        &mut self,
        tree: &mut BstArena,
        step: TreeStep,
        queue: &mut StepQueue<TreeStep>,
    ) -> ApplicationResult<()> {
        match step {
            TreeStep::Insert { slot, value } => {
                self.surface
                    .apply(Transition::MarkBefore { slot })
                    .render_context("mark before slot")?;
                let mut rendered = Ok(());
                let id = tree.insert_with(value, |tree, _| rendered = self.update(tree));
                rendered?;
                debug!(value, node = %id, "inserted");
            }
            TreeStep::Finalize => {
                tree.clear_highlights();
                self.update(tree)?;
                tree.walk(|node| queue.push(TreeStep::Extract { node: node.id }));
                debug!(queued = queue.len(), "extraction queued");
            }
            TreeStep::Extract { node } => {
                let value = tree.get(node)?.value;
                self.surface
                    .apply(Transition::ExtractNode {
                        node,
                        duration: self.transition,
                    })
                    .render_context("extract node")?;
                self.output.place(value, Placement::Back);
                self.surface
                    .apply(Transition::PlaceOutput {
                        value,
                        placement: Placement::Back,
                    })
                    .render_context("place output")?;
            }
        }
        Ok(())
    }

    /// Lay the tree out again and animate towards the new frame.
    fn update(&mut self, tree: &BstArena) -> ApplicationResult<()> {
        let frame = self.frame(tree);
        self.rendered = tree.len();
        self.surface
            .apply(Transition::TreeUpdate {
                frame,
                duration: self.transition,
            })
            .render_context("update tree")
    }

    /// Snapshot of the tree, diffed against the previous frame by identity.
    pub fn frame(&self, tree: &BstArena) -> TreeFrame {
        let positions: HashMap<NodeId, (f64, f64)> = self
            .layout
            .layout(tree)
            .into_iter()
            .map(|position| (position.id, (position.x, position.y)))
            .collect();

        let nodes = tree
            .nodes()
            .iter()
            .map(|node| {
                let (x, y) = positions.get(&node.id).copied().unwrap_or_default();
                NodeView {
                    id: node.id,
                    value: node.value,
                    parent: node.parent,
                    branch: node.branch,
                    x,
                    y,
                    radius: self.node_radius,
                    stroke: if node.is_new_node {
                        Some(Tone::Alert)
                    } else {
                        node.color()
                    },
                    entering: node.id.0 >= self.rendered,
                }
            })
            .collect();

        let links = tree
            .links()
            .into_iter()
            .map(|(source, target)| {
                let on_path = tree
                    .get(target)
                    .map(|node| node.on_insert_path)
                    .unwrap_or_default();
                LinkView {
                    source,
                    target,
                    stroke: if on_path { Tone::Alert } else { Tone::Muted },
                    entering: target.0 >= self.rendered,
                }
            })
            .collect();

        TreeFrame { nodes, links }
    }
}
