//! Bubble sort animator
//!
//! Draws every value as a bar and walks the classic O(n²) sweep over the
//! display list: highlight a pair, pause, read both values back from the
//! surface, swap if out of order, settle. Each finished pass resolves the
//! block that bubbled to the end and moves its value into the output.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, trace};

use crate::application::error_ext::RenderResultExt;
use crate::application::scheduler::Scheduler;
use crate::application::ApplicationResult;
use crate::config::{BubbleConfig, Settings};
use crate::domain::{Block, BlockId, BlockState, DomainError, OutputList, Placement};
use crate::infrastructure::traits::{RenderSurface, Transition};

/// One adjacent comparison of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub first: i32,
    pub second: i32,
    pub swapped: bool,
}

/// Outcome of a finished bubble sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleReport {
    /// The "after" list, front to back
    pub output: Vec<i32>,
    pub comparisons: Vec<Comparison>,
}

impl BubbleReport {
    pub fn swaps(&self) -> usize {
        self.comparisons.iter().filter(|c| c.swapped).count()
    }
}

pub struct BubbleSortAnimator {
    values: Vec<i32>,
    geometry: BubbleConfig,
    /// Horizontal pitch of one block, gap included
    block_size: f64,
    delay: Duration,
    scheduler: Scheduler,
    surface: Arc<dyn RenderSurface>,
    /// Blocks in display order
    blocks: Vec<Block>,
    output: OutputList,
    comparisons: Vec<Comparison>,
}

impl BubbleSortAnimator {
    pub fn new(
        values: &[i32],
        settings: &Settings,
        scheduler: Scheduler,
        surface: Arc<dyn RenderSurface>,
    ) -> ApplicationResult<Self> {
        if values.is_empty() {
            return Err(DomainError::EmptyDataset.into());
        }
        let geometry = settings.bubble.clone();
        let block_size = (geometry.container_width + geometry.block_offset) / values.len() as f64;
        Ok(Self {
            values: values.to_vec(),
            geometry,
            block_size,
            delay: settings.timing.bubble_delay(),
            scheduler,
            surface,
            blocks: Vec::with_capacity(values.len()),
            output: OutputList::new(),
            comparisons: Vec::new(),
        })
    }

    pub fn block_size(&self) -> f64 {
        self.block_size
    }

    /// Blocks in their current display order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn output(&self) -> Vec<i32> {
        self.output.to_vec()
    }

    /// Render the blocks, then sort them.
    pub async fn run(&mut self) -> ApplicationResult<BubbleReport> {
        self.render_blocks().await?;
        self.start().await
    }

    /// Create the blocks one after another, each growing from zero height
    /// before the next appears.
    #[instrument(level = "debug", skip(self), fields(blocks = self.values.len()))]
    pub async fn render_blocks(&mut self) -> ApplicationResult<()> {
        let values = self.values.clone();
        for (index, &value) in values.iter().enumerate() {
            let block = Block {
                id: BlockId(index),
                value,
                left: index as f64 * self.block_size,
                width: self.block_size - self.geometry.block_offset,
                height: 0.0,
                state: BlockState::Default,
            };
            let height = f64::from(value) * self.geometry.block_multiplier;

            self.surface
                .apply(Transition::CreateBlock(block.clone()))
                .render_context("create block")?;
            self.surface
                .apply(Transition::AnimateHeight {
                    block: block.id,
                    height,
                    duration: self.delay,
                })
                .render_context("grow block")?;
            self.surface
                .apply(Transition::MarkBefore { slot: index })
                .render_context("mark before slot")?;
            self.blocks.push(Block { height, ..block });

            self.scheduler.delay(self.delay).await?;
        }
        Ok(())
    }

    /// Exchange the offsets of the blocks at two display positions, wait for
    /// the movement, then exchange them in the display list so later
    /// position lookups see the new order.
    #[instrument(level = "trace", skip(self))]
    pub async fn swap(&mut self, first: usize, second: usize) -> ApplicationResult<()> {
        let first_block = self.block_at(first)?.clone();
        let second_block = self.block_at(second)?.clone();

        self.surface
            .apply(Transition::AnimateOffset {
                block: first_block.id,
                left: second_block.left,
                duration: self.delay,
            })
            .render_context("move block")?;
        self.surface
            .apply(Transition::AnimateOffset {
                block: second_block.id,
                left: first_block.left,
                duration: self.delay,
            })
            .render_context("move block")?;

        self.scheduler.delay(self.delay).await?;

        self.blocks[first].left = second_block.left;
        self.blocks[second].left = first_block.left;
        self.blocks.swap(first, second);
        self.surface
            .apply(Transition::ReorderBlocks {
                first: first_block.id,
                second: second_block.id,
            })
            .render_context("reorder blocks")?;
        Ok(())
    }

    /// Run the passes over the rendered blocks.
    ///
    /// Every finished pass resolves the block at the end of the unsorted
    /// range and prepends its value to the output, so the output reads
    /// ascending once the last block is resolved.
    #[instrument(level = "debug", skip(self), fields(blocks = self.blocks.len()))]
    pub async fn start(&mut self) -> ApplicationResult<BubbleReport> {
        let len = self.blocks.len();
        if len == 0 {
            return Err(DomainError::EmptyDataset.into());
        }
        info!(len, "bubble sort started");

        for pass in 0..len - 1 {
            for j in 0..len - pass - 1 {
                let first_id = self.block_at(j)?.id;
                let second_id = self.block_at(j + 1)?.id;

                self.set_state(first_id, BlockState::Selected)?;
                self.set_state(second_id, BlockState::Selected)?;

                self.scheduler.delay(self.delay).await?;

                let first = self.read_value(j)?;
                let second = self.read_value(j + 1)?;
                let swapped = first > second;
                trace!(first, second, swapped, "compared");
                if swapped {
                    self.swap(j, j + 1).await?;
                }
                self.comparisons.push(Comparison {
                    first,
                    second,
                    swapped,
                });

                self.set_state(first_id, BlockState::Default)?;
                self.set_state(second_id, BlockState::Default)?;
            }

            let surfaced = len - pass - 1;
            self.resolve(surfaced)?;
            debug!(pass, "pass finished");
        }

        self.resolve(0)?;
        info!(comparisons = self.comparisons.len(), "bubble sort finished");

        Ok(BubbleReport {
            output: self.output.to_vec(),
            comparisons: self.comparisons.clone(),
        })
    }

    /// Resolve the block at `position` and prepend its displayed value to the output.
    fn resolve(&mut self, position: usize) -> ApplicationResult<()> {
        let id = self.block_at(position)?.id;
        self.set_state(id, BlockState::Resolved)?;
        let value = self.read_value(position)?;
        self.output.place(value, Placement::Front);
        self.surface
            .apply(Transition::PlaceOutput {
                value,
                placement: Placement::Front,
            })
            .render_context("place output")
    }

    /// Read the number shown on the block at `position`.
    ///
    /// Text that does not parse means the display no longer matches the
    /// model; that is reported instead of guessed around.
    pub fn read_value(&self, position: usize) -> ApplicationResult<i32> {
        let id = self.block_at(position)?.id;
        let text = self
            .surface
            .block_text(id)
            .ok_or(DomainError::UnknownBlock(id))?;
        text.trim().parse::<i32>().map_err(|_| {
            DomainError::UnreadableBlockValue {
                block: id,
                text: text.clone(),
            }
            .into()
        })
    }

    fn block_at(&self, position: usize) -> ApplicationResult<&Block> {
        self.blocks
            .get(position)
            .ok_or_else(|| DomainError::UnknownBlock(BlockId(position)).into())
    }

    fn set_state(&mut self, id: BlockId, state: BlockState) -> ApplicationResult<()> {
        if let Some(block) = self.blocks.iter_mut().find(|block| block.id == id) {
            block.state = state;
        }
        self.surface
            .apply(Transition::SetBlockState { block: id, state })
            .render_context("color block")
    }
}
