//! Session controller
//!
//! Owns the dataset, the selected algorithm and the control lock, and
//! dispatches "start" to one of the two animators. Its public methods are
//! the click handlers of the generate, start and reset buttons plus the
//! mode selector.

use std::sync::Arc;

use rand::rngs::StdRng;
use tracing::{debug, info, instrument, warn};

use crate::application::error_ext::RenderResultExt;
use crate::application::scheduler::Scheduler;
use crate::application::services::bubble::{BubbleReport, BubbleSortAnimator};
use crate::application::services::tree::{TreeAnimator, TreeReport};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{Algorithm, Dataset, DatasetShape, DomainError};
use crate::infrastructure::layout::TreeLayout;
use crate::infrastructure::traits::{RenderSurface, Transition};

/// Lifecycle of the current dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Dataset shown, nothing started
    Idle,
    /// An animator is running
    Sorting,
    /// The last sort ran to its end (or failed); controls stay locked
    Finished,
}

/// Result of one sort, per algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortReport {
    Bubble(BubbleReport),
    Tree(TreeReport),
}

impl SortReport {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            SortReport::Bubble(_) => Algorithm::Bubble,
            SortReport::Tree(_) => Algorithm::Tree,
        }
    }

    /// The "after" list, front to back.
    pub fn output(&self) -> &[i32] {
        match self {
            SortReport::Bubble(report) => &report.output,
            SortReport::Tree(report) => &report.output,
        }
    }
}

pub struct SessionController {
    settings: Arc<Settings>,
    surface: Arc<dyn RenderSurface>,
    layout: Arc<dyn TreeLayout>,
    scheduler: Scheduler,
    rng: StdRng,
    shape: DatasetShape,
    dataset: Dataset,
    algorithm: Algorithm,
    phase: SessionPhase,
    controls_locked: bool,
    last_report: Option<SortReport>,
}

impl SessionController {
    /// Build a session and show its first random dataset, like a fresh page load.
    pub fn new(
        settings: Arc<Settings>,
        surface: Arc<dyn RenderSurface>,
        layout: Arc<dyn TreeLayout>,
        rng: StdRng,
    ) -> ApplicationResult<Self> {
        let shape = settings.dataset.shape()?;
        let scheduler = Scheduler::new(settings.timing.time_scale);
        let mut session = Self {
            settings,
            surface,
            layout,
            scheduler,
            rng,
            shape,
            dataset: Dataset::default(),
            algorithm: Algorithm::default(),
            phase: SessionPhase::Idle,
            controls_locked: false,
            last_report: None,
        };
        session.generate()?;
        Ok(session)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn controls_locked(&self) -> bool {
        self.controls_locked
    }

    pub fn last_report(&self) -> Option<&SortReport> {
        self.last_report.as_ref()
    }

    /// Handle on the session's timers; cancelling it aborts a running sort.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// "Generate" button: show a fresh random dataset.
    #[instrument(level = "debug", skip(self))]
    pub fn generate(&mut self) -> ApplicationResult<()> {
        self.ensure_not_sorting()?;
        let dataset = Dataset::generate(&mut self.rng, &self.shape);
        info!(len = dataset.len(), "dataset generated");
        self.show(dataset)
    }

    /// Show an explicit dataset instead of a random one.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&mut self, dataset: Dataset) -> ApplicationResult<()> {
        self.ensure_not_sorting()?;
        if dataset.is_empty() {
            return Err(DomainError::EmptyDataset.into());
        }
        info!(len = dataset.len(), "dataset loaded");
        self.show(dataset)
    }

    /// Mode selector.
    pub fn select(&mut self, algorithm: Algorithm) -> ApplicationResult<()> {
        if self.controls_locked {
            return Err(ApplicationError::ControlsLocked);
        }
        debug!(%algorithm, "algorithm selected");
        self.algorithm = algorithm;
        Ok(())
    }

    /// "Start" button: lock the controls, reveal the container and run the
    /// selected animator to its end. The controls stay locked until the next
    /// generate or reset.
    #[instrument(level = "debug", skip(self), fields(algorithm = %self.algorithm))]
    pub async fn start(&mut self) -> ApplicationResult<&SortReport> {
        self.ensure_not_sorting()?;
        if self.controls_locked {
            return Err(ApplicationError::ControlsLocked);
        }

        self.controls_locked = true;
        self.surface
            .apply(Transition::ControlsEnabled(false))
            .render_context("lock controls")?;
        self.surface
            .apply(Transition::Reveal {
                algorithm: self.algorithm,
            })
            .render_context("reveal container")?;

        self.phase = SessionPhase::Sorting;
        let result = self.run_animator().await;
        self.phase = SessionPhase::Finished;

        match result {
            Ok(report) => {
                info!(output = ?report.output(), "sort finished");
                Ok(&*self.last_report.insert(report))
            }
            Err(e) => {
                warn!(error = %e, "sort aborted");
                Err(e)
            }
        }
    }

    async fn run_animator(&self) -> ApplicationResult<SortReport> {
        let values = self.dataset.values();
        match self.algorithm {
            Algorithm::Bubble => {
                let mut animator = BubbleSortAnimator::new(
                    values,
                    &self.settings,
                    self.scheduler.clone(),
                    self.surface.clone(),
                )?;
                Ok(SortReport::Bubble(animator.run().await?))
            }
            Algorithm::Tree => {
                let mut animator = TreeAnimator::new(
                    values,
                    &self.settings,
                    self.scheduler.clone(),
                    self.surface.clone(),
                    self.layout.clone(),
                )?;
                Ok(SortReport::Tree(animator.start().await?))
            }
        }
    }

    /// "Reset" button: stop whatever runs and return to the initial state,
    /// as if the page had been reloaded.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> ApplicationResult<()> {
        self.scheduler.cancel();
        self.scheduler = Scheduler::new(self.settings.timing.time_scale);
        self.algorithm = Algorithm::default();
        self.phase = SessionPhase::Idle;
        info!("session reset");
        self.generate()
    }

    fn ensure_not_sorting(&self) -> ApplicationResult<()> {
        if self.phase == SessionPhase::Sorting {
            return Err(ApplicationError::SortInProgress);
        }
        Ok(())
    }

    /// Replace the dataset, wipe previous results and unlock the controls.
    fn show(&mut self, dataset: Dataset) -> ApplicationResult<()> {
        self.surface
            .apply(Transition::Clear)
            .render_context("clear surface")?;
        self.surface
            .apply(Transition::ShowBefore {
                values: dataset.values().to_vec(),
            })
            .render_context("show dataset")?;
        if self.controls_locked {
            self.surface
                .apply(Transition::ControlsEnabled(true))
                .render_context("unlock controls")?;
        }
        self.dataset = dataset;
        self.last_report = None;
        self.phase = SessionPhase::Idle;
        self.controls_locked = false;
        Ok(())
    }
}
