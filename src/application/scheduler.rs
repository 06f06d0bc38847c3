//! Cooperative pacing for animations
//!
//! [`Scheduler::delay`] suspends an animation for a while so the surface can
//! play a transition before the next logical step runs.
//! [`Scheduler::drain`] is the fixed-interval driver of a [`StepQueue`]: one
//! step per tick, strictly in FIFO order, stopping by itself once the queue
//! is empty.
//!
//! Both honor a shared shutdown signal. Once [`Scheduler::cancel`] is called,
//! every pending and future wait of that scheduler fails with
//! [`ApplicationError::Cancelled`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, instrument, trace};

use crate::application::{ApplicationError, ApplicationResult};

/// Shortest driver period; tokio intervals reject a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// FIFO of pending animation steps.
#[derive(Debug, Clone)]
pub struct StepQueue<S> {
    steps: VecDeque<S>,
}

impl<S> Default for StepQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StepQueue<S> {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    pub fn push(&mut self, step: S) {
        self.steps.push_back(step);
    }

    pub fn pop(&mut self) -> Option<S> {
        self.steps.pop_front()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<S> Extend<S> for StepQueue<S> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.steps.extend(iter);
    }
}

impl<S> FromIterator<S> for StepQueue<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

/// Timer source shared by the animators of one session.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Multiplier applied to every duration; 0 runs animations back to back
    time_scale: f64,
    shutdown_sender: broadcast::Sender<()>,
    safe_is_cancelled: Arc<AtomicBool>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Scheduler {
    pub fn new(time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() {
            time_scale.max(0.0)
        } else {
            1.0
        };
        let (shutdown_sender, _) = broadcast::channel::<()>(1);
        Self {
            time_scale,
            shutdown_sender,
            safe_is_cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Wall-clock length of a nominal duration.
    pub fn scaled(&self, duration: Duration) -> Duration {
        duration.mul_f64(self.time_scale)
    }

    pub fn is_cancelled(&self) -> bool {
        self.safe_is_cancelled.load(Ordering::SeqCst)
    }

    /// Fire the shutdown signal. Idempotent.
    pub fn cancel(&self) {
        if !self.safe_is_cancelled.swap(true, Ordering::SeqCst) {
            debug!("scheduler cancelled");
            // No receivers just means nothing is waiting right now.
            self.shutdown_sender.send(()).ok();
        }
    }

    /// Suspend the caller for `duration` (scaled).
    pub async fn delay(&self, duration: Duration) -> ApplicationResult<()> {
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        if self.is_cancelled() {
            return Err(ApplicationError::Cancelled);
        }
        tokio::select! {
            _ = shutdown_receiver.recv() => Err(ApplicationError::Cancelled),
            () = tokio::time::sleep(self.scaled(duration)) => Ok(()),
        }
    }

    /// Run queued steps one per `period` until a tick finds the queue empty.
    ///
    /// The first step runs one full period after the call. `run` may push
    /// follow-up steps; they are executed after everything already queued.
    /// Returns the number of executed steps.
    #[instrument(level = "debug", skip(self, queue, run), fields(queued = queue.len()))]
    pub async fn drain<S, F>(
        &self,
        queue: &mut StepQueue<S>,
        period: Duration,
        mut run: F,
    ) -> ApplicationResult<usize>
    where
        F: FnMut(S, &mut StepQueue<S>) -> ApplicationResult<()>,
    {
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        if self.is_cancelled() {
            return Err(ApplicationError::Cancelled);
        }

        let period = self.scaled(period).max(MIN_PERIOD);
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut executed = 0;
        loop {
            tokio::select! {
                // Both branches are cancel safe: recv and tick can be dropped mid-poll.
                _ = shutdown_receiver.recv() => {
                    return Err(ApplicationError::Cancelled);
                }
                _ = ticks.tick() => {
                    let Some(step) = queue.pop() else {
                        debug!(executed, "step queue drained, driver stopped");
                        break;
                    };
                    trace!(remaining = queue.len(), "running step");
                    run(step, queue)?;
                    executed += 1;
                }
            }
        }
        Ok(executed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn given_delay_when_awaited_then_virtual_time_advances() {
        let scheduler = Scheduler::new(1.0);
        let start = Instant::now();
        scheduler.delay(Duration::from_millis(200)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn given_time_scale_when_delay_then_duration_is_scaled() {
        let scheduler = Scheduler::new(0.5);
        let start = Instant::now();
        scheduler.delay(Duration::from_millis(200)).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_millis(100));
        assert_eq!(Scheduler::new(f64::NAN).time_scale(), 1.0);
        assert_eq!(Scheduler::new(-3.0).time_scale(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn given_cancel_during_delay_when_awaited_then_cancelled() {
        let scheduler = Scheduler::new(1.0);
        let canceller = scheduler.clone();
        let (waited, ()) = tokio::join!(scheduler.delay(Duration::from_secs(10)), async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });
        assert!(matches!(waited, Err(ApplicationError::Cancelled)));
        assert!(matches!(
            scheduler.delay(Duration::ZERO).await,
            Err(ApplicationError::Cancelled)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn given_queue_when_drain_then_fifo_one_step_per_tick_and_stops() {
        let scheduler = Scheduler::new(1.0);
        let mut queue: StepQueue<u32> = [1, 2, 3].into_iter().collect();
        let mut seen = Vec::new();
        let start = Instant::now();

        let executed = scheduler
            .drain(&mut queue, Duration::from_millis(500), |step, queue| {
                seen.push((step, start.elapsed().as_millis()));
                if step == 1 {
                    queue.push(10);
                }
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(executed, 4);
        assert_eq!(seen, vec![(1, 500), (2, 1000), (3, 1500), (10, 2000)]);
        // The empty tick that stopped the driver
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn given_failing_step_when_drain_then_error_propagates_and_rest_stays_queued() {
        let scheduler = Scheduler::default();
        let mut queue: StepQueue<u32> = [1, 2].into_iter().collect();
        let result = scheduler
            .drain(&mut queue, Duration::from_millis(10), |_, _| {
                Err(ApplicationError::SortInProgress)
            })
            .await;
        assert!(matches!(result, Err(ApplicationError::SortInProgress)));
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn given_cancelled_scheduler_when_drain_then_nothing_runs() {
        let scheduler = Scheduler::default();
        scheduler.cancel();
        let mut queue: StepQueue<u32> = [1].into_iter().collect();
        let result = scheduler
            .drain(&mut queue, Duration::from_millis(10), |_, _| Ok(()))
            .await;
        assert!(matches!(result, Err(ApplicationError::Cancelled)));
        assert_eq!(queue.len(), 1);
    }
}
