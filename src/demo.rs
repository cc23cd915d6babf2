//! Demo-mode walkthrough: plays a job card through the canonical lifecycle
//! one step per tick.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::lifecycle::{LifecycleTable, StatusMapper};
use crate::stepper::{JobCardStepper, StepperView};

/// Interval-driven player over the lifecycle table.
pub struct Walkthrough {
    table: LifecycleTable,
    period: Duration,
    start: usize,
}

impl Walkthrough {
    pub fn new(period: Duration) -> Self {
        Self {
            table: LifecycleTable::canonical(),
            // tokio rejects a zero period.
            period: period.max(Duration::from_millis(1)),
            start: 0,
        }
    }

    /// Start from the step `raw_status` maps to instead of the first one.
    pub fn starting_at(mut self, raw_status: &str) -> Self {
        self.start = self
            .table
            .index_of(StatusMapper::map(raw_status))
            .unwrap_or(0);
        self
    }

    /// Emit one frame per step from the start index through the terminal
    /// state, waiting one period between frames. Returns the last frame.
    pub async fn play<F>(&self, mut on_frame: F) -> Option<StepperView>
    where
        F: FnMut(&StepperView),
    {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut last = None;
        for state in &self.table.states()[self.start..] {
            ticker.tick().await;
            let view = JobCardStepper::new(state.id.as_str()).view();
            debug!(step = view.current_index() + 1, state = %state.id, "walkthrough frame");
            on_frame(&view);
            last = Some(view);
        }
        last
    }
}
