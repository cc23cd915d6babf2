//! Job-card stepper: positions a raw status on the canonical lifecycle and
//! classifies every step relative to it.
//!
//! [`JobCardStepper`] is a pure function of its inputs. It builds a
//! [`StepperView`] that both the wide and the narrow layout are drawn from,
//! and forwards step activation to an optional caller-supplied callback
//! without changing its own output.

use std::cmp::Ordering;

use tracing::debug;

use crate::lifecycle::{Disposition, JobCard, LifecycleState, LifecycleTable, Resolution, StateId};

/// How a step relates to the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Active,
    Pending,
    /// The current step of a cancelled or rejected job card.
    Failed,
}

/// Classify step `index` against the current index.
pub fn classify(current: usize, index: usize, disposition: Disposition) -> StepStatus {
    match index.cmp(&current) {
        Ordering::Less => StepStatus::Completed,
        Ordering::Equal => match disposition {
            Disposition::Open => StepStatus::Active,
            Disposition::Halted => StepStatus::Failed,
        },
        Ordering::Greater => StepStatus::Pending,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub state: &'static LifecycleState,
    pub status: StepStatus,
}

impl Step {
    /// 1-based position shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Glyph drawn inside the step marker.
    pub fn marker(&self) -> String {
        match self.status {
            StepStatus::Completed => "✓".to_string(),
            StepStatus::Failed => "✗".to_string(),
            StepStatus::Active | StepStatus::Pending => self.number().to_string(),
        }
    }
}

/// Layout-independent render model of one stepper frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepperView {
    steps: Vec<Step>,
    current: usize,
    disposition: Disposition,
}

impl StepperView {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Step {
        &self.steps[self.current]
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn is_halted(&self) -> bool {
        self.disposition == Disposition::Halted
    }

    /// Share of the narrow progress bar to fill: `(current + 1) / total`.
    pub fn fraction(&self) -> f64 {
        (self.current + 1) as f64 / self.total() as f64
    }

    pub fn step_counter(&self) -> String {
        format!("Step {} of {}", self.current + 1, self.total())
    }

    /// Whether connector `k`, joining markers `k` and `k + 1`, is filled.
    /// The filled run ends at the active marker.
    pub fn connector_filled(&self, k: usize) -> bool {
        k < self.current
    }
}

/// Stepper over the canonical lifecycle for a single job card.
pub struct JobCardStepper<'a> {
    table: LifecycleTable,
    card: JobCard,
    on_step_click: Option<Box<dyn FnMut(StateId) + 'a>>,
}

impl<'a> JobCardStepper<'a> {
    pub fn new(current_status: impl Into<String>) -> Self {
        Self::for_job_card(&JobCard::new(current_status))
    }

    pub fn for_job_card(card: &JobCard) -> Self {
        Self {
            table: LifecycleTable::canonical(),
            card: card.clone(),
            on_step_click: None,
        }
    }

    /// Status before the last transition; only consulted to place the
    /// marker of a halted job card.
    pub fn with_previous_status(mut self, previous: impl Into<String>) -> Self {
        self.card.previous_status = Some(previous.into());
        self
    }

    /// Callback invoked with the canonical id of a step the user activates.
    pub fn on_step_click(mut self, callback: impl FnMut(StateId) + 'a) -> Self {
        self.on_step_click = Some(Box::new(callback));
        self
    }

    #[cfg(test)]
    pub(crate) fn with_table(mut self, table: LifecycleTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &LifecycleTable {
        &self.table
    }

    pub fn resolution(&self) -> Resolution {
        self.card.resolve()
    }

    /// Build the current frame.
    pub fn view(&self) -> StepperView {
        let resolution = self.resolution();
        let current = self.table.index_of(resolution.state).unwrap_or_else(|| {
            debug!(state = %resolution.state, "state missing from lifecycle table, showing initial step");
            0
        });

        let steps = self
            .table
            .states()
            .iter()
            .enumerate()
            .map(|(index, state)| Step {
                index,
                state,
                status: classify(current, index, resolution.disposition),
            })
            .collect();

        StepperView {
            steps,
            current,
            disposition: resolution.disposition,
        }
    }

    /// Activate the step at `index` (0-based). Fires the callback once with
    /// that step's id and returns it; out-of-range indices do nothing.
    ///
    /// The stepper keeps rendering the same status: applying the
    /// transition is up to the caller.
    pub fn activate(&mut self, index: usize) -> Option<StateId> {
        let id = self.table.at(index)?.id;
        if let Some(callback) = self.on_step_click.as_mut() {
            callback(id);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [StateId; 8] = [
        StateId::Received,
        StateId::Diagnosed,
        StateId::Estimated,
        StateId::Approved,
        StateId::InProgress,
        StateId::QualityCheck,
        StateId::Ready,
        StateId::Delivered,
    ];

    fn statuses(view: &StepperView) -> Vec<StepStatus> {
        view.steps().iter().map(|s| s.status).collect()
    }

    #[test]
    fn classification_is_exhaustive() {
        let total = LifecycleTable::canonical().len();
        for c in 0..total {
            for i in 0..total {
                let status = classify(c, i, Disposition::Open);
                assert_eq!(status == StepStatus::Completed, i < c);
                assert_eq!(status == StepStatus::Active, i == c);
                assert_eq!(status == StepStatus::Pending, i > c);
            }
        }
    }

    #[test]
    fn halted_classification_replaces_active() {
        for c in 0..ALL_STATES.len() {
            for i in 0..ALL_STATES.len() {
                let open = classify(c, i, Disposition::Open);
                let halted = classify(c, i, Disposition::Halted);
                if i == c {
                    assert_eq!(halted, StepStatus::Failed);
                } else {
                    assert_eq!(halted, open);
                }
            }
        }
    }

    #[test]
    fn fraction_stays_in_bounds() {
        for state in ALL_STATES {
            let view = JobCardStepper::new(state.as_str()).view();
            let fraction = view.fraction();
            assert!(fraction > 0.0 && fraction <= 1.0);
        }
    }

    #[test]
    fn in_progress_scenario() {
        let view = JobCardStepper::new("In-Progress").view();
        assert_eq!(view.current_index(), 4);
        assert_eq!(view.current().state.id, StateId::InProgress);
        assert_eq!(
            statuses(&view),
            vec![
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Active,
                StepStatus::Pending,
                StepStatus::Pending,
                StepStatus::Pending,
            ]
        );
        let markers: Vec<String> = view.steps().iter().map(Step::marker).collect();
        assert_eq!(markers, vec!["✓", "✓", "✓", "✓", "5", "6", "7", "8"]);
        assert_eq!(view.step_counter(), "Step 5 of 8");
        assert_eq!(view.fraction(), 0.625);
    }

    #[test]
    fn unknown_status_scenario() {
        let view = JobCardStepper::new("unknown_legacy_value").view();
        assert_eq!(view.current_index(), 0);
        assert_eq!(view.current().state.id, StateId::Received);
        assert_eq!(view.steps()[0].status, StepStatus::Active);
        assert!(view.steps()[1..].iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(view.step_counter(), "Step 1 of 8");
        assert_eq!(view.fraction(), 0.125);
    }

    #[test]
    fn bogus_status_renders_initial_step() {
        let view = JobCardStepper::new("bogus-status-xyz").view();
        assert_eq!(view.current_index(), 0);
    }

    #[test]
    fn delivered_scenario() {
        let view = JobCardStepper::new("Delivered").view();
        assert_eq!(view.current_index(), 7);
        assert!(view.steps()[..7].iter().all(|s| s.status == StepStatus::Completed));
        assert_eq!(view.steps()[7].status, StepStatus::Active);
        assert_eq!(view.step_counter(), "Step 8 of 8");
        assert_eq!(view.fraction(), 1.0);
    }

    #[test]
    fn connectors_fill_up_to_active_marker() {
        let view = JobCardStepper::new("PDI").view();
        assert_eq!(view.current_index(), 5);
        let filled: Vec<bool> = (0..view.total() - 1).map(|k| view.connector_filled(k)).collect();
        assert_eq!(filled, vec![true, true, true, true, true, false, false]);
    }

    #[test]
    fn backward_jump_fires_callback_once() {
        let mut requested = Vec::new();
        let before;
        let after;
        {
            let mut stepper =
                JobCardStepper::new("In-Progress").on_step_click(|id| requested.push(id));
            before = stepper.view();
            assert_eq!(stepper.activate(2), Some(StateId::Estimated));
            after = stepper.view();
        }
        assert_eq!(requested, vec![StateId::Estimated]);
        assert_eq!(before, after);
        assert_eq!(after.current_index(), 4);
    }

    #[test]
    fn activation_hits_the_id_at_each_index() {
        for (i, expected) in ALL_STATES.iter().enumerate() {
            let mut calls = Vec::new();
            {
                let mut stepper = JobCardStepper::new("Ready").on_step_click(|id| calls.push(id));
                stepper.activate(i);
            }
            assert_eq!(calls, vec![*expected]);
        }
    }

    #[test]
    fn activation_without_callback_is_harmless() {
        let mut stepper = JobCardStepper::new("Diagnosed");
        assert_eq!(stepper.activate(7), Some(StateId::Delivered));
    }

    #[test]
    fn out_of_range_activation_skips_callback() {
        let mut calls = 0;
        {
            let mut stepper = JobCardStepper::new("Diagnosed").on_step_click(|_| calls += 1);
            assert_eq!(stepper.activate(8), None);
        }
        assert_eq!(calls, 0);
    }

    #[test]
    fn regression_renders_earlier_position() {
        let later = JobCardStepper::new("READY").view();
        let earlier = JobCardStepper::new("DIAGNOSED").view();
        assert_eq!(later.current_index(), 6);
        assert_eq!(earlier.current_index(), 1);
    }

    #[test]
    fn missing_state_falls_back_to_initial_index() {
        static PARTIAL: [LifecycleState; 2] = [
            LifecycleState {
                id: StateId::Ready,
                label: "Ready",
                description: "Ready.",
            },
            LifecycleState {
                id: StateId::Delivered,
                label: "Delivered",
                description: "Delivered.",
            },
        ];
        let view = JobCardStepper::new("In-Progress")
            .with_table(LifecycleTable::from_static(&PARTIAL))
            .view();
        assert_eq!(view.current_index(), 0);
        assert_eq!(view.current().state.id, StateId::Ready);
        assert_eq!(view.total(), 2);
    }

    #[test]
    fn cancelled_card_marks_failed_step() {
        let card = JobCard {
            previous_status: Some("CUSTOMER_APPROVAL".into()),
            ..JobCard::new("CANCELLED")
        };
        let view = JobCardStepper::for_job_card(&card).view();
        assert!(view.is_halted());
        assert_eq!(view.current_index(), 2);
        assert_eq!(view.current().status, StepStatus::Failed);
        assert_eq!(view.current().marker(), "✗");
        assert_eq!(view.steps()[1].status, StepStatus::Completed);
        assert_eq!(view.steps()[3].status, StepStatus::Pending);
    }
}
