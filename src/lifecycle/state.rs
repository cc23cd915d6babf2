use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical lifecycle stages of a job card.
///
/// Declaration order is the progress order: a job card flows
/// RECEIVED → DIAGNOSED → ESTIMATED → APPROVED → IN_PROGRESS →
/// QUALITY_CHECK → READY → DELIVERED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateId {
    Received,
    Diagnosed,
    Estimated,
    Approved,
    InProgress,
    QualityCheck,
    Ready,
    Delivered,
}

impl StateId {
    /// Stable snake_case identifier, also used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            StateId::Received => "received",
            StateId::Diagnosed => "diagnosed",
            StateId::Estimated => "estimated",
            StateId::Approved => "approved",
            StateId::InProgress => "in_progress",
            StateId::QualityCheck => "quality_check",
            StateId::Ready => "ready",
            StateId::Delivered => "delivered",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleState {
    pub id: StateId,
    pub label: &'static str,
    pub description: &'static str,
}

static CANONICAL_STATES: [LifecycleState; 8] = [
    LifecycleState {
        id: StateId::Received,
        label: "Received",
        description: "Vehicle checked in and job card opened.",
    },
    LifecycleState {
        id: StateId::Diagnosed,
        label: "Diagnosed",
        description: "Inspection done and faults identified.",
    },
    LifecycleState {
        id: StateId::Estimated,
        label: "Estimated",
        description: "Repair estimate prepared and sent for customer approval.",
    },
    LifecycleState {
        id: StateId::Approved,
        label: "Approved",
        description: "Customer approved the estimate; work can be scheduled.",
    },
    LifecycleState {
        id: StateId::InProgress,
        label: "In Progress",
        description: "Technicians are working on the vehicle.",
    },
    LifecycleState {
        id: StateId::QualityCheck,
        label: "Quality Check",
        description: "Pre-delivery inspection of the completed work.",
    },
    LifecycleState {
        id: StateId::Ready,
        label: "Ready",
        description: "Work passed inspection; invoice issued and vehicle ready for pickup.",
    },
    LifecycleState {
        id: StateId::Delivered,
        label: "Delivered",
        description: "Vehicle handed back to the customer and job card closed.",
    },
];

/// Read-only view over an ordered, duplicate-free lifecycle sequence.
///
/// The canonical table is a process-wide static; every accessor borrows
/// from it, so copies of the table are free and never diverge.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleTable {
    states: &'static [LifecycleState],
}

impl LifecycleTable {
    /// The canonical job-card lifecycle.
    pub fn canonical() -> Self {
        Self {
            states: &CANONICAL_STATES,
        }
    }

    /// A table over an arbitrary static sequence. Only tests build these,
    /// to exercise lookups that the canonical table always satisfies.
    #[cfg(test)]
    pub(crate) fn from_static(states: &'static [LifecycleState]) -> Self {
        assert!(!states.is_empty(), "lifecycle table must not be empty");
        Self { states }
    }

    /// States in progress order.
    pub fn states(&self) -> &'static [LifecycleState] {
        self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Position of `id` in the sequence, if the table contains it.
    pub fn index_of(&self, id: StateId) -> Option<usize> {
        self.states.iter().position(|s| s.id == id)
    }

    pub fn get(&self, id: StateId) -> Option<&'static LifecycleState> {
        self.states.iter().find(|s| s.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&'static LifecycleState> {
        self.states.get(index)
    }

    pub fn initial(&self) -> &'static LifecycleState {
        &self.states[0]
    }

    pub fn terminal(&self) -> &'static LifecycleState {
        &self.states[self.states.len() - 1]
    }
}
