use tracing::{debug, warn};

use super::state::StateId;

/// Canonical state assigned to any status string the table does not know.
///
/// An unrecognized status must never imply progress, so it lands on the
/// initial state.
pub const DEFAULT_STATE: StateId = StateId::Received;

/// Whether the job card is still moving through the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Open,
    /// Cancelled or rejected; the job card will not progress further.
    Halted,
}

/// Outcome of mapping a raw status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub state: StateId,
    pub disposition: Disposition,
    /// False when `state` is [`DEFAULT_STATE`] only because the raw value
    /// was not in the table.
    pub recognized: bool,
}

// Normalized raw status -> canonical state. Keys cover the canonical ids,
// the backend FSM values and the legacy dashboard values.
const STATUS_TABLE: &[(&str, StateId)] = &[
    ("received", StateId::Received),
    ("created", StateId::Received),
    ("pending", StateId::Received),
    ("new", StateId::Received),
    ("open", StateId::Received),
    ("checked_in", StateId::Received),
    ("context_verified", StateId::Received),
    ("diagnosed", StateId::Diagnosed),
    ("diagnosis", StateId::Diagnosed),
    ("inspected", StateId::Diagnosed),
    ("estimated", StateId::Estimated),
    ("estimate_ready", StateId::Estimated),
    ("quoted", StateId::Estimated),
    ("customer_approval", StateId::Estimated),
    ("awaiting_approval", StateId::Estimated),
    ("approved", StateId::Approved),
    ("customer_approved", StateId::Approved),
    ("in_progress", StateId::InProgress),
    ("inprogress", StateId::InProgress),
    ("work_in_progress", StateId::InProgress),
    ("wip", StateId::InProgress),
    ("awaiting_parts", StateId::InProgress),
    ("on_hold", StateId::InProgress),
    ("concern_raised", StateId::InProgress),
    ("quality_check", StateId::QualityCheck),
    ("qc", StateId::QualityCheck),
    ("qc_check", StateId::QualityCheck),
    ("pdi", StateId::QualityCheck),
    ("ready", StateId::Ready),
    ("ready_for_delivery", StateId::Ready),
    ("pdi_completed", StateId::Ready),
    ("invoiced", StateId::Ready),
    ("delivered", StateId::Delivered),
    ("closed", StateId::Delivered),
    ("completed", StateId::Delivered),
];

// Statuses that stop the lifecycle. They carry no position of their own.
const HALTED_STATUSES: &[&str] = &["cancelled", "canceled", "rejected"];

/// Maps raw job-card status strings onto the canonical lifecycle.
pub struct StatusMapper;

impl StatusMapper {
    /// Canonical state for `raw`. Total: unknown input yields [`DEFAULT_STATE`].
    pub fn map(raw: &str) -> StateId {
        Self::resolve(raw).state
    }

    /// Full mapping outcome for `raw`, including whether the value was known
    /// and whether it halts the lifecycle.
    pub fn resolve(raw: &str) -> Resolution {
        let key = normalize(raw);

        if HALTED_STATUSES.contains(&key.as_str()) {
            debug!(raw_status = raw, "job status halts the lifecycle");
            return Resolution {
                state: DEFAULT_STATE,
                disposition: Disposition::Halted,
                recognized: true,
            };
        }

        match STATUS_TABLE.iter().find(|&&(k, _)| k == key) {
            Some(&(_, state)) => Resolution {
                state,
                disposition: Disposition::Open,
                recognized: true,
            },
            None => {
                warn!(
                    raw_status = raw,
                    default = %DEFAULT_STATE,
                    "unrecognized job status, using default lifecycle state"
                );
                Resolution {
                    state: DEFAULT_STATE,
                    disposition: Disposition::Open,
                    recognized: false,
                }
            }
        }
    }
}

/// Lowercases `raw` and folds separators (`-`, `_`, `.`, `/`, whitespace)
/// into single underscores, trimming them at both ends.
fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.chars() {
        if c.is_whitespace() || matches!(c, '-' | '_' | '.' | '/') {
            pending_sep = !out.is_empty();
            continue;
        }
        if pending_sep {
            out.push('_');
            pending_sep = false;
        }
        out.extend(c.to_lowercase());
    }

    out
}
