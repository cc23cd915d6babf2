use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::mapper::{Disposition, Resolution, StatusMapper};
use super::state::StateId;

/// The slice of a backend job-card document the stepper depends on.
///
/// Everything else on the record (customer, vehicle, line items) is ignored
/// during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCard {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_card_number: Option<String>,
    pub status: String,
    /// Status before the most recent transition, when the backend reports it.
    #[serde(default, alias = "previous_state", skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<String>,
    /// Last modification time. Offset-free timestamps are read as UTC;
    /// empty or unreadable values become `None`.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

// Envelope returned by the API. The transition endpoint reports the
// previous state next to `data` rather than inside it.
#[derive(Deserialize)]
struct Envelope {
    data: JobCard,
    #[serde(default, alias = "previous_status")]
    previous_state: Option<String>,
}

impl JobCard {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            id: None,
            job_card_number: None,
            status: status.into(),
            previous_status: None,
            updated_at: None,
        }
    }

    /// Parse a job card from a JSON document. Accepts both a bare record and
    /// the `{ "success": .., "data": { .. } }` envelope the API wraps it in.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        if document.get("data").is_none() {
            return serde_json::from_value(document);
        }

        let Envelope {
            mut data,
            previous_state,
        } = serde_json::from_value(document)?;
        if data.previous_status.is_none() {
            data.previous_status = previous_state;
        }
        Ok(data)
    }

    /// Human-facing reference: the job-card number, falling back to the id.
    pub fn reference(&self) -> Option<&str> {
        self.job_card_number.as_deref().or(self.id.as_deref())
    }

    /// Resolve the current status, placing a halted card at the position of
    /// its previous status when one is known.
    pub fn resolve(&self) -> Resolution {
        let resolution = StatusMapper::resolve(&self.status);
        match (resolution.disposition, self.previous_status.as_deref()) {
            (Disposition::Halted, Some(previous)) => Resolution {
                state: StatusMapper::map(previous),
                ..resolution
            },
            _ => resolution,
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_timestamp))
}

// RFC 3339 first, then an ISO 8601 date-time without offset taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            debug!(raw, %err, "ignoring unreadable updated_at");
            None
        }
    }
}

/// Body for `POST /api/job-cards/{id}/transition`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub new_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TransitionRequest {
    pub fn to(state: StateId, notes: Option<String>) -> Self {
        Self {
            new_status: state.as_str().to_string(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        }
    }
}
