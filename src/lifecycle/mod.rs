mod job_card;
mod mapper;
mod state;

pub use job_card::{JobCard, TransitionRequest};
pub use mapper::{Disposition, Resolution, StatusMapper};
pub use state::{LifecycleState, LifecycleTable, StateId};
