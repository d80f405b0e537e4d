//! Progress core: pure state machine for following remote analysis jobs.
mod effect;
mod msg;
mod percent;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice};
pub use msg::{AnalysisRequest, JobStatus, Msg, ProgressReport};
pub use percent::{normalize_percent, step_toward, RawPercent};
pub use state::{
    ActiveJob, EntityId, EntryStatus, JobId, Phase, ProgressEntry, TrackerConfig, TrackerState,
};
pub use update::update;
pub use view_model::{ActiveJobView, EntryRowView, TrackerViewModel};
