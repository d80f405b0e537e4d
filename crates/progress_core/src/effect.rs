use crate::{AnalysisRequest, EntityId, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitAnalysis(AnalysisRequest),
    /// (Re)start the poll timer for a job, replacing any previous one.
    StartPolling { job_id: JobId },
    StopPolling,
    FetchProgress { job_id: JobId, seq: u64 },
    StartAnimation,
    StopAnimation,
    ScheduleHold { job_id: JobId },
    CancelHold,
    Notify(Notice),
}

/// User-facing outcome of an analysis attempt (toast/banner material).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Completed { entity_id: EntityId, job_id: JobId },
    Failed {
        entity_id: EntityId,
        job_id: JobId,
        reason: String,
    },
}
