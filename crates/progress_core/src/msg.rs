use crate::{EntityId, JobId, RawPercent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Anything that is not "completed" or "failed" counts as running.
    pub fn from_wire(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Running,
        }
    }
}

/// Decoded payload of one successful progress poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub percent: RawPercent,
    pub message: String,
    pub status: JobStatus,
}

/// Identifying fields submitted to the start-analysis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub job_id: JobId,
    pub entity_id: EntityId,
    pub company_name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Follow an already submitted job for an entity.
    Start { job_id: JobId, entity_id: EntityId },
    /// Submit a new analysis and follow it.
    Analyze(AnalysisRequest),
    /// The start-analysis request itself failed.
    SubmitFailed { job_id: JobId, reason: String },
    /// Poll timer fired.
    PollTick,
    /// A poll returned a decodable payload.
    PollResponse {
        job_id: JobId,
        seq: u64,
        report: ProgressReport,
    },
    /// A poll failed in transport or decoding.
    PollFailed {
        job_id: JobId,
        seq: u64,
        error: String,
    },
    /// Animation timer fired.
    AnimationTick,
    /// The completion hold for a job has elapsed.
    HoldElapsed { job_id: JobId },
    /// The owning view is going away.
    Dispose,
    NoOp,
}
