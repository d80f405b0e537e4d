#![allow(dead_code)]

use std::sync::Once;

use progress_core::{
    update, Effect, EntityId, JobId, JobStatus, Msg, ProgressReport, RawPercent, TrackerState,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

pub fn job(id: &str) -> JobId {
    JobId::new(id)
}

pub fn entity(id: &str) -> EntityId {
    EntityId::new(id)
}

pub fn started(job_id: &str, entity_id: &str) -> TrackerState {
    let (state, _) = update(
        TrackerState::new(),
        Msg::Start {
            job_id: job(job_id),
            entity_id: entity(entity_id),
        },
    );
    state
}

pub fn running(percent: f64, message: &str) -> ProgressReport {
    ProgressReport {
        percent: RawPercent::Number(percent),
        message: message.to_string(),
        status: JobStatus::Running,
    }
}

pub fn completed() -> ProgressReport {
    ProgressReport {
        percent: RawPercent::Number(100.0),
        message: "Done".to_string(),
        status: JobStatus::Completed,
    }
}

pub fn failed(message: &str) -> ProgressReport {
    ProgressReport {
        percent: RawPercent::Number(0.0),
        message: message.to_string(),
        status: JobStatus::Failed,
    }
}

/// Issue a poll for the active job and answer it with `report`.
pub fn poll(state: TrackerState, report: ProgressReport) -> (TrackerState, Vec<Effect>) {
    let (state, effects) = update(state, Msg::PollTick);
    let (job_id, seq) = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchProgress { job_id, seq } => Some((job_id.clone(), *seq)),
            _ => None,
        })
        .expect("fetch effect");
    update(
        state,
        Msg::PollResponse {
            job_id,
            seq,
            report,
        },
    )
}

pub fn tick(state: TrackerState) -> (TrackerState, Vec<Effect>) {
    update(state, Msg::AnimationTick)
}
