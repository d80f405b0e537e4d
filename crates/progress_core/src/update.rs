use tracker_logging::{tracker_debug, tracker_info, tracker_trace, tracker_warn};

use crate::{
    normalize_percent, step_toward, Effect, EntityId, EntryStatus, JobId, JobStatus, Msg, Notice,
    Phase, ProgressReport, TrackerState,
};

const DEFAULT_FAILURE_MESSAGE: &str = "Analysis failed";
const DEFAULT_COMPLETION_MESSAGE: &str = "Analysis completed";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    if state.is_disposed() {
        if !matches!(msg, Msg::NoOp) {
            tracker_debug!("Ignoring {:?} on a disposed tracker", msg);
        }
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Start { job_id, entity_id } => start(&mut state, job_id, entity_id),
        Msg::Analyze(request) => {
            let job_id = request.job_id.clone();
            let entity_id = request.entity_id.clone();
            let mut effects = vec![Effect::SubmitAnalysis(request)];
            effects.extend(start(&mut state, job_id, entity_id));
            effects
        }
        Msg::SubmitFailed { job_id, reason } => {
            if state.is_active_job(&job_id) && state.phase() == Phase::Polling {
                fail(&mut state, reason)
            } else {
                tracker_debug!("Submit failure for inactive job {} ignored: {}", job_id, reason);
                Vec::new()
            }
        }
        Msg::PollTick => issue_poll(&mut state),
        Msg::PollResponse {
            job_id,
            seq,
            report,
        } => apply_response(&mut state, job_id, seq, report),
        Msg::PollFailed { job_id, seq, error } => {
            // Transient: the job may still be progressing, the next tick retries.
            tracker_warn!("Progress poll #{} for job {} failed: {}", seq, job_id, error);
            settle_poll(&mut state, &job_id, seq);
            Vec::new()
        }
        Msg::AnimationTick => animate(&mut state),
        Msg::HoldElapsed { job_id } => finish_hold(&mut state, job_id),
        Msg::Dispose => dispose(&mut state),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start(state: &mut TrackerState, job_id: JobId, entity_id: EntityId) -> Vec<Effect> {
    tracker_info!("Tracking job {} for entity {}", job_id, entity_id);
    let mut effects = Vec::with_capacity(3);
    if let Some(previous) = state.begin(job_id.clone(), entity_id) {
        tracker_debug!("Job {} superseded by job {}", previous.job_id, job_id);
        if previous.hold_scheduled {
            effects.push(Effect::CancelHold);
        }
    }
    effects.push(Effect::StartPolling { job_id });
    effects.push(Effect::StartAnimation);
    effects
}

fn issue_poll(state: &mut TrackerState) -> Vec<Effect> {
    if state.phase() != Phase::Polling {
        return Vec::new();
    }
    let Some(job) = state.active_mut() else {
        return Vec::new();
    };
    if job.awaiting_response {
        tracker_trace!("Poll #{} for job {} still in flight", job.poll_seq, job.job_id);
        return Vec::new();
    }
    job.poll_seq += 1;
    job.awaiting_response = true;
    tracker_trace!("Polling job {} (#{})", job.job_id, job.poll_seq);
    vec![Effect::FetchProgress {
        job_id: job.job_id.clone(),
        seq: job.poll_seq,
    }]
}

fn apply_response(
    state: &mut TrackerState,
    job_id: JobId,
    seq: u64,
    report: ProgressReport,
) -> Vec<Effect> {
    let Some(job) = state.active() else {
        tracker_debug!("Dropping response #{} for job {}: nothing active", seq, job_id);
        return Vec::new();
    };
    if job.job_id != job_id {
        tracker_debug!("Dropping response #{} for superseded job {}", seq, job_id);
        return Vec::new();
    }
    if !job.awaiting_response || seq != job.poll_seq {
        tracker_debug!(
            "Dropping stale response #{} for job {} (outstanding #{})",
            seq,
            job_id,
            job.poll_seq
        );
        return Vec::new();
    }
    settle_poll(state, &job_id, seq);
    if state.phase() != Phase::Polling {
        tracker_debug!("Job {} already finalizing; response #{} ignored", job_id, seq);
        return Vec::new();
    }

    let percent = normalize_percent(&report.percent);
    match report.status {
        JobStatus::Failed => {
            let reason = non_empty_or(report.message, DEFAULT_FAILURE_MESSAGE);
            fail(state, reason)
        }
        JobStatus::Completed => complete(state, report.message),
        JobStatus::Running if percent >= 100 => complete(state, report.message),
        JobStatus::Running => {
            raise_target(state, percent, report.message);
            Vec::new()
        }
    }
}

/// The latest poll for the active job has answered; the next tick may poll again.
fn settle_poll(state: &mut TrackerState, job_id: &JobId, seq: u64) {
    if let Some(job) = state.active_mut() {
        if &job.job_id == job_id && job.poll_seq == seq {
            job.awaiting_response = false;
        }
    }
}

fn raise_target(state: &mut TrackerState, percent: u8, message: String) {
    let Some(job) = state.active_mut() else {
        return;
    };
    job.target = job.target.max(percent);
    let entity_id = job.entity_id.clone();

    if let Some(entry) = state.entry_mut(&entity_id) {
        entry.target = entry.target.max(percent);
        if !message.trim().is_empty() {
            entry.message = message;
        }
    }
    state.mark_dirty();
}

fn complete(state: &mut TrackerState, message: String) -> Vec<Effect> {
    let Some(job) = state.active_mut() else {
        return Vec::new();
    };
    job.target = 100;
    let caught_up = job.display >= 100;
    if caught_up {
        job.hold_scheduled = true;
    }
    let job_id = job.job_id.clone();
    let entity_id = job.entity_id.clone();

    if let Some(entry) = state.entry_mut(&entity_id) {
        entry.target = 100;
        entry.display = 100;
        entry.status = EntryStatus::Completed;
        entry.message = non_empty_or(message, DEFAULT_COMPLETION_MESSAGE);
    }
    state.set_phase(Phase::Completing);
    state.mark_dirty();
    tracker_info!("Job {} for entity {} reported completion", job_id, entity_id);

    let mut effects = vec![Effect::StopPolling];
    if caught_up {
        effects.push(Effect::ScheduleHold { job_id });
    }
    effects
}

fn fail(state: &mut TrackerState, reason: String) -> Vec<Effect> {
    let Some(job) = state.release_active() else {
        return Vec::new();
    };
    if let Some(entry) = state.entry_mut(&job.entity_id) {
        entry.display = entry.target;
        entry.status = EntryStatus::Failed;
        entry.message = reason.clone();
    }
    tracker_warn!(
        "Job {} for entity {} failed: {}",
        job.job_id,
        job.entity_id,
        reason
    );

    let mut effects = vec![Effect::StopPolling, Effect::StopAnimation];
    if job.hold_scheduled {
        effects.push(Effect::CancelHold);
    }
    effects.push(Effect::Notify(Notice::Failed {
        entity_id: job.entity_id,
        job_id: job.job_id,
        reason,
    }));
    effects
}

fn animate(state: &mut TrackerState) -> Vec<Effect> {
    let phase = state.phase();
    if !matches!(phase, Phase::Polling | Phase::Completing) {
        return Vec::new();
    }
    let Some(job) = state.active_mut() else {
        return Vec::new();
    };

    let next = step_toward(job.display, job.target);
    let moved = next != job.display;
    job.display = next;
    let should_hold = phase == Phase::Completing && next >= 100 && !job.hold_scheduled;
    if should_hold {
        job.hold_scheduled = true;
    }
    let job_id = job.job_id.clone();
    let entity_id = job.entity_id.clone();

    if moved {
        if let Some(entry) = state.entry_mut(&entity_id) {
            if entry.status == EntryStatus::Running {
                entry.display = next.min(entry.target);
            }
        }
        state.mark_dirty();
    }

    if should_hold {
        vec![Effect::ScheduleHold { job_id }]
    } else {
        Vec::new()
    }
}

fn finish_hold(state: &mut TrackerState, job_id: JobId) -> Vec<Effect> {
    if state.phase() != Phase::Completing || !state.is_active_job(&job_id) {
        tracker_debug!("Hold elapsed for job {} that is no longer completing", job_id);
        return Vec::new();
    }
    let Some(job) = state.release_active() else {
        return Vec::new();
    };
    tracker_info!("Analysis of entity {} finished (job {})", job.entity_id, job.job_id);
    vec![
        Effect::StopAnimation,
        Effect::Notify(Notice::Completed {
            entity_id: job.entity_id,
            job_id: job.job_id,
        }),
    ]
}

fn dispose(state: &mut TrackerState) -> Vec<Effect> {
    if let Some(job) = state.release_active() {
        tracker_info!("Tracker disposed while job {} was active", job.job_id);
    }
    state.mark_disposed();
    vec![Effect::StopPolling, Effect::StopAnimation, Effect::CancelHold]
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
