use progress_core::{EntityId, EntryStatus, Notice, Phase, TrackerViewModel};

const BAR_WIDTH: usize = 20;

/// One status line for `entity_id`. Uses the animated overlay while the
/// entity is the active job, the list entry otherwise.
pub fn progress_line(view: &TrackerViewModel, entity_id: &EntityId) -> Option<String> {
    let entry = view.entry(entity_id)?;
    let percent = match &view.active {
        Some(active) if &active.entity_id == entity_id => active.display,
        _ => entry.display,
    };
    let label = match (entry.status, view.phase) {
        (EntryStatus::Failed, _) => "failed",
        (EntryStatus::Completed, Phase::Completing) => "finishing",
        (EntryStatus::Completed, _) => "completed",
        (EntryStatus::Running, _) => "running",
    };
    Some(format!(
        "{} [{}] {:>3}% {:<9} {}",
        entity_id,
        bar(percent),
        percent,
        label,
        entry.message
    ))
}

pub fn notice_line(notice: &Notice) -> String {
    match notice {
        Notice::Completed { entity_id, job_id } => {
            format!("Analysis of {entity_id} completed (job {job_id})")
        }
        Notice::Failed {
            entity_id,
            job_id,
            reason,
        } => format!("Analysis of {entity_id} failed (job {job_id}): {reason}"),
    }
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
