use crate::{EntityId, EntryStatus, JobId, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerViewModel {
    pub phase: Phase,
    /// The global "is analyzing" flag.
    pub analyzing: bool,
    pub active: Option<ActiveJobView>,
    pub entries: Vec<EntryRowView>,
    pub disposed: bool,
}

impl TrackerViewModel {
    pub fn entry(&self, entity_id: &EntityId) -> Option<&EntryRowView> {
        self.entries.iter().find(|row| &row.entity_id == entity_id)
    }
}

/// Detail/overlay view of the job being animated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJobView {
    pub job_id: JobId,
    pub entity_id: EntityId,
    pub target: u8,
    pub display: u8,
}

/// List view row for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRowView {
    pub entity_id: EntityId,
    pub job_id: JobId,
    pub target: u8,
    pub display: u8,
    pub message: String,
    pub status: EntryStatus,
}
