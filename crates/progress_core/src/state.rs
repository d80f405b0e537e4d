use std::collections::BTreeMap;
use std::fmt;

use crate::view_model::{ActiveJobView, EntryRowView, TrackerViewModel};

/// Identifier of the tracked entity (a company record).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, caller-supplied identifier of a remote analysis job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for a new analysis.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

/// Progress of one entity. `display <= target <= 100` at all times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub job_id: JobId,
    pub target: u8,
    pub display: u8,
    pub message: String,
    pub status: EntryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Polling,
    Completing,
}

/// The job currently driving polling and the animated overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub job_id: JobId,
    pub entity_id: EntityId,
    pub target: u8,
    pub display: u8,
    /// Sequence number of the most recently issued poll.
    pub poll_seq: u64,
    /// A poll has been issued and neither its response nor its failure has
    /// come back yet. No further poll is issued meanwhile.
    pub awaiting_response: bool,
    pub hold_scheduled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub seed_percent: u8,
    pub start_message: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            seed_percent: 10,
            start_message: "Starting analysis...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    config: TrackerConfig,
    phase: Phase,
    active: Option<ActiveJob>,
    entries: BTreeMap<EntityId, ProgressEntry>,
    disposed: bool,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        let seed_percent = config.seed_percent.min(100);
        Self {
            config: TrackerConfig {
                seed_percent,
                ..config
            },
            ..Self::default()
        }
    }

    pub fn view(&self) -> TrackerViewModel {
        TrackerViewModel {
            phase: self.phase,
            analyzing: self.is_analyzing(),
            active: self.active.as_ref().map(|job| ActiveJobView {
                job_id: job.job_id.clone(),
                entity_id: job.entity_id.clone(),
                target: job.target,
                display: job.display,
            }),
            entries: self
                .entries
                .iter()
                .map(|(entity_id, entry)| EntryRowView {
                    entity_id: entity_id.clone(),
                    job_id: entry.job_id.clone(),
                    target: entry.target,
                    display: entry.display,
                    message: entry.message.clone(),
                    status: entry.status,
                })
                .collect(),
            disposed: self.disposed,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn active(&self) -> Option<&ActiveJob> {
        self.active.as_ref()
    }

    pub fn entry(&self, entity_id: &EntityId) -> Option<&ProgressEntry> {
        self.entries.get(entity_id)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut ActiveJob> {
        self.active.as_mut()
    }

    pub(crate) fn is_active_job(&self, job_id: &JobId) -> bool {
        self.active.as_ref().is_some_and(|job| &job.job_id == job_id)
    }

    pub(crate) fn entry_mut(&mut self, entity_id: &EntityId) -> Option<&mut ProgressEntry> {
        self.entries.get_mut(entity_id)
    }

    /// Install a new active job and seed its entity entry. Returns the
    /// previously active job, if one was superseded.
    pub(crate) fn begin(&mut self, job_id: JobId, entity_id: EntityId) -> Option<ActiveJob> {
        let seed = self.config.seed_percent;
        let entry = ProgressEntry {
            job_id: job_id.clone(),
            target: seed,
            display: seed,
            message: self.config.start_message.clone(),
            status: EntryStatus::Running,
        };
        self.entries.insert(entity_id.clone(), entry);
        self.phase = Phase::Polling;
        self.dirty = true;
        self.active.replace(ActiveJob {
            job_id,
            entity_id,
            target: seed,
            display: seed,
            poll_seq: 0,
            awaiting_response: false,
            hold_scheduled: false,
        })
    }

    pub(crate) fn release_active(&mut self) -> Option<ActiveJob> {
        self.phase = Phase::Idle;
        self.dirty = true;
        self.active.take()
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
        self.dirty = true;
    }
}
