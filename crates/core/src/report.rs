//! Pipeline stages and the reporting interface
//!
//! Components report progress through a [`Reporter`] handed to them instead
//! of reaching for a global logger. The binary supplies an implementation
//! backed by the `log` facade; tests supply [`MemoryReporter`].

use std::cell::RefCell;
use std::fmt;
use std::path::Path;

use crate::error::{PipelineError, TransformError};
use crate::page::StopReason;
use crate::resource::ResourceType;

/// Lifecycle of one resource type within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Fetching,
    Transforming,
    Writing,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_advance_to(&self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Pending, Stage::Fetching)
                | (Stage::Fetching, Stage::Transforming)
                | (Stage::Transforming, Stage::Writing)
                | (Stage::Writing, Stage::Done)
                | (Stage::Fetching | Stage::Writing, Stage::Failed)
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Pending => "pending",
            Stage::Fetching => "fetching",
            Stage::Transforming => "transforming",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Sink for progress and error events
pub trait Reporter {
    fn stage(&self, resource: ResourceType, stage: Stage);

    fn page_fetched(&self, resource: ResourceType, page: u32, records: usize);

    fn backoff(&self, resource: ResourceType, page: u32, secs: u64);

    fn pagination_stopped(&self, resource: ResourceType, page: u32, reason: StopReason);

    fn transform_error(&self, resource: ResourceType, error: &TransformError);

    fn written(&self, resource: ResourceType, path: &Path, rows: usize);

    fn failed(&self, resource: ResourceType, error: &PipelineError);
}

/// Event captured by [`MemoryReporter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Stage(ResourceType, Stage),
    PageFetched(ResourceType, u32, usize),
    Backoff(ResourceType, u32, u64),
    PaginationStopped(ResourceType, u32, StopReason),
    TransformError(ResourceType, String),
    Written(ResourceType, usize),
    Failed(ResourceType, String),
}

/// Reporter that keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: RefCell<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Stages a resource type went through, in order
    pub fn stages(&self, resource: ResourceType) -> Vec<Stage> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Stage(r, stage) if *r == resource => Some(*stage),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl Reporter for MemoryReporter {
    fn stage(&self, resource: ResourceType, stage: Stage) {
        self.push(Event::Stage(resource, stage));
    }

    fn page_fetched(&self, resource: ResourceType, page: u32, records: usize) {
        self.push(Event::PageFetched(resource, page, records));
    }

    fn backoff(&self, resource: ResourceType, page: u32, secs: u64) {
        self.push(Event::Backoff(resource, page, secs));
    }

    fn pagination_stopped(&self, resource: ResourceType, page: u32, reason: StopReason) {
        self.push(Event::PaginationStopped(resource, page, reason));
    }

    fn transform_error(&self, resource: ResourceType, error: &TransformError) {
        self.push(Event::TransformError(resource, error.field.clone()));
    }

    fn written(&self, resource: ResourceType, _path: &Path, rows: usize) {
        self.push(Event::Written(resource, rows));
    }

    fn failed(&self, resource: ResourceType, error: &PipelineError) {
        self.push(Event::Failed(resource, error.to_string()));
    }
}
