//! Error taxonomy for a pipeline run
//!
//! `TransformError` is always recovered where it happens. `FetchError` and
//! `WriteError` end the pipeline of a single resource type and surface as a
//! [`PipelineError`] in the run summary.

use std::path::PathBuf;

use crate::resource::ResourceType;

/// A page request failed
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Failed to fetch {resource} page {page}: {reason}")]
pub struct FetchError {
    pub resource: ResourceType,
    pub page: u32,
    pub reason: String,
}

impl FetchError {
    pub fn new(resource: ResourceType, page: u32, reason: impl Into<String>) -> Self {
        Self {
            resource,
            page,
            reason: reason.into(),
        }
    }
}

/// A date field could not be converted and was left as is
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Cannot convert date field '{field}': {reason}")]
pub struct TransformError {
    pub field: String,
    pub reason: String,
}

/// Output file could not be written
#[derive(thiserror::Error, Debug)]
#[error("Failed to write {resource} to {}: {reason}", .path.display())]
pub struct WriteError {
    pub resource: ResourceType,
    pub path: PathBuf,
    pub reason: String,
}

impl WriteError {
    pub fn new(resource: ResourceType, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            resource,
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Why a resource type ended up `Failed`
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
