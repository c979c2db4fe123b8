//! Shared error types for the services crate.

use thiserror::Error;

use journey_core::model::JourneyError;
use storage::repository::StorageError;

/// Errors emitted by the AI generator clients.
///
/// These never escape the services layer: every generation failure is
/// recovered locally with deterministic fallback content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("generator is not configured")]
    Disabled,
    #[error("generator returned an empty response")]
    EmptyResponse,
    #[error("generator request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("generator returned malformed content: {0}")]
    MalformedContent(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `LessonLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error(transparent)]
    Journey(#[from] JourneyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PlanService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
