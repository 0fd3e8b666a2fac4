//! Error taxonomy for planning and optimization.
//!
//! Validation and conflict errors are raised before any work starts.
//! Optimization quality problems (unmet hard constraints, infeasible
//! rosters) are never errors: they are reported as data inside an
//! [`OptimizationResult`](crate::optimizer::OptimizationResult).

use crate::validation::ValidationError;

/// Errors returned by the plan manager and optimizer construction.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Malformed plan or algorithm parameters. Carries every issue found.
    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// The operation collides with the plan's current state or an active run.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown plan id.
    #[error("plan '{0}' not found")]
    NotFound(String),

    /// A collaborator (directory, catalog, persistence, exporter) failed.
    #[error("system error: {0}")]
    System(#[from] CollaboratorError),
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

impl ScheduleError {
    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a not-found error for a plan id.
    pub fn not_found(plan_id: impl Into<String>) -> Self {
        Self::NotFound(plan_id.into())
    }
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{service} failed: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed (e.g. "plan repository").
    pub service: String,
    /// Human-readable cause.
    pub message: String,
}

impl CollaboratorError {
    /// Creates a collaborator error.
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
