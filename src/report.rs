//! The shared failure sink.
//!
//! A [`FailureReport`] is the only object mutated by concurrent deletion tasks, so
//! appends are serialized behind a mutex. Recording never fails and never aborts
//! the run; the suite is marked failed at the end if any item failed, but
//! individual failures stay isolated so one defect does not mask another.

use crate::error::FailureKind;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, warn};

/// One recorded failure with enough context to localize the defect.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Failure category.
    pub kind: FailureKind,
    /// Operation that failed, e.g. `create profile_parameter`.
    pub operation: String,
    /// Target keys the operation addressed, e.g. `P1/PARAM1` or `(5, 9)`.
    pub target: String,
    /// Underlying error or assertion message.
    pub detail: String,
    /// When the failure was recorded.
    pub at: DateTime<Utc>,
}

impl Failure {
    /// Build a failure record.
    pub fn new(
        kind: FailureKind,
        operation: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            operation: operation.into(),
            target: target.into(),
            detail: detail.into(),
            at: Utc::now(),
        }
    }

    /// A prerequisite fixture phase failed.
    pub fn dependency(
        operation: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(FailureKind::DependencyCreation, operation, target, detail)
    }

    /// A network CRUD call failed.
    pub fn client_call(
        operation: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(FailureKind::ClientCall, operation, target, detail)
    }

    /// A post-condition check failed.
    pub fn verification(
        operation: impl Into<String>,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(FailureKind::Verification, operation, target, detail)
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.kind, self.operation, self.target, self.detail
        )
    }
}

/// Concurrency-safe append sink aggregating all failures of a run.
///
/// Clones share the same underlying sink, so a clone can be handed to each
/// concurrent deletion task.
#[derive(Debug, Clone, Default)]
pub struct FailureReport {
    inner: Arc<Mutex<Vec<Failure>>>,
}

impl FailureReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a failure. Also logs it; dependency-phase failures log at warn
    /// since later phases still run best-effort.
    pub fn record(&self, failure: Failure) {
        match failure.kind {
            FailureKind::DependencyCreation => warn!(
                kind = %failure.kind,
                operation = %failure.operation,
                target = %failure.target,
                "{}",
                failure.detail
            ),
            FailureKind::ClientCall | FailureKind::Verification => error!(
                kind = %failure.kind,
                operation = %failure.operation,
                target = %failure.target,
                "{}",
                failure.detail
            ),
        }
        self.lock().push(failure);
    }

    /// Snapshot of all failures recorded so far.
    pub fn failures(&self) -> Vec<Failure> {
        self.lock().clone()
    }

    /// Number of failures recorded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing failed yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True if the run passed, i.e. no failure of any kind was recorded.
    pub fn passed(&self) -> bool {
        self.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Failure>> {
        // A poisoned sink still holds every failure recorded before the panic.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
