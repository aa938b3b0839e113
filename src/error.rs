//! Error types for the harness.
//!
//! Two layers of errors exist here. [`SessionError`] is the collaborator-level error
//! returned by every [`crate::session::ConfOpsSession`] call: transport failures,
//! non-success HTTP statuses, and body-decoding problems. [`HarnessError`] covers the
//! harness's own setup concerns (configuration and fixture loading).
//!
//! Neither of these terminates a suite run. Failures observed while the lifecycle
//! phases execute are converted into [`crate::report::Failure`] records, tagged with a
//! [`FailureKind`], and collected into the shared report; the run always continues to
//! completion.

use thiserror::Error;

// =============================================================================
// Session Errors
// =============================================================================

/// Convenience alias for session call results.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Error returned by a `ConfOpsSession` CRUD call.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code of the response.
        status: u16,
        /// Server-provided error detail, if any.
        message: String,
    },

    /// The request never produced a usable response (connection refused,
    /// timeout, broken pipe).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response arrived but its body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl SessionError {
    /// Shorthand for an HTTP-status error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }
}

// =============================================================================
// Harness Errors
// =============================================================================

/// Convenience alias for results using the harness error type.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Primary error type for harness setup and teardown outside the phase loop.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Configuration file parsing failed.
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration values parsed but failed semantic validation.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Standard I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture JSON could not be decoded.
    #[error("Fixture error: {0}")]
    Fixture(#[from] serde_json::Error),
}

// =============================================================================
// Failure Taxonomy
// =============================================================================

/// Category of a recorded suite failure.
///
/// `Verification` is the higher-signal kind: it marks a post-condition violation
/// (a deleted record still resolvable, a created record not retrievable) rather
/// than a transport problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A prerequisite fixture phase failed; later phases still run.
    DependencyCreation,
    /// A create/read/delete call against the API errored.
    ClientCall,
    /// A post-condition check failed.
    Verification,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::DependencyCreation => "dependency_creation",
            FailureKind::ClientCall => "client_call",
            FailureKind::Verification => "verification",
        };
        write!(f, "{}", label)
    }
}
