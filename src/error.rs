use derive_more::Display;

use crate::model::leave_request::LeaveStatus;

/// Core error taxonomy. None of these drive normal control flow; each
/// carries enough context (request id, attempted transition, cause) to be
/// logged and displayed.
#[derive(Debug, Display)]
pub enum CoreError {
    /// Malformed or incomplete input. No state change.
    #[display(fmt = "validation failed: {}", _0)]
    Validation(String),

    /// Transition or edit attempted on a request that is no longer pending.
    /// No state change.
    #[display(fmt = "leave request {} is {}, not pending", id, status)]
    InvalidState { id: String, status: LeaveStatus },

    /// Storage-level failure (timeout, connectivity). Surfaced to the
    /// caller as-is; the core never retries.
    #[display(fmt = "storage error: {}", _0)]
    Transient(sqlx::Error),

    /// The Accepted transition was persisted but the attendance-summary
    /// write failed. The status change is NOT rolled back.
    #[display(fmt = "leave request {} accepted, but summary update failed: {}", id, cause)]
    PartialSideEffect { id: String, cause: Box<CoreError> },
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Transient(e) => Some(e),
            CoreError::PartialSideEffect { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Transient(e)
    }
}
