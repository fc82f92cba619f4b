use thiserror::Error;

/// Errors that can occur during time tracking operations.
#[derive(Debug, Error)]
pub enum TimeTrackingError {
    #[error("an open session already exists")]
    SessionConflict,
    #[error("no active session")]
    NoActiveSession,
    #[error("no paused session")]
    NoPausedSession,
    #[error("no open session")]
    NoOpenSession,
    #[error("{0}")]
    Validation(String),
    #[error("session store failure: {0}")]
    Store(String),
}

impl TimeTrackingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
