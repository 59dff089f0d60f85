use serde::Serialize;
use thiserror::Error;

/// A rejected intent. The state is never changed when one of these is produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Enter a name first")]
    EmptyName,
    #[error("New order must contain exactly the names already in the queue")]
    NotAPermutation,
    #[error("Position {position} is outside the queue (1 to {len})")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("You are not managing the queue")]
    NotManager,
    #[error("This takeover request belongs to {candidate}")]
    NotCandidate { candidate: String },
    #[error("No manager change is waiting for confirmation")]
    NoPendingClaim,
    #[error("The queue changed since you last looked (revision {seen}, now {current}); try again")]
    StaleRevision { seen: u64, current: u64 },
    #[error("Could not save the queue: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    Conflict,
    Persistence,
}

impl QueueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueueError::EmptyName
            | QueueError::NotAPermutation
            | QueueError::PositionOutOfRange { .. }
            | QueueError::NoPendingClaim => ErrorKind::Validation,
            QueueError::NotManager | QueueError::NotCandidate { .. } => ErrorKind::Authorization,
            QueueError::StaleRevision { .. } => ErrorKind::Conflict,
            QueueError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<StoreError> for QueueError {
    fn from(err: StoreError) -> Self {
        QueueError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_classified() {
        assert_eq!(QueueError::EmptyName.kind(), ErrorKind::Validation);
        assert_eq!(QueueError::NotAPermutation.kind(), ErrorKind::Validation);
        assert_eq!(QueueError::NotManager.kind(), ErrorKind::Authorization);
        assert_eq!(
            QueueError::StaleRevision { seen: 1, current: 2 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            QueueError::Persistence("disk full".to_string()).kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn store_errors_become_persistence_warnings() {
        let err: QueueError = StoreError::Io(std::io::Error::other("disk full")).into();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn not_manager_message_is_user_facing() {
        assert_eq!(QueueError::NotManager.to_string(), "You are not managing the queue");
    }
}
