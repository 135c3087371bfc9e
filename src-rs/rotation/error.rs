use thiserror::Error;

/// Failures surfaced by the rotation store.
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no messages available")]
    EmptyPool,

    /// A second usage record for the same (item, cycle) pair. Only reachable
    /// if draw serialization is broken.
    #[error("item {item_id} already used in cycle {cycle}")]
    DuplicateUsage { item_id: i64, cycle: i64 },

    #[error("failed to load item pool: {reason}")]
    Load { reason: String },
}

pub type Result<T> = std::result::Result<T, RotationError>;

impl RotationError {
    pub fn load(reason: impl Into<String>) -> Self {
        RotationError::Load {
            reason: reason.into(),
        }
    }

    /// Machine-readable code used in API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            RotationError::Storage(_) | RotationError::Io(_) => "STORAGE_ERROR",
            RotationError::EmptyPool => "NO_MESSAGES",
            RotationError::DuplicateUsage { .. } => "CONSISTENCY_ERROR",
            RotationError::Load { .. } => "LOAD_ERROR",
        }
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, RotationError::Storage(_) | RotationError::Io(_))
    }
}

/// True when a rusqlite error is a UNIQUE/constraint violation.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ffi::ErrorCode::ConstraintViolation,
                ..
            },
            _,
        )
    )
}
