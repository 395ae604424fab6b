use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A uniqueness or foreign-key constraint rejected a write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store was locked by a concurrent writer.
    #[error("Database busy: {0}")]
    Busy(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, BridgeError::ConstraintViolation(_))
    }

    /// Constraint violations and lock contention may succeed on a rerun.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::ConstraintViolation(_) | BridgeError::Busy(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(BridgeError::ConstraintViolation("UNIQUE".into()).is_retryable());
        assert!(BridgeError::Busy("database is locked".into()).is_retryable());
        assert!(!BridgeError::DatabaseError("no such table".into()).is_retryable());
        assert!(!BridgeError::Busy("x".into()).is_constraint_violation());
    }
}
