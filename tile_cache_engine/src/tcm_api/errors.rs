use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ReconcileError {
    pub(crate) fn database<E: std::error::Error>(e: E) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
