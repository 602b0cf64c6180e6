#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("Round actor closed")]
    Closed,
    #[error("Internal error: {0}")]
    Internal(String),
}
