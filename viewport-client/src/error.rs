//! Error types for viewport access

use std::time::Duration;
use thiserror::Error;

pub type ViewportResult<T> = Result<T, ViewportError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewportError {
    #[error("Viewport is not mounted")]
    Unavailable,

    #[error("Viewport not ready after {0:?}")]
    ReadyTimeout(Duration),

    #[error("Viewport slot was dropped")]
    Detached,
}
