//! Dashboard error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] gex_core::CoreError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] gex_persistence::PersistenceError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
