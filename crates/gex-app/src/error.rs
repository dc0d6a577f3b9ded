//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] gex_feed::FeedError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] gex_persistence::PersistenceError),

    #[error("Dashboard error: {0}")]
    Dashboard(#[from] gex_dashboard::DashboardError),
}

pub type AppResult<T> = Result<T, AppError>;
