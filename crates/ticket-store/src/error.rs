use common::OrderId;
use thiserror::Error;

/// Errors that can occur when interacting with the ticket store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested quantity exceeds the remaining stock.
    /// Carries the true remaining count for the client message.
    #[error("insufficient stock: {remaining} remaining")]
    InsufficientStock { requested: i64, remaining: i64 },

    /// No order row exists with the given id.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for ticket store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
