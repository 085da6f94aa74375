//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum Error {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Team name taken
    #[error("Team {0} already exists")]
    DuplicateTeam(String),

    /// Username taken by another user
    #[error("Username {0} already exists")]
    DuplicateUsername(String),

    /// Pull request id taken
    #[error("Pull request {0} already exists")]
    DuplicatePullRequest(String),

    /// Stored value could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map a unique-constraint violation to `on_unique`, anything else to `Sqlx`
    pub(crate) fn unique_or(err: sqlx::Error, on_unique: impl FnOnce() -> Error) -> Error {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => on_unique(),
            _ => Error::Sqlx(err),
        }
    }
}

impl From<Error> for roster_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::DuplicateTeam(name) => roster_core::Error::TeamAlreadyExists(name),
            Error::DuplicateUsername(name) => roster_core::Error::UsernameAlreadyExists(name),
            Error::DuplicatePullRequest(id) => roster_core::Error::PrAlreadyExists(id),
            other => roster_core::Error::store(other),
        }
    }
}
