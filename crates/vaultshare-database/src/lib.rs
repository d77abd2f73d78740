//! # vaultshare-database
//!
//! SQLite connection management, embedded migrations, and repositories for
//! file, chunk, and version records.
//!
//! State changes that gate the upload pipeline are single compare-and-set
//! statements, so concurrent callers racing on one file observe each
//! transition at most once.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;

/// Return true if a sqlx error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                || db_err.message().to_ascii_lowercase().contains("unique")
        }
        _ => false,
    }
}
