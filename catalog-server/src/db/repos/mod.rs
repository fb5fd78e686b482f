//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - One transaction per logical write operation; an early error return
//!   drops the transaction, which rolls it back
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Reads use single statements so a response never observes a
//!   half-replaced association set

pub mod categories;
pub mod products;
pub mod users;

pub use categories::CategoryRepo;
pub use products::ProductRepo;
pub use users::UserRepo;

/// Database error taxonomy surfaced to callers.
///
/// Callers can distinguish retryable store failures (`Sqlx`) from input
/// errors (`AlreadyExists`, `CategoryNotFound`, `NoFieldsToUpdate`) from
/// "nothing to act on" (`NotFound`), independent of the store's native
/// error text.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{resource} '{name}' already exists")]
    AlreadyExists { resource: &'static str, name: String },

    #[error("category '{name}' does not exist")]
    CategoryNotFound { name: String },

    #[error("no fields to update")]
    NoFieldsToUpdate,
}

/// Map a unique-constraint violation to `AlreadyExists`, passing other
/// errors through as store failures.
pub(crate) fn on_unique_violation(
    err: sqlx::Error,
    resource: &'static str,
    name: &str,
) -> DbError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return DbError::AlreadyExists {
                resource,
                name: name.to_owned(),
            };
        }
    }
    DbError::Sqlx(err)
}
