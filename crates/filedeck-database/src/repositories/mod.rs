//! SQL statements for folders and files.

pub mod file;
pub mod folder;

/// Whether the error is a unique violation on the named constraint or index.
pub(crate) fn is_unique_violation(error: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error)
            if db_error.is_unique_violation() && db_error.constraint() == Some(constraint)
    )
}

/// Whether the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation()
    )
}
