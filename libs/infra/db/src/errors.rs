// [libs/infra/db/src/errors.rs]
/*!
 * MODULE: DATABASE ERROR CATALOG
 * LAYER: INFRASTRUCTURE (L3)
 * RESPONSIBILITY: SEMANTIC CLASSIFICATION OF PERSISTENCE FAILURES
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database configuration invalid: {0}")]
    Configuration(String),

    #[error("query rejected: {0}")]
    Query(#[from] libsql::Error),

    #[error("row mapping failed: {0}")]
    Mapping(String),

    #[error("record not found")]
    NotFound,

    #[error("conflicting state: {0}")]
    Conflict(String),

    #[error("transaction could not be committed")]
    Transaction,
}

/// libsql surfaces unique-constraint violations as a generic query error;
/// this is the only reliable way to detect one without a dialect-specific
/// error code.
pub fn is_unique_violation(error: &libsql::Error) -> bool {
    let message = error.to_string();
    message.contains("UNIQUE constraint failed") || message.contains("constraint failed")
}
