// [libs/infra/db/src/bulk.rs]
//! Chunked bulk-write helper shared by every content repository.

use crate::errors::{is_unique_violation, DbError};

/// Default number of rows per multi-value INSERT statement. Chosen to stay
/// well under libsql's bound parameter ceiling for wide content rows.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    RaceIgnored,
}

/// Settles an `INSERT ... ON CONFLICT DO UPDATE` outcome into inserted vs.
/// updated, using an existence check the caller took just before issuing
/// the statement. Downgrades a unique-constraint violation (two sync
/// workers racing to insert the same natural key) to a successful no-op
/// rather than a failure.
pub fn settle_upsert(result: Result<(), libsql::Error>, existed_before: bool) -> Result<UpsertOutcome, DbError> {
    match result {
        Ok(()) if existed_before => Ok(UpsertOutcome::Updated),
        Ok(()) => Ok(UpsertOutcome::Inserted),
        Err(e) if is_unique_violation(&e) => Ok(UpsertOutcome::RaceIgnored),
        Err(e) => Err(DbError::Query(e)),
    }
}

pub fn chunks<T>(items: &[T], chunk_size: usize) -> impl Iterator<Item = &[T]> {
    let size = chunk_size.max(1);
    items.chunks(size)
}
