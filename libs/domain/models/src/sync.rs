// [libs/domain/models/src/sync.rs]
/*!
 * MODULE: SYNC JOB LOG & RESULT SHAPES
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: PER-SYNC-RUN BOOKKEEPING AND STATUS DERIVATION
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Pending,
    Running,
    Partial,
    Success,
    Failed,
    Cancelled,
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJobLog {
    pub id: String,
    pub job_name: String,
    pub resource: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub status: SyncStatus,
    pub error_text: Option<String>,
    pub duration_ms: u64,
    pub records_processed: u32,
    pub records_failed: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncDateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub dry_run: bool,
    pub date_range: Option<SyncDateRange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub success: bool,
    #[serde(default)]
    pub cancelled: bool,
    pub resource: String,
    pub records_processed: u32,
    pub records_inserted: u32,
    pub records_updated: u32,
    pub records_failed: u32,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

impl SyncResult {
    pub fn empty_short_circuit(resource: &str) -> Self {
        Self {
            success: true,
            cancelled: false,
            resource: resource.to_string(),
            records_processed: 0,
            records_inserted: 0,
            records_updated: 0,
            records_failed: 0,
            errors: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn engine_failure(resource: &str, error: String, duration_ms: u64) -> Self {
        Self {
            success: false,
            cancelled: false,
            resource: resource.to_string(),
            records_processed: 0,
            records_inserted: 0,
            records_updated: 0,
            records_failed: 1,
            errors: vec![error],
            duration_ms,
        }
    }

    /// `success` if no record failed, `partial` if some did, `failed` if
    /// every processed record failed, `cancelled` if cooperative
    /// cancellation cut the run short before it reached a terminal outcome.
    pub fn derived_status(&self) -> SyncStatus {
        if self.cancelled {
            return SyncStatus::Cancelled;
        }
        if !self.success {
            return SyncStatus::Failed;
        }
        if self.records_failed == 0 {
            SyncStatus::Success
        } else if self.records_failed < self.records_processed {
            SyncStatus::Partial
        } else {
            SyncStatus::Failed
        }
    }
}

/// Truncates concatenated per-record errors to a bounded length before
/// they are written into the Sync Job Log's error text column.
pub fn truncate_errors(errors: &[String], max_len: usize) -> String {
    let joined = errors.join("; ");
    if joined.len() <= max_len {
        joined
    } else {
        let mut truncated = joined[..max_len].to_string();
        truncated.push_str("...(truncated)");
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(processed: u32, failed: u32) -> SyncResult {
        SyncResult {
            success: true,
            cancelled: false,
            resource: "chapters".into(),
            records_processed: processed,
            records_inserted: 0,
            records_updated: 0,
            records_failed: failed,
            errors: Vec::new(),
            duration_ms: 10,
        }
    }

    #[test]
    fn zero_failures_is_success() {
        assert_eq!(result(10, 0).derived_status(), SyncStatus::Success);
    }

    #[test]
    fn partial_failures_is_partial() {
        assert_eq!(result(10, 3).derived_status(), SyncStatus::Partial);
    }

    #[test]
    fn total_failure_is_failed() {
        assert_eq!(result(10, 10).derived_status(), SyncStatus::Failed);
    }

    #[test]
    fn engine_level_failure_is_always_failed() {
        let mut r = result(0, 1);
        r.success = false;
        assert_eq!(r.derived_status(), SyncStatus::Failed);
    }
}
