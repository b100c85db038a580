// [libs/domain/models/src/job.rs]
/*!
 * MODULE: JOB STATUS RECORD & STATE MACHINE
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: LIVE JOB SHAPE, SCHEDULE SHAPE, LEGAL TRANSITIONS
 *
 * The transition table here is consulted by the job control plane before
 * every mutating database statement — it is the single source of truth
 * for "is this edge legal", independent of storage.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Paused => "paused",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "paused" => Ok(JobStatus::Paused),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Quran,
    Prayer,
    Hadith,
    Audio,
    Finance,
    Zakat,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Quran => "quran",
            JobType::Prayer => "prayer",
            JobType::Hadith => "hadith",
            JobType::Audio => "audio",
            JobType::Finance => "finance",
            JobType::Zakat => "zakat",
        }
    }

    pub fn all() -> [JobType; 6] {
        [
            JobType::Quran,
            JobType::Prayer,
            JobType::Hadith,
            JobType::Audio,
            JobType::Finance,
            JobType::Zakat,
        ]
    }
}

impl std::str::FromStr for JobType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "quran" => Ok(JobType::Quran),
            "prayer" => Ok(JobType::Prayer),
            "hadith" => Ok(JobType::Hadith),
            "audio" => Ok(JobType::Audio),
            "finance" | "gold-price" => Ok(JobType::Finance),
            "zakat" => Ok(JobType::Zakat),
            other => Err(format!("unknown job type: {other}")),
        }
    }
}

/// Legal state-machine edge for a sync job's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTransition {
    Start,
    Pause,
    Resume,
    Complete,
    Fail,
    Cancel,
}

/// Returns the destination state for `transition` applied to `from`, or
/// `None` if the edge is illegal (caller should surface `ConflictError`).
pub fn apply_transition(from: JobStatus, transition: JobTransition) -> Option<JobStatus> {
    use JobStatus::*;
    use JobTransition::*;
    match (from, transition) {
        (Pending, Start) => Some(Running),
        (Pending, Cancel) => Some(Cancelled),
        (Running, Pause) => Some(Paused),
        (Running, Complete) => Some(Completed),
        (Running, Fail) => Some(Failed),
        (Running, Cancel) => Some(Cancelled),
        (Paused, Resume) => Some(Running),
        (Paused, Cancel) => Some(Cancelled),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub id: String,
    pub job_name: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub progress_percentage: u8,
    pub priority: u8,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub error_text: Option<String>,
    pub metadata: Value,
    /// Cooperative cancellation flag polled by the sync engine / fan-out
    /// planner between records, never mid-record.
    pub cancel_requested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSchedule {
    pub job_type: JobType,
    pub enabled: bool,
    pub cron_expression: Option<String>,
    pub priority: u8,
    pub max_concurrency: u32,
    pub timeout_minutes: u32,
    pub retry_attempts: u32,
}

#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    pub priority: Option<u8>,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub waiting: u64,
    pub active: u64,
    pub completed: u64,
    pub failed: u64,
    pub delayed: u64,
    pub paused: u64,
}

pub type JobMetadataMap = HashMap<String, Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_start_or_cancel() {
        assert_eq!(apply_transition(JobStatus::Pending, JobTransition::Start), Some(JobStatus::Running));
        assert_eq!(apply_transition(JobStatus::Pending, JobTransition::Cancel), Some(JobStatus::Cancelled));
    }

    #[test]
    fn running_pause_resume_is_reversible() {
        assert_eq!(apply_transition(JobStatus::Running, JobTransition::Pause), Some(JobStatus::Paused));
        assert_eq!(apply_transition(JobStatus::Paused, JobTransition::Resume), Some(JobStatus::Running));
    }

    #[test]
    fn terminal_states_accept_no_transition() {
        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            for transition in [
                JobTransition::Start,
                JobTransition::Pause,
                JobTransition::Resume,
                JobTransition::Complete,
                JobTransition::Fail,
                JobTransition::Cancel,
            ] {
                assert_eq!(apply_transition(terminal, transition), None);
            }
        }
    }

    #[test]
    fn pending_cannot_pause() {
        assert_eq!(apply_transition(JobStatus::Pending, JobTransition::Pause), None);
    }
}
