// [libs/infra/db/src/lib.rs]
//! libSQL persistence adapter: connection lifecycle, schema bootstrap, and
//! one repository per entity. Callers never see raw SQL outside this crate.

pub mod bulk;
pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use bulk::{UpsertOutcome, DEFAULT_CHUNK_SIZE};
pub use client::DbClient;
pub use errors::DbError;
pub use repositories::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_and_bootstraps_in_memory_schema() {
        let client = DbClient::connect(":memory:", None).await.expect("connect");
        let connection = client.get_connection().expect("connection");
        let mut rows = connection
            .query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'admin_users'", ())
            .await
            .expect("query");
        assert!(rows.next().await.expect("row").is_some());
    }

    #[tokio::test]
    async fn admin_user_roundtrip() {
        use repositories::AdminUserRepository;
        use syncd_domain_models::admin_user::AdminRole;

        let client = DbClient::connect(":memory:", None).await.expect("connect");
        let repo = AdminUserRepository::new(client);
        let created = repo
            .create("admin@example.test", "hash", Some("A"), Some("B"), AdminRole::Admin)
            .await
            .expect("create");
        let found = repo.find_by_email("admin@example.test").await.expect("find").expect("present");
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, AdminRole::Admin);
    }

    #[tokio::test]
    async fn job_transitions_reject_illegal_edges() {
        use repositories::JobRepository;
        use syncd_domain_models::job::JobType;

        let client = DbClient::connect(":memory:", None).await.expect("connect");
        let repo = JobRepository::new(client);
        let job = repo
            .create("quran-chapters-sync", JobType::Quran, 5, serde_json::json!({}))
            .await
            .expect("create");

        assert!(repo.pause(&job.id).await.is_err(), "cannot pause a pending job");
        repo.start(&job.id).await.expect("start");
        assert!(repo.start(&job.id).await.is_err(), "cannot start a running job twice");
        repo.pause(&job.id).await.expect("pause");
        repo.resume(&job.id).await.expect("resume");
        repo.complete(&job.id, None).await.expect("complete");
        assert!(repo.cancel(&job.id).await.is_err(), "cannot cancel a completed job");
    }
}
