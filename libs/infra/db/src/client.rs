// [libs/infra/db/src/client.rs]
/*!
 * MODULE: DATABASE CONNECTION CLIENT
 * LAYER: INFRASTRUCTURE (L3)
 * RESPONSIBILITY: CONNECTION LIFECYCLE AND SCHEMA BOOTSTRAP
 *
 * In-memory URLs need an anchor connection kept alive for the process
 * lifetime, otherwise SQLite drops the schema the instant the bootstrap
 * connection closes. Disk and remote targets bootstrap through a
 * throwaway connection instead.
 */

use crate::errors::DbError;
use crate::schema::apply_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct DbClient {
    database: Arc<Database>,
    _memory_anchor: Option<Arc<Connection>>,
}

impl DbClient {
    #[instrument(skip(access_token))]
    pub async fn connect(connection_url: &str, access_token: Option<String>) -> Result<Self, DbError> {
        if connection_url.is_empty() {
            return Err(DbError::Configuration("DATABASE_URL is empty".into()));
        }

        let is_remote = connection_url.starts_with("libsql://") || connection_url.starts_with("https://");
        let is_memory = connection_url.contains(":memory:") || connection_url.contains("mode=memory");

        let database = if is_remote {
            let token = access_token
                .ok_or_else(|| DbError::Configuration("remote database url requires an access token".into()))?;
            Builder::new_remote(connection_url.to_string(), token).build().await
        } else {
            Builder::new_local(connection_url).build().await
        }
        .map_err(|e| DbError::Connection(e.to_string()))?;

        let database = Arc::new(database);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = database.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&anchor_conn)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))?;
            anchor = Some(Arc::new(anchor_conn));
            info!("in-memory database schema anchored for process lifetime");
        } else {
            let bootstrap_conn = database.connect().map_err(|e| DbError::Connection(e.to_string()))?;
            apply_schema(&bootstrap_conn)
                .await
                .map_err(|e| DbError::Connection(e.to_string()))?;
        }

        Ok(Self {
            database,
            _memory_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, DbError> {
        self.database.connect().map_err(|e| DbError::Connection(e.to_string()))
    }
}
