// [libs/infra/db/src/repositories/zakat_repository.rs]
//! Persists computed Zakat calculations for audit and later retrieval.

use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::content::ZakatCalculation;
use tracing::instrument;

pub struct ZakatRepository {
    client: DbClient,
}

impl ZakatRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn record(
        &self,
        user_reference: Option<&str>,
        asset_value: f64,
        currency: &str,
        nisab_threshold: f64,
        zakat_due: f64,
    ) -> Result<ZakatCalculation, DbError> {
        let connection = self.client.get_connection()?;
        let id = uuid::Uuid::new_v4().to_string();
        connection
            .execute(
                "INSERT INTO zakat_calculations (id, user_reference, asset_value, currency, nisab_threshold, zakat_due)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id.clone(), user_reference, asset_value, currency, nisab_threshold, zakat_due],
            )
            .await?;
        self.find_by_id(&id).await?.ok_or(DbError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ZakatCalculation>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, user_reference, asset_value, currency, nisab_threshold, zakat_due, calculated_at
                 FROM zakat_calculations WHERE id = ?1",
                params![id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_for_user(&self, user_reference: &str, limit: u32) -> Result<Vec<ZakatCalculation>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, user_reference, asset_value, currency, nisab_threshold, zakat_due, calculated_at
                 FROM zakat_calculations WHERE user_reference = ?1 ORDER BY calculated_at DESC LIMIT ?2",
                params![user_reference, limit as i64],
            )
            .await?;
        let mut calculations = Vec::new();
        while let Some(row) = rows.next().await? {
            calculations.push(Self::map_row(&row)?);
        }
        Ok(calculations)
    }

    fn map_row(row: &Row) -> Result<ZakatCalculation, DbError> {
        Ok(ZakatCalculation {
            id: row.get(0)?,
            user_reference: row.get(1)?,
            asset_value: row.get(2)?,
            currency: row.get(3)?,
            nisab_threshold: row.get(4)?,
            zakat_due: row.get(5)?,
            calculated_at: row.get(6)?,
        })
    }
}
