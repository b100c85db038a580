// [libs/infra/db/src/repositories/finance_repository.rs]
//! Gold price and reciter catalog persistence.

use crate::bulk::{settle_upsert, UpsertOutcome};
use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::content::{GoldPrice, Reciter};
use tracing::instrument;

pub struct FinanceRepository {
    client: DbClient,
}

impl FinanceRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, prices))]
    pub async fn upsert_gold_prices(&self, prices: &[GoldPrice]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for price in prices {
            let mut existing = connection
                .query(
                    "SELECT 1 FROM gold_prices WHERE date = ?1 AND currency = ?2 AND karat = ?3",
                    params![price.date.to_string(), price.currency.clone(), price.karat],
                )
                .await?;
            let existed = existing.next().await?.is_some();
            let result = connection
                .execute(
                    "INSERT INTO gold_prices (date, currency, karat, price_per_gram, last_synced_at)
                     VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
                     ON CONFLICT(date, currency, karat) DO UPDATE SET
                        price_per_gram = excluded.price_per_gram, last_synced_at = CURRENT_TIMESTAMP",
                    params![price.date.to_string(), price.currency.clone(), price.karat, price.price_per_gram],
                )
                .await
                .map(|_| ());
            outcomes.push(settle_upsert(result, existed));
        }
        Ok(outcomes)
    }

    pub async fn latest_price(&self, currency: &str, karat: u8) -> Result<Option<GoldPrice>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT date, currency, karat, price_per_gram, last_synced_at FROM gold_prices
                 WHERE currency = ?1 AND karat = ?2 ORDER BY date DESC LIMIT 1",
                params![currency, karat],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_price_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, reciters))]
    pub async fn upsert_reciters(&self, reciters: &[Reciter]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for reciter in reciters {
            let mut existing = connection.query("SELECT 1 FROM reciters WHERE reciter_id = ?1", params![reciter.reciter_id]).await?;
            let existed = existing.next().await?.is_some();
            let result = connection
                .execute(
                    "INSERT INTO reciters (reciter_id, name, style, language, last_synced_at)
                     VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
                     ON CONFLICT(reciter_id) DO UPDATE SET
                        name = excluded.name, style = excluded.style, language = excluded.language,
                        last_synced_at = CURRENT_TIMESTAMP",
                    params![reciter.reciter_id, reciter.name.clone(), reciter.style.clone(), reciter.language.clone()],
                )
                .await
                .map(|_| ());
            outcomes.push(settle_upsert(result, existed));
        }
        Ok(outcomes)
    }

    fn map_price_row(row: &Row) -> Result<GoldPrice, DbError> {
        let date_raw: String = row.get(0)?;
        Ok(GoldPrice {
            date: date_raw.parse().map_err(|_| DbError::Mapping(format!("invalid date: {date_raw}")))?,
            currency: row.get(1)?,
            karat: row.get::<i64>(2)? as u8,
            price_per_gram: row.get(3)?,
            last_synced_at: row.get(4)?,
        })
    }
}
