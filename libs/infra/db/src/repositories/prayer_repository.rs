// [libs/infra/db/src/repositories/prayer_repository.rs]
//! Prayer location/method/times persistence, backing the fan-out planner.

use crate::bulk::{settle_upsert, UpsertOutcome};
use crate::client::DbClient;
use crate::errors::DbError;
use libsql::{params, Row};
use syncd_domain_models::prayer::{PrayerLocation, PrayerMethod, PrayerTimes, School};
use tracing::instrument;

pub struct PrayerRepository {
    client: DbClient,
}

impl PrayerRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    pub async fn upsert_location(&self, location: &PrayerLocation) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        connection
            .execute(
                "INSERT INTO prayer_locations (location_id, city, country, latitude, longitude, timezone)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(location_id) DO UPDATE SET
                    city = excluded.city, country = excluded.country,
                    latitude = excluded.latitude, longitude = excluded.longitude, timezone = excluded.timezone",
                params![
                    location.location_id,
                    location.city.clone(),
                    location.country.clone(),
                    location.latitude,
                    location.longitude,
                    location.timezone.clone(),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn list_locations(&self) -> Result<Vec<PrayerLocation>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT location_id, city, country, latitude, longitude, timezone FROM prayer_locations",
                (),
            )
            .await?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next().await? {
            locations.push(PrayerLocation {
                location_id: row.get(0)?,
                city: row.get(1)?,
                country: row.get(2)?,
                latitude: row.get(3)?,
                longitude: row.get(4)?,
                timezone: row.get(5)?,
            });
        }
        Ok(locations)
    }

    pub async fn upsert_method(&self, method: &PrayerMethod) -> Result<(), DbError> {
        let connection = self.client.get_connection()?;
        let params_json = serde_json::to_string(&method.params).map_err(|e| DbError::Mapping(e.to_string()))?;
        connection
            .execute(
                "INSERT INTO prayer_methods (method_id, name, params) VALUES (?1, ?2, ?3)
                 ON CONFLICT(method_id) DO UPDATE SET name = excluded.name, params = excluded.params",
                params![method.method_id, method.name.clone(), params_json],
            )
            .await?;
        Ok(())
    }

    pub async fn list_methods(&self) -> Result<Vec<PrayerMethod>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query("SELECT method_id, name, params FROM prayer_methods ORDER BY name ASC", ())
            .await?;
        let mut methods = Vec::new();
        while let Some(row) = rows.next().await? {
            let params_raw: String = row.get(2)?;
            methods.push(PrayerMethod {
                method_id: row.get(0)?,
                name: row.get(1)?,
                params: serde_json::from_str(&params_raw).map_err(|e| DbError::Mapping(e.to_string()))?,
            });
        }
        Ok(methods)
    }

    #[instrument(skip(self, times))]
    pub async fn upsert_times(&self, times: &[PrayerTimes]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for entry in times {
            let mut existing = connection
                .query(
                    "SELECT 1 FROM prayer_times WHERE location_id = ?1 AND date = ?2 AND method_id = ?3 AND school = ?4",
                    params![entry.location_id, entry.date.to_string(), entry.method_id, entry.school.as_i32()],
                )
                .await?;
            let existed = existing.next().await?.is_some();
            let result = connection
                .execute(
                    "INSERT INTO prayer_times (location_id, date, method_id, school, fajr, sunrise, dhuhr,
                     asr, maghrib, isha, last_synced_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, CURRENT_TIMESTAMP)
                     ON CONFLICT(location_id, date, method_id, school) DO UPDATE SET
                        fajr = excluded.fajr, sunrise = excluded.sunrise, dhuhr = excluded.dhuhr,
                        asr = excluded.asr, maghrib = excluded.maghrib, isha = excluded.isha,
                        last_synced_at = CURRENT_TIMESTAMP",
                    params![
                        entry.location_id,
                        entry.date.to_string(),
                        entry.method_id,
                        entry.school.as_i32(),
                        entry.fajr.clone(),
                        entry.sunrise.clone(),
                        entry.dhuhr.clone(),
                        entry.asr.clone(),
                        entry.maghrib.clone(),
                        entry.isha.clone(),
                    ],
                )
                .await
                .map(|_| ());
            outcomes.push(settle_upsert(result, existed));
        }
        Ok(outcomes)
    }

    pub async fn find_times(
        &self,
        location_id: i64,
        date: chrono::NaiveDate,
        method_id: i64,
        school: School,
    ) -> Result<Option<PrayerTimes>, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT location_id, date, method_id, school, fajr, sunrise, dhuhr, asr, maghrib, isha,
                 last_synced_at FROM prayer_times
                 WHERE location_id = ?1 AND date = ?2 AND method_id = ?3 AND school = ?4",
                params![location_id, date.to_string(), method_id, school.as_i32()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::map_row(&row)?)),
            None => Ok(None),
        }
    }

    fn map_row(row: &Row) -> Result<PrayerTimes, DbError> {
        let date_raw: String = row.get(1)?;
        let date = date_raw.parse().map_err(|_| DbError::Mapping(format!("invalid date: {date_raw}")))?;
        let school_raw: i64 = row.get(3)?;
        let school = if school_raw == 1 { School::Hanafi } else { School::Shafi };
        Ok(PrayerTimes {
            location_id: row.get(0)?,
            date,
            method_id: row.get(2)?,
            school,
            fajr: row.get(4)?,
            sunrise: row.get(5)?,
            dhuhr: row.get(6)?,
            asr: row.get(7)?,
            maghrib: row.get(8)?,
            isha: row.get(9)?,
            last_synced_at: row.get(10)?,
        })
    }
}
