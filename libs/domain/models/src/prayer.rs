// [libs/domain/models/src/prayer.rs]
/*!
 * MODULE: PRAYER DOMAIN SHAPES
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: LOCATION/METHOD/TIMES NATURAL KEYS, FAN-OUT COMBINATIONS
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum School {
    Shafi = 0,
    Hanafi = 1,
}

impl School {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

impl std::str::FromStr for School {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" | "shafi" => Ok(School::Shafi),
            "1" | "hanafi" => Ok(School::Hanafi),
            other => Err(format!("unknown school: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerLocation {
    pub location_id: i64,
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

impl PrayerLocation {
    pub fn natural_key(&self) -> String {
        format!("{}:{}", self.city.to_ascii_lowercase(), self.country.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerMethod {
    pub method_id: i64,
    pub name: String,
    pub params: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub location_id: i64,
    pub date: chrono::NaiveDate,
    pub method_id: i64,
    pub school: School,
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl PrayerTimes {
    /// `(location_id, date, method_id, school)` uniquely identifies one row.
    pub fn natural_key(&self) -> (i64, chrono::NaiveDate, i64, School) {
        (self.location_id, self.date, self.method_id, self.school)
    }
}

/// One location × method × school combination the fan-out planner will
/// request upstream prayer times for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerFanoutSlice {
    pub location_id: i64,
    pub method_id: i64,
    pub school: School,
    pub days: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrayerSyncRequest {
    pub location_ids: Vec<i64>,
    pub method_id: i64,
    #[serde(default)]
    pub school: Option<School>,
    #[serde(default = "default_days")]
    pub days: u16,
}

fn default_days() -> u16 {
    30
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrayerRequestValidationError {
    NoLocations,
    DaysOutOfRange { days: u16, min: u16, max: u16 },
}

/// `days` must fall in `[1, 365]`; at least one location id must be present.
pub fn validate_prayer_request(request: &PrayerSyncRequest) -> Result<(), PrayerRequestValidationError> {
    if request.location_ids.is_empty() {
        return Err(PrayerRequestValidationError::NoLocations);
    }
    if request.days < 1 || request.days > 365 {
        return Err(PrayerRequestValidationError::DaysOutOfRange {
            days: request.days,
            min: 1,
            max: 365,
        });
    }
    Ok(())
}

/// Partitions location ids across `max_concurrency` workers by
/// `location_id % max_concurrency`, preserving per-partition order.
pub fn partition_locations(location_ids: &[i64], max_concurrency: u32) -> Vec<Vec<i64>> {
    let buckets = max_concurrency.max(1) as usize;
    let mut partitions: Vec<Vec<i64>> = vec![Vec::new(); buckets];
    for &location_id in location_ids {
        let bucket = (location_id.rem_euclid(buckets as i64)) as usize;
        partitions[bucket].push(location_id);
    }
    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_location_list() {
        let request = PrayerSyncRequest {
            location_ids: vec![],
            method_id: 2,
            school: None,
            days: 30,
        };
        assert_eq!(
            validate_prayer_request(&request),
            Err(PrayerRequestValidationError::NoLocations)
        );
    }

    #[test]
    fn rejects_days_out_of_range() {
        let request = PrayerSyncRequest {
            location_ids: vec![1],
            method_id: 2,
            school: None,
            days: 0,
        };
        assert!(validate_prayer_request(&request).is_err());

        let request = PrayerSyncRequest {
            location_ids: vec![1],
            method_id: 2,
            school: None,
            days: 366,
        };
        assert!(validate_prayer_request(&request).is_err());
    }

    #[test]
    fn accepts_boundary_days() {
        let low = PrayerSyncRequest { location_ids: vec![1], method_id: 2, school: None, days: 1 };
        let high = PrayerSyncRequest { location_ids: vec![1], method_id: 2, school: None, days: 365 };
        assert!(validate_prayer_request(&low).is_ok());
        assert!(validate_prayer_request(&high).is_ok());
    }

    #[test]
    fn partitions_distribute_by_modulo() {
        let partitions = partition_locations(&[1, 2, 3, 4, 5, 6], 3);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[1], vec![1, 4]);
        assert_eq!(partitions[2], vec![2, 5]);
        assert_eq!(partitions[0], vec![3, 6]);
    }
}
