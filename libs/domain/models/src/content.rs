// [libs/domain/models/src/content.rs]
/*!
 * MODULE: CONTENT DOMAIN SHAPES
 * LAYER: DOMAIN MODEL (L2)
 * RESPONSIBILITY: NATURAL KEYS FOR EVERY NON-PRAYER SYNC TARGET
 *
 * Quran, Hadith, Audio (reciters) and Finance (gold price) all follow the
 * same upsert contract: a natural key derived from upstream identifiers,
 * plus a `last_synced_at` stamp the repository layer bumps on every write.
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranChapter {
    pub chapter_number: u16,
    pub name_arabic: String,
    pub name_simple: String,
    pub name_english: String,
    pub verses_count: u16,
    pub revelation_place: String,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl QuranChapter {
    pub fn natural_key(&self) -> u16 {
        self.chapter_number
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranVerse {
    pub chapter_number: u16,
    pub verse_number: u16,
    pub text_arabic: String,
    pub juz_number: u16,
    pub page_number: u16,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl QuranVerse {
    pub fn natural_key(&self) -> (u16, u16) {
        (self.chapter_number, self.verse_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuranTranslation {
    pub chapter_number: u16,
    pub verse_number: u16,
    pub resource_id: u32,
    pub language_code: String,
    pub text: String,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl QuranTranslation {
    pub fn natural_key(&self) -> (u16, u16, u32) {
        (self.chapter_number, self.verse_number, self.resource_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HadithCollection {
    pub slug: String,
    pub name_arabic: String,
    pub name_english: String,
    pub total_hadiths: u32,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl HadithCollection {
    pub fn natural_key(&self) -> &str {
        &self.slug
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HadithBook {
    pub collection_slug: String,
    pub book_number: u16,
    pub name_arabic: String,
    pub name_english: String,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl HadithBook {
    pub fn natural_key(&self) -> (&str, u16) {
        (&self.collection_slug, self.book_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hadith {
    pub collection_slug: String,
    pub book_number: u16,
    pub hadith_number: u32,
    pub text_arabic: String,
    pub text_english: Option<String>,
    pub grade: Option<String>,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl Hadith {
    pub fn natural_key(&self) -> (&str, u16, u32) {
        (&self.collection_slug, self.book_number, self.hadith_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reciter {
    pub reciter_id: u32,
    pub name: String,
    pub style: Option<String>,
    pub language: Option<String>,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl Reciter {
    pub fn natural_key(&self) -> u32 {
        self.reciter_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldPrice {
    pub date: chrono::NaiveDate,
    pub currency: String,
    pub karat: u8,
    pub price_per_gram: f64,
    pub last_synced_at: chrono::DateTime<chrono::Utc>,
}

impl GoldPrice {
    pub fn natural_key(&self) -> (chrono::NaiveDate, &str, u8) {
        (self.date, &self.currency, self.karat)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZakatCalculation {
    pub id: String,
    pub user_reference: Option<String>,
    pub asset_value: f64,
    pub currency: String,
    pub nisab_threshold: f64,
    pub zakat_due: f64,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

/// Nisab is the minimum wealth threshold; zakat due is 2.5% of asset value
/// once assets meet or exceed it, otherwise nothing is owed.
pub fn calculate_zakat_due(asset_value: f64, nisab_threshold: f64) -> f64 {
    if asset_value < nisab_threshold {
        0.0
    } else {
        asset_value * 0.025
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_nisab_owes_nothing() {
        assert_eq!(calculate_zakat_due(500.0, 1000.0), 0.0);
    }

    #[test]
    fn at_or_above_nisab_owes_two_point_five_percent() {
        assert_eq!(calculate_zakat_due(1000.0, 1000.0), 25.0);
        assert_eq!(calculate_zakat_due(10_000.0, 1000.0), 250.0);
    }

    #[test]
    fn natural_keys_compose_expected_tuples() {
        let verse = QuranVerse {
            chapter_number: 2,
            verse_number: 255,
            text_arabic: "...".into(),
            juz_number: 3,
            page_number: 40,
            last_synced_at: chrono::Utc::now(),
        };
        assert_eq!(verse.natural_key(), (2, 255));
    }
}
