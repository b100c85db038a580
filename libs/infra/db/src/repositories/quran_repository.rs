// [libs/infra/db/src/repositories/quran_repository.rs]
/*!
 * MODULE: QURAN CONTENT REPOSITORY
 * LAYER: INFRASTRUCTURE ADAPTER (L3)
 * RESPONSIBILITY: CHAPTER/VERSE/TRANSLATION BULK UPSERT
 */

use crate::bulk::{chunks, settle_upsert, UpsertOutcome, DEFAULT_CHUNK_SIZE};
use crate::client::DbClient;
use crate::errors::DbError;
use libsql::params;
use syncd_domain_models::content::{QuranChapter, QuranTranslation, QuranVerse};
use tracing::instrument;

pub struct QuranRepository {
    client: DbClient,
}

impl QuranRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, chapters))]
    pub async fn upsert_chapters(&self, chapters: &[QuranChapter]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(chapters, DEFAULT_CHUNK_SIZE) {
            for chapter in batch {
                let mut existing = connection
                    .query("SELECT 1 FROM quran_chapters WHERE chapter_number = ?1", params![chapter.chapter_number])
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO quran_chapters (chapter_number, name_arabic, name_simple, name_english,
                         verses_count, revelation_place, last_synced_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, CURRENT_TIMESTAMP)
                         ON CONFLICT(chapter_number) DO UPDATE SET
                            name_arabic = excluded.name_arabic,
                            name_simple = excluded.name_simple,
                            name_english = excluded.name_english,
                            verses_count = excluded.verses_count,
                            revelation_place = excluded.revelation_place,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            chapter.chapter_number,
                            chapter.name_arabic.clone(),
                            chapter.name_simple.clone(),
                            chapter.name_english.clone(),
                            chapter.verses_count,
                            chapter.revelation_place.clone(),
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }

    #[instrument(skip(self, verses))]
    pub async fn upsert_verses(&self, verses: &[QuranVerse]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(verses, DEFAULT_CHUNK_SIZE) {
            for verse in batch {
                let mut existing = connection
                    .query(
                        "SELECT 1 FROM quran_verses WHERE chapter_number = ?1 AND verse_number = ?2",
                        params![verse.chapter_number, verse.verse_number],
                    )
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO quran_verses (chapter_number, verse_number, text_arabic, juz_number,
                         page_number, last_synced_at) VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
                         ON CONFLICT(chapter_number, verse_number) DO UPDATE SET
                            text_arabic = excluded.text_arabic,
                            juz_number = excluded.juz_number,
                            page_number = excluded.page_number,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            verse.chapter_number,
                            verse.verse_number,
                            verse.text_arabic.clone(),
                            verse.juz_number,
                            verse.page_number,
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }

    #[instrument(skip(self, translations))]
    pub async fn upsert_translations(
        &self,
        translations: &[QuranTranslation],
    ) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(translations, DEFAULT_CHUNK_SIZE) {
            for translation in batch {
                let mut existing = connection
                    .query(
                        "SELECT 1 FROM quran_translations WHERE chapter_number = ?1 AND verse_number = ?2 AND resource_id = ?3",
                        params![translation.chapter_number, translation.verse_number, translation.resource_id],
                    )
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO quran_translations (chapter_number, verse_number, resource_id,
                         language_code, text, last_synced_at) VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)
                         ON CONFLICT(chapter_number, verse_number, resource_id) DO UPDATE SET
                            text = excluded.text,
                            language_code = excluded.language_code,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            translation.chapter_number,
                            translation.verse_number,
                            translation.resource_id,
                            translation.language_code.clone(),
                            translation.text.clone(),
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }

    pub async fn count_chapters(&self) -> Result<i64, DbError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection.query("SELECT COUNT(*) FROM quran_chapters", ()).await?;
        let row = rows.next().await?.ok_or(DbError::NotFound)?;
        Ok(row.get(0)?)
    }
}
