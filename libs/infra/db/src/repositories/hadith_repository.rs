// [libs/infra/db/src/repositories/hadith_repository.rs]
//! Hadith collection/book/hadith bulk upsert.

use crate::bulk::{chunks, settle_upsert, UpsertOutcome, DEFAULT_CHUNK_SIZE};
use crate::client::DbClient;
use crate::errors::DbError;
use libsql::params;
use syncd_domain_models::content::{Hadith, HadithBook, HadithCollection};
use tracing::instrument;

pub struct HadithRepository {
    client: DbClient,
}

impl HadithRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, collections))]
    pub async fn upsert_collections(
        &self,
        collections: &[HadithCollection],
    ) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(collections, DEFAULT_CHUNK_SIZE) {
            for collection in batch {
                let mut existing = connection
                    .query("SELECT 1 FROM hadith_collections WHERE slug = ?1", params![collection.slug.clone()])
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO hadith_collections (slug, name_arabic, name_english, total_hadiths, last_synced_at)
                         VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
                         ON CONFLICT(slug) DO UPDATE SET
                            name_arabic = excluded.name_arabic,
                            name_english = excluded.name_english,
                            total_hadiths = excluded.total_hadiths,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            collection.slug.clone(),
                            collection.name_arabic.clone(),
                            collection.name_english.clone(),
                            collection.total_hadiths,
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }

    #[instrument(skip(self, books))]
    pub async fn upsert_books(&self, books: &[HadithBook]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(books, DEFAULT_CHUNK_SIZE) {
            for book in batch {
                let mut existing = connection
                    .query(
                        "SELECT 1 FROM hadith_books WHERE collection_slug = ?1 AND book_number = ?2",
                        params![book.collection_slug.clone(), book.book_number],
                    )
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO hadith_books (collection_slug, book_number, name_arabic, name_english, last_synced_at)
                         VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
                         ON CONFLICT(collection_slug, book_number) DO UPDATE SET
                            name_arabic = excluded.name_arabic,
                            name_english = excluded.name_english,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            book.collection_slug.clone(),
                            book.book_number,
                            book.name_arabic.clone(),
                            book.name_english.clone(),
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }

    #[instrument(skip(self, hadiths))]
    pub async fn upsert_hadiths(&self, hadiths: &[Hadith]) -> Result<Vec<Result<UpsertOutcome, DbError>>, DbError> {
        let connection = self.client.get_connection()?;
        let mut outcomes = Vec::new();
        for batch in chunks(hadiths, DEFAULT_CHUNK_SIZE) {
            for hadith in batch {
                let mut existing = connection
                    .query(
                        "SELECT 1 FROM hadiths WHERE collection_slug = ?1 AND book_number = ?2 AND hadith_number = ?3",
                        params![hadith.collection_slug.clone(), hadith.book_number, hadith.hadith_number],
                    )
                    .await?;
                let existed = existing.next().await?.is_some();
                let result = connection
                    .execute(
                        "INSERT INTO hadiths (collection_slug, book_number, hadith_number, text_arabic,
                         text_english, grade, last_synced_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, CURRENT_TIMESTAMP)
                         ON CONFLICT(collection_slug, book_number, hadith_number) DO UPDATE SET
                            text_arabic = excluded.text_arabic,
                            text_english = excluded.text_english,
                            grade = excluded.grade,
                            last_synced_at = CURRENT_TIMESTAMP",
                        params![
                            hadith.collection_slug.clone(),
                            hadith.book_number,
                            hadith.hadith_number,
                            hadith.text_arabic.clone(),
                            hadith.text_english.clone(),
                            hadith.grade.clone(),
                        ],
                    )
                    .await
                    .map(|_| ());
                outcomes.push(settle_upsert(result, existed));
            }
        }
        Ok(outcomes)
    }
}
