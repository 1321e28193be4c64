use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::Date;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{
    repo_types::NutritionEntryRow,
    store::{NewEntry, NutritionDataStore, NutritionEntry},
};
use crate::{photos, storage::StorageClient};

macro_rules! entry_columns {
    () => {
        "id, log_date, meal_type, name, calories, protein, carbs, fats, sugars, added_sugars, \
         cholesterol, sodium, vitamins, minerals, serving_size, food_group, user_notes, \
         meal_photo_link, photo_key, is_favorite, created_at"
    };
}

/// PostgreSQL store; photo bytes go to object storage, only the key is kept.
#[derive(Clone)]
pub struct PgNutritionStore {
    db: PgPool,
    storage: Arc<dyn StorageClient>,
}

impl PgNutritionStore {
    pub fn new(db: PgPool, storage: Arc<dyn StorageClient>) -> Self {
        Self { db, storage }
    }

    async fn insert(
        &self,
        id: Uuid,
        entry: &NewEntry,
        meal_photo_link: &str,
        photo_key: Option<&str>,
    ) -> anyhow::Result<NutritionEntryRow> {
        let row = sqlx::query_as::<_, NutritionEntryRow>(concat!(
            r#"
            INSERT INTO nutrition_entries (
                id, log_date, meal_type, name, calories, protein, carbs, fats,
                sugars, added_sugars, cholesterol, sodium, vitamins, minerals,
                serving_size, food_group, user_notes, meal_photo_link, photo_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING "#,
            entry_columns!()
        ))
        .bind(id)
        .bind(entry.date)
        .bind(&entry.meal_type)
        .bind(&entry.name)
        .bind(entry.calories)
        .bind(entry.protein)
        .bind(entry.carbs)
        .bind(entry.fat)
        .bind(entry.sugars)
        .bind(entry.added_sugars)
        .bind(entry.cholesterol)
        .bind(entry.sodium)
        .bind(Json(&entry.vitamins))
        .bind(Json(&entry.minerals))
        .bind(&entry.serving_size)
        .bind(&entry.food_group)
        .bind(&entry.user_notes)
        .bind(meal_photo_link)
        .bind(photo_key)
        .fetch_one(&self.db)
        .await
        .context("insert nutrition entry")?;
        Ok(row)
    }
}

/// Escapes `%`, `_` and `\` so user text is matched literally by ILIKE.
pub(crate) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl NutritionDataStore for PgNutritionStore {
    #[instrument(skip(self, entry), fields(name = %entry.name, meal_type = %entry.meal_type))]
    async fn add_entry_to_meal_and_daily_log(
        &self,
        entry: NewEntry,
    ) -> anyhow::Result<NutritionEntry> {
        let id = Uuid::new_v4();

        let photo_key = match entry.meal_photo.clone().filter(|p| !p.is_empty()) {
            Some(body) => {
                Some(photos::upload_meal_photo(self.storage.as_ref(), entry.date, id, body).await?)
            }
            None => None,
        };
        let link = match (&photo_key, entry.meal_photo_link.is_empty()) {
            (Some(key), true) => key.clone(),
            _ => entry.meal_photo_link.clone(),
        };

        match self.insert(id, &entry, &link, photo_key.as_deref()).await {
            Ok(row) => {
                debug!(%id, "nutrition entry stored");
                Ok(row.into())
            }
            Err(e) => {
                if let Some(key) = &photo_key {
                    if let Err(del) = self.storage.delete_object(key).await {
                        warn!(error = %del, %key, "failed to remove orphaned meal photo");
                    }
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn fetch_entries(
        &self,
        favorites: bool,
        name_search: Option<&str>,
    ) -> anyhow::Result<Vec<NutritionEntry>> {
        let pattern = name_search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(escape_like);

        let rows = sqlx::query_as::<_, NutritionEntryRow>(concat!(
            "SELECT ",
            entry_columns!(),
            r#"
            FROM nutrition_entries
            WHERE ($1 = FALSE OR is_favorite)
              AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            "#
        ))
        .bind(favorites)
        .bind(pattern)
        .fetch_all(&self.db)
        .await
        .context("fetch nutrition entries")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_daily_log(&self, date: Date) -> anyhow::Result<Vec<NutritionEntry>> {
        let rows = sqlx::query_as::<_, NutritionEntryRow>(concat!(
            "SELECT ",
            entry_columns!(),
            r#"
            FROM nutrition_entries
            WHERE log_date = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(date)
        .fetch_all(&self.db)
        .await
        .context("fetch daily log")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn get_entry(&self, id: Uuid) -> anyhow::Result<Option<NutritionEntry>> {
        let row = sqlx::query_as::<_, NutritionEntryRow>(concat!(
            "SELECT ",
            entry_columns!(),
            " FROM nutrition_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get nutrition entry")?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn set_favorite(
        &self,
        id: Uuid,
        favorite: bool,
    ) -> anyhow::Result<Option<NutritionEntry>> {
        let row = sqlx::query_as::<_, NutritionEntryRow>(concat!(
            "UPDATE nutrition_entries SET is_favorite = $2 WHERE id = $1 RETURNING ",
            entry_columns!()
        ))
        .bind(id)
        .bind(favorite)
        .fetch_optional(&self.db)
        .await
        .context("set favorite")?;

        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod repo_tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use bytes::Bytes;
    use sqlx::postgres::PgPoolOptions;
    use time::macros::date;

    use super::*;
    use crate::entries::memory::memory_tests::new_entry;

    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

    /// Remembers every key written or deleted.
    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, key: &str, _: Bytes, _: &str) -> anyhow::Result<()> {
            self.puts.lock().unwrap().push(key.to_string());
            Ok(())
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            self.deletes.lock().unwrap().push(key.to_string());
            if self.fail_deletes {
                anyhow::bail!("bucket refused delete");
            }
            Ok(())
        }
        async fn presign_get(&self, key: &str, _: u64) -> anyhow::Result<String> {
            Ok(format!("https://recording.local/{key}"))
        }
    }

    /// Nothing listens on port 1, so every query fails.
    fn unreachable_store(storage: Arc<RecordingStorage>) -> PgNutritionStore {
        let db = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy("postgres://x:y@127.0.0.1:1/none")
            .unwrap();
        PgNutritionStore::new(db, storage)
    }

    fn entry_with_photo() -> NewEntry {
        let mut entry = new_entry("Toast", date!(2023 - 11 - 24), "Breakfast");
        entry.meal_photo = Some(Bytes::from_static(JPEG));
        entry
    }

    #[tokio::test]
    async fn failed_insert_removes_uploaded_photo() {
        let storage = Arc::new(RecordingStorage::default());
        let store = unreachable_store(storage.clone());

        let err = store
            .add_entry_to_meal_and_daily_log(entry_with_photo())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("insert nutrition entry"));

        let puts = storage.puts.lock().unwrap().clone();
        assert_eq!(puts.len(), 1);
        assert!(puts[0].starts_with("entries/2023-11-24/"));
        assert!(puts[0].ends_with(".jpg"));
        assert_eq!(*storage.deletes.lock().unwrap(), puts);
    }

    #[tokio::test]
    async fn failed_cleanup_keeps_insert_error() {
        let storage = Arc::new(RecordingStorage {
            fail_deletes: true,
            ..Default::default()
        });
        let store = unreachable_store(storage.clone());

        let err = store
            .add_entry_to_meal_and_daily_log(entry_with_photo())
            .await
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("insert nutrition entry"), "{msg}");
        assert!(!msg.contains("bucket refused delete"), "{msg}");
        assert_eq!(storage.deletes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_without_photo_touches_no_storage() {
        let storage = Arc::new(RecordingStorage::default());
        let store = unreachable_store(storage.clone());

        let entry = new_entry("Toast", date!(2023 - 11 - 24), "Breakfast");
        assert!(store.add_entry_to_meal_and_daily_log(entry).await.is_err());
        assert!(storage.puts.lock().unwrap().is_empty());
        assert!(storage.deletes.lock().unwrap().is_empty());
    }

    #[test]
    fn escape_like_quotes_wildcards() {
        assert_eq!(escape_like("apple"), "apple");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\x"), "c:\\\\x");
    }
}
