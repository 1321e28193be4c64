use std::sync::Arc;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::store::{name_matches, NewEntry, NutritionDataStore, NutritionEntry};
use crate::{photos, storage::StorageClient};

/// Process-local store, entries kept in insertion order.
#[derive(Default)]
pub struct InMemoryNutritionStore {
    entries: RwLock<Vec<NutritionEntry>>,
    storage: Option<Arc<dyn StorageClient>>,
}

impl InMemoryNutritionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Photos are uploaded to `storage` instead of being held in memory.
    pub fn with_storage(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            entries: RwLock::default(),
            storage: Some(storage),
        }
    }
}

#[async_trait]
impl NutritionDataStore for InMemoryNutritionStore {
    async fn add_entry_to_meal_and_daily_log(
        &self,
        entry: NewEntry,
    ) -> anyhow::Result<NutritionEntry> {
        let id = Uuid::new_v4();
        let photo = entry.meal_photo.filter(|p| !p.is_empty());

        let (meal_photo, photo_key) = match (&self.storage, photo) {
            (Some(storage), Some(body)) => (
                None,
                Some(photos::upload_meal_photo(storage.as_ref(), entry.date, id, body).await?),
            ),
            (None, photo) => (photo, None),
            (Some(_), None) => (None, None),
        };
        let meal_photo_link = match (&photo_key, entry.meal_photo_link.is_empty()) {
            (Some(key), true) => key.clone(),
            _ => entry.meal_photo_link,
        };

        let stored = NutritionEntry {
            id,
            date: entry.date,
            meal_type: entry.meal_type,
            name: entry.name,
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fats: entry.fat,
            sugars: entry.sugars,
            added_sugars: entry.added_sugars,
            cholesterol: entry.cholesterol,
            sodium: entry.sodium,
            vitamins: entry.vitamins,
            minerals: entry.minerals,
            serving_size: entry.serving_size,
            food_group: entry.food_group,
            user_notes: entry.user_notes,
            meal_photo,
            meal_photo_link,
            photo_key,
            is_favorite: false,
            created_at: OffsetDateTime::now_utc(),
        };
        self.entries.write().await.push(stored.clone());
        debug!(%id, name = %stored.name, "nutrition entry stored in memory");
        Ok(stored)
    }

    async fn fetch_entries(
        &self,
        favorites: bool,
        name_search: Option<&str>,
    ) -> anyhow::Result<Vec<NutritionEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|e| !favorites || e.is_favorite)
            .filter(|e| name_matches(&e.name, name_search))
            .cloned()
            .collect())
    }

    async fn fetch_daily_log(&self, date: Date) -> anyhow::Result<Vec<NutritionEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().filter(|e| e.date == date).cloned().collect())
    }

    async fn get_entry(&self, id: Uuid) -> anyhow::Result<Option<NutritionEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    async fn set_favorite(
        &self,
        id: Uuid,
        favorite: bool,
    ) -> anyhow::Result<Option<NutritionEntry>> {
        let mut entries = self.entries.write().await;
        Ok(entries.iter_mut().find(|e| e.id == id).map(|e| {
            e.is_favorite = favorite;
            e.clone()
        }))
    }
}

#[cfg(test)]
pub(crate) mod memory_tests {
    use std::collections::BTreeMap;

    use bytes::Bytes;
    use time::macros::date;

    use super::*;

    pub(crate) fn new_entry(name: &str, date: Date, meal_type: &str) -> NewEntry {
        NewEntry {
            date,
            meal_type: meal_type.into(),
            name: name.into(),
            calories: 100.0,
            protein: 1.0,
            carbs: 10.0,
            fat: 2.0,
            sugars: 0.0,
            added_sugars: 0.0,
            cholesterol: 0.0,
            sodium: 0.0,
            vitamins: BTreeMap::new(),
            minerals: BTreeMap::new(),
            serving_size: "1 serving".into(),
            food_group: "Grains".into(),
            user_notes: String::new(),
            meal_photo: None,
            meal_photo_link: String::new(),
        }
    }

    /// Seeds Apple, Banana, Carrot on one day; Banana is a favorite.
    pub(crate) async fn seeded_store() -> InMemoryNutritionStore {
        let store = InMemoryNutritionStore::new();
        let day = date!(2023 - 12 - 05);
        for name in ["Apple", "Banana", "Carrot"] {
            let e = store
                .add_entry_to_meal_and_daily_log(new_entry(name, day, "Breakfast"))
                .await
                .unwrap();
            if name == "Banana" {
                store.set_favorite(e.id, true).await.unwrap();
            }
        }
        store
    }

    #[tokio::test]
    async fn fetch_filters_by_name_and_favorite() {
        let store = seeded_store().await;

        let names = |v: Vec<NutritionEntry>| v.into_iter().map(|e| e.name).collect::<Vec<_>>();

        assert_eq!(names(store.fetch_entries(false, Some("ap")).await.unwrap()), ["Apple"]);
        assert_eq!(
            names(store.fetch_entries(false, None).await.unwrap()),
            ["Carrot", "Banana", "Apple"]
        );
        assert_eq!(names(store.fetch_entries(true, None).await.unwrap()), ["Banana"]);
        assert!(store.fetch_entries(true, Some("car")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn daily_log_is_scoped_to_date() {
        let store = seeded_store().await;
        store
            .add_entry_to_meal_and_daily_log(new_entry("Soup", date!(2023 - 12 - 06), "Dinner"))
            .await
            .unwrap();

        let day = store.fetch_daily_log(date!(2023 - 12 - 05)).await.unwrap();
        assert_eq!(day.len(), 3);
        assert_eq!(day[0].name, "Apple");
        let next = store.fetch_daily_log(date!(2023 - 12 - 06)).await.unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].meal_type, "Dinner");
    }

    #[tokio::test]
    async fn set_favorite_unknown_id_is_none() {
        let store = InMemoryNutritionStore::new();
        assert!(store.set_favorite(Uuid::new_v4(), true).await.unwrap().is_none());
        assert!(store.get_entry(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn photo_bytes_are_kept_without_storage() {
        let store = InMemoryNutritionStore::new();
        let mut entry = new_entry("Toast", date!(2023 - 11 - 24), "Breakfast");
        entry.meal_photo = Some(Bytes::from_static(b"\xFF\xD8\xFFjpeg"));

        let stored = store.add_entry_to_meal_and_daily_log(entry).await.unwrap();
        assert!(stored.has_photo());
        assert!(stored.photo_key.is_none());
        assert!(stored.meal_photo_link.is_empty());
    }

    #[tokio::test]
    async fn empty_photo_is_treated_as_absent() {
        let state = crate::state::AppState::fake();
        let mut entry = new_entry("Toast", date!(2023 - 11 - 24), "Breakfast");
        entry.meal_photo = Some(Bytes::new());

        let stored = state.store.add_entry_to_meal_and_daily_log(entry).await.unwrap();
        assert!(!stored.has_photo());
        assert!(stored.meal_photo_link.is_empty());
    }

    #[tokio::test]
    async fn photo_is_uploaded_when_storage_is_present() {
        let state = crate::state::AppState::fake();
        let mut entry = new_entry("Toast", date!(2023 - 11 - 24), "Breakfast");
        entry.meal_photo = Some(Bytes::from_static(b"\xFF\xD8\xFFjpeg"));

        let stored = state.store.add_entry_to_meal_and_daily_log(entry).await.unwrap();
        let key = stored.photo_key.clone().unwrap();
        assert!(key.starts_with("entries/2023-11-24/"));
        assert_eq!(stored.meal_photo_link, key);
        assert!(stored.meal_photo.is_none());
    }
}
