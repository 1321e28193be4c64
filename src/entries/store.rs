use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One recorded food item, tied to a diary date and meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionEntry {
    pub id: Uuid,
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub meal_type: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub sugars: f64,
    pub added_sugars: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub vitamins: BTreeMap<String, f64>,
    pub minerals: BTreeMap<String, f64>,
    pub serving_size: String,
    pub food_group: String,
    pub user_notes: String,
    /// Raw bytes are only kept by stores without object storage.
    #[serde(skip)]
    pub meal_photo: Option<Bytes>,
    pub meal_photo_link: String,
    #[serde(skip)]
    pub photo_key: Option<String>,
    pub is_favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl NutritionEntry {
    pub fn has_photo(&self) -> bool {
        self.photo_key.is_some() || self.meal_photo.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Everything `add_entry_to_meal_and_daily_log` needs to persist an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: Date,
    pub meal_type: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sugars: f64,
    pub added_sugars: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub vitamins: BTreeMap<String, f64>,
    pub minerals: BTreeMap<String, f64>,
    pub serving_size: String,
    pub food_group: String,
    pub user_notes: String,
    pub meal_photo: Option<Bytes>,
    pub meal_photo_link: String,
}

/// Persistence seam between the form/lookup logic and the database.
#[async_trait]
pub trait NutritionDataStore: Send + Sync {
    async fn add_entry_to_meal_and_daily_log(&self, entry: NewEntry)
        -> anyhow::Result<NutritionEntry>;

    /// Newest first. `favorites` narrows to starred entries; `name_search`
    /// is a case-insensitive substring, `None` or empty meaning no filter.
    async fn fetch_entries(
        &self,
        favorites: bool,
        name_search: Option<&str>,
    ) -> anyhow::Result<Vec<NutritionEntry>>;

    /// Entries of one diary date, oldest first.
    async fn fetch_daily_log(&self, date: Date) -> anyhow::Result<Vec<NutritionEntry>>;

    async fn get_entry(&self, id: Uuid) -> anyhow::Result<Option<NutritionEntry>>;

    async fn set_favorite(&self, id: Uuid, favorite: bool)
        -> anyhow::Result<Option<NutritionEntry>>;
}

pub(crate) fn name_matches(name: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        None | Some("") => true,
        Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
    }
}

#[cfg(test)]
mod store_tests {
    use super::*;

    #[test]
    fn name_matching_is_case_insensitive_substring() {
        assert!(name_matches("Apple", Some("ap")));
        assert!(name_matches("Pineapple", Some("APP")));
        assert!(!name_matches("Banana", Some("ap")));
        assert!(name_matches("Banana", None));
        assert!(name_matches("Banana", Some("")));
        assert!(name_matches("Banana", Some("  ")));
    }
}
