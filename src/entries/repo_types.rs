use std::collections::BTreeMap;

use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::store::NutritionEntry;

#[derive(Debug, FromRow)]
pub struct NutritionEntryRow {
    pub id: Uuid,
    pub log_date: Date,
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
    pub vitamins: Json<BTreeMap<String, f64>>,
    pub minerals: Json<BTreeMap<String, f64>>,
    pub serving_size: String,
    pub food_group: String,
    pub user_notes: String,
    pub meal_photo_link: String,
    pub photo_key: Option<String>,
    pub is_favorite: bool,
    pub created_at: OffsetDateTime,
}

impl From<NutritionEntryRow> for NutritionEntry {
    fn from(r: NutritionEntryRow) -> Self {
        Self {
            id: r.id,
            date: r.log_date,
            meal_type: r.meal_type,
            name: r.name,
            calories: r.calories,
            protein: r.protein,
            carbs: r.carbs,
            fats: r.fats,
            sugars: r.sugars,
            added_sugars: r.added_sugars,
            cholesterol: r.cholesterol,
            sodium: r.sodium,
            vitamins: r.vitamins.0,
            minerals: r.minerals.0,
            serving_size: r.serving_size,
            food_group: r.food_group,
            user_notes: r.user_notes,
            meal_photo: None,
            meal_photo_link: r.meal_photo_link,
            photo_key: r.photo_key,
            is_favorite: r.is_favorite,
            created_at: r.created_at,
        }
    }
}
