use std::sync::Arc;

use time::Date;
use tracing::{error, info, instrument, warn};

use super::{error::FormError, state::FormState};
use crate::{
    entries::store::{NewEntry, NutritionDataStore, NutritionEntry},
    nutrients::{NutrientGroup, NutrientType},
};

pub const DEFAULT_SERVING_SIZE: &str = "1 serving";
pub const DEFAULT_FOOD_GROUP: &str = "Grains";

/// Submits the add-item form for one diary date and meal.
pub struct AddItemForm {
    date: Date,
    meal_type: String,
    store: Arc<dyn NutritionDataStore>,
}

impl AddItemForm {
    pub fn new(date: Date, meal_type: impl Into<String>, store: Arc<dyn NutritionDataStore>) -> Self {
        Self {
            date,
            meal_type: meal_type.into(),
            store,
        }
    }

    /// Validates the form and converts it into a store request. Nothing is written.
    pub fn build_entry(&self, state: &FormState) -> Result<NewEntry, FormError> {
        let name = state.name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName);
        }

        let parsed = state
            .nutrients
            .parse_all()
            .map_err(|(nutrient, value)| FormError::InvalidNutrientValue { nutrient, value })?;

        Ok(NewEntry {
            date: self.date,
            meal_type: self.meal_type.clone(),
            name: name.to_string(),
            calories: parsed.get(NutrientType::Calories),
            protein: parsed.get(NutrientType::Protein),
            carbs: parsed.get(NutrientType::Carbs),
            fat: parsed.get(NutrientType::Fats),
            sugars: 0.0,
            added_sugars: 0.0,
            cholesterol: 0.0,
            sodium: parsed.get(NutrientType::Sodium),
            vitamins: parsed.group_map(NutrientGroup::Vitamin),
            minerals: parsed.group_map(NutrientGroup::Mineral),
            serving_size: DEFAULT_SERVING_SIZE.to_string(),
            food_group: DEFAULT_FOOD_GROUP.to_string(),
            user_notes: state.note.clone(),
            meal_photo: state.photo.clone(),
            meal_photo_link: String::new(),
        })
    }

    /// Persists the entry, then calls `on_dismiss` once so the caller can
    /// refresh its daily log. Rejected forms never reach the store.
    #[instrument(skip(self, state, on_dismiss), fields(date = %self.date, meal_type = %self.meal_type))]
    pub async fn submit<F>(&self, state: &FormState, on_dismiss: F) -> Result<NutritionEntry, FormError>
    where
        F: FnOnce(),
    {
        let entry = match self.build_entry(state) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "add item form rejected");
                return Err(e);
            }
        };

        let stored = self
            .store
            .add_entry_to_meal_and_daily_log(entry)
            .await
            .map_err(|e| {
                error!(error = %e, "add_entry_to_meal_and_daily_log failed");
                FormError::Store(e)
            })?;

        info!(
            id = %stored.id,
            name = %stored.name,
            calories = stored.calories,
            protein = stored.protein,
            carbs = stored.carbs,
            fats = stored.fats,
            "food entry added"
        );
        on_dismiss();
        Ok(stored)
    }
}
