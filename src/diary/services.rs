use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::entries::store::{NutritionDataStore, NutritionEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroTotals {
    fn add(&mut self, e: &NutritionEntry) {
        self.calories += e.calories;
        self.protein += e.protein;
        self.carbs += e.carbs;
        self.fats += e.fats;
    }

    fn merge(&mut self, other: &MacroTotals) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fats += other.fats;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealLog {
    pub meal_type: String,
    pub entries: Vec<NutritionEntry>,
    pub totals: MacroTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub meals: Vec<MealLog>,
    pub totals: MacroTotals,
}

/// Standard meals first in day order, anything else alphabetically after.
fn meal_rank(meal_type: &str) -> (u8, String) {
    let lower = meal_type.to_lowercase();
    let rank = match lower.as_str() {
        "breakfast" => 0,
        "lunch" => 1,
        "dinner" => 2,
        "snack" | "snacks" => 3,
        _ => 4,
    };
    (rank, lower)
}

pub fn group_by_meal(date: Date, entries: Vec<NutritionEntry>) -> DailyLog {
    let mut by_meal: BTreeMap<(u8, String), MealLog> = BTreeMap::new();
    for entry in entries {
        let meal = by_meal
            .entry(meal_rank(&entry.meal_type))
            .or_insert_with(|| MealLog {
                meal_type: entry.meal_type.clone(),
                entries: Vec::new(),
                totals: MacroTotals::default(),
            });
        meal.totals.add(&entry);
        meal.entries.push(entry);
    }

    let meals: Vec<MealLog> = by_meal.into_values().collect();
    let mut totals = MacroTotals::default();
    for meal in &meals {
        totals.merge(&meal.totals);
    }
    DailyLog { date, meals, totals }
}

/// What the diary screen re-reads after the add-item form is dismissed.
pub async fn daily_log(store: &dyn NutritionDataStore, date: Date) -> anyhow::Result<DailyLog> {
    let entries = store.fetch_daily_log(date).await?;
    Ok(group_by_meal(date, entries))
}

#[cfg(test)]
mod diary_tests {
    use time::macros::date;

    use super::*;
    use crate::entries::{memory::memory_tests::new_entry, memory::InMemoryNutritionStore};

    #[tokio::test]
    async fn groups_in_meal_order_with_totals() {
        let store = InMemoryNutritionStore::new();
        let day = date!(2023 - 12 - 05);
        for (name, meal) in [
            ("Pizza", "Dinner"),
            ("Chips", "Late night"),
            ("Oats", "Breakfast"),
            ("Eggs", "breakfast"),
            ("Salad", "Lunch"),
        ] {
            store
                .add_entry_to_meal_and_daily_log(new_entry(name, day, meal))
                .await
                .unwrap();
        }
        store
            .add_entry_to_meal_and_daily_log(new_entry("Other day", date!(2023 - 12 - 04), "Lunch"))
            .await
            .unwrap();

        let log = daily_log(&store, day).await.unwrap();
        let meals: Vec<&str> = log.meals.iter().map(|m| m.meal_type.as_str()).collect();
        assert_eq!(meals, ["Breakfast", "Lunch", "Dinner", "Late night"]);
        assert_eq!(log.meals[0].entries.len(), 2);
        assert_eq!(log.meals[0].totals.calories, 200.0);
        assert_eq!(log.totals.calories, 500.0);
        assert_eq!(log.totals.fats, 10.0);
    }

    #[test]
    fn empty_day_has_zero_totals() {
        let log = group_by_meal(date!(2024 - 01 - 01), Vec::new());
        assert!(log.meals.is_empty());
        assert_eq!(log.totals, MacroTotals::default());
    }

    #[test]
    fn daily_log_serializes_iso_date() {
        let log = group_by_meal(date!(2024 - 03 - 09), Vec::new());
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["totals"]["calories"], 0.0);
    }
}
