use thiserror::Error;

use crate::nutrients::NutrientType;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("food name must not be empty")]
    EmptyName,
    #[error("invalid value {value:?} for {nutrient}")]
    InvalidNutrientValue { nutrient: NutrientType, value: String },
    #[error("could not save entry: {0:#}")]
    Store(anyhow::Error),
}
