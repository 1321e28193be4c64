use std::collections::HashMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::services::DailyLog;
use crate::{entries::store::NutritionEntry, form::FormState, nutrients::NutrientType};

/// Body of the "Add" action. Nutrients left out keep their "0" default.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    #[serde(default)]
    pub nutrients: HashMap<NutrientType, String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub photo: Option<serde_bytes::ByteBuf>,
}

impl AddItemRequest {
    pub fn into_form_state(self) -> FormState {
        let mut state = FormState::new();
        state.name = self.name;
        for (nutrient, value) in self.nutrients {
            state.nutrients.set(nutrient, value);
        }
        state.note = self.note;
        state.photo = self.photo.map(|buf| Bytes::from(buf.into_vec()));
        state
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedEntryResponse {
    pub entry: NutritionEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_log: Option<DailyLog>,
}
