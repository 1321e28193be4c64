use bytes::Bytes;

use crate::{lookup::FilterTab, nutrients::NutrientType, nutrients::NutrientValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedField {
    Name,
    NutrientInput,
    Note,
}

/// Transient state of the add-item form. Never persisted; dropped on cancel.
#[derive(Debug, Clone)]
pub struct FormState {
    pub name: String,
    pub nutrients: NutrientValues,
    pub note: String,
    pub photo: Option<Bytes>,
    selected_nutrient: NutrientType,
    focused: Option<FocusedField>,
    micro_nutrients_expanded: bool,
    notes_expanded: bool,
    filter: FilterTab,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            nutrients: NutrientValues::default(),
            note: String::new(),
            photo: None,
            selected_nutrient: NutrientType::Calories,
            focused: None,
            micro_nutrients_expanded: false,
            notes_expanded: false,
            filter: FilterTab::All,
        }
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self, field: Option<FocusedField>) {
        self.focused = field;
    }

    pub fn focused(&self) -> Option<FocusedField> {
        self.focused
    }

    /// The suggestion list replaces the form while the name field has focus.
    pub fn showing_previous_entries(&self) -> bool {
        self.focused == Some(FocusedField::Name)
    }

    pub fn keyboard_open(&self) -> bool {
        self.focused.is_some()
    }

    /// Tapping a nutrient tile selects it and moves focus to the value input.
    pub fn select_nutrient(&mut self, nutrient: NutrientType) {
        self.selected_nutrient = nutrient;
        self.focused = Some(FocusedField::NutrientInput);
    }

    pub fn selected_nutrient(&self) -> NutrientType {
        self.selected_nutrient
    }

    pub fn selected_value(&self) -> &str {
        self.nutrients.get(self.selected_nutrient)
    }

    pub fn set_selected_value(&mut self, value: impl Into<String>) {
        self.nutrients.set(self.selected_nutrient, value);
    }

    /// A pristine "0" is cleared so typing replaces it.
    pub fn begin_editing(&mut self) {
        self.focused = Some(FocusedField::NutrientInput);
        if self.selected_value() == "0" {
            self.set_selected_value("");
        }
    }

    pub fn end_editing(&mut self) {
        if self.selected_value().trim().is_empty() {
            self.set_selected_value("0");
        }
        if self.focused == Some(FocusedField::NutrientInput) {
            self.focused = None;
        }
    }

    pub fn toggle_micro_nutrients(&mut self) {
        self.micro_nutrients_expanded = !self.micro_nutrients_expanded;
    }

    pub fn micro_nutrients_visible(&self) -> bool {
        self.micro_nutrients_expanded && self.focused != Some(FocusedField::Name)
    }

    pub fn toggle_notes(&mut self) {
        self.notes_expanded = !self.notes_expanded;
    }

    pub fn note_editor_visible(&self) -> bool {
        self.notes_expanded && self.focused != Some(FocusedField::Name)
    }

    pub fn set_filter(&mut self, tab: FilterTab) {
        self.filter = tab;
    }

    pub fn filter(&self) -> FilterTab {
        self.filter
    }
}
