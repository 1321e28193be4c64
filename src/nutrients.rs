use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Every quantity the food form can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NutrientType {
    Calories,
    Protein,
    Carbs,
    Fats,
    VitaminA,
    VitaminC,
    VitaminD,
    VitaminE,
    VitaminB6,
    VitaminB12,
    Folate,
    Calcium,
    Iron,
    Magnesium,
    Phosphorus,
    Potassium,
    Sodium,
    Zinc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientGroup {
    Macro,
    Vitamin,
    Mineral,
}

impl NutrientType {
    pub const ALL: [NutrientType; 18] = [
        NutrientType::Calories,
        NutrientType::Protein,
        NutrientType::Carbs,
        NutrientType::Fats,
        NutrientType::VitaminA,
        NutrientType::VitaminC,
        NutrientType::VitaminD,
        NutrientType::VitaminE,
        NutrientType::VitaminB6,
        NutrientType::VitaminB12,
        NutrientType::Folate,
        NutrientType::Calcium,
        NutrientType::Iron,
        NutrientType::Magnesium,
        NutrientType::Phosphorus,
        NutrientType::Potassium,
        NutrientType::Sodium,
        NutrientType::Zinc,
    ];

    /// Wire name, also used as the key in the vitamins/minerals maps.
    pub fn as_str(self) -> &'static str {
        match self {
            NutrientType::Calories => "calories",
            NutrientType::Protein => "protein",
            NutrientType::Carbs => "carbs",
            NutrientType::Fats => "fats",
            NutrientType::VitaminA => "vitaminA",
            NutrientType::VitaminC => "vitaminC",
            NutrientType::VitaminD => "vitaminD",
            NutrientType::VitaminE => "vitaminE",
            NutrientType::VitaminB6 => "vitaminB6",
            NutrientType::VitaminB12 => "vitaminB12",
            NutrientType::Folate => "folate",
            NutrientType::Calcium => "calcium",
            NutrientType::Iron => "iron",
            NutrientType::Magnesium => "magnesium",
            NutrientType::Phosphorus => "phosphorus",
            NutrientType::Potassium => "potassium",
            NutrientType::Sodium => "sodium",
            NutrientType::Zinc => "zinc",
        }
    }

    pub fn group(self) -> NutrientGroup {
        match self {
            NutrientType::Calories
            | NutrientType::Protein
            | NutrientType::Carbs
            | NutrientType::Fats => NutrientGroup::Macro,
            NutrientType::VitaminA
            | NutrientType::VitaminC
            | NutrientType::VitaminD
            | NutrientType::VitaminE
            | NutrientType::VitaminB6
            | NutrientType::VitaminB12
            | NutrientType::Folate => NutrientGroup::Vitamin,
            _ => NutrientGroup::Mineral,
        }
    }

    /// Display unit of the input tile.
    pub fn unit(self) -> &'static str {
        match self.group() {
            NutrientGroup::Macro => "g",
            NutrientGroup::Vitamin | NutrientGroup::Mineral => "mg",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NutrientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a user-typed amount. Only finite, non-negative decimals are accepted.
/// Surrounding whitespace is ignored and `-0` comes back as `0`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value.abs())
}

/// String-encoded value for each nutrient, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NutrientValues {
    values: [String; 18],
}

impl Default for NutrientValues {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| "0".to_string()),
        }
    }
}

impl NutrientValues {
    pub fn get(&self, nutrient: NutrientType) -> &str {
        &self.values[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: NutrientType, value: impl Into<String>) {
        self.values[nutrient.index()] = value.into();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NutrientType, &str)> + '_ {
        NutrientType::ALL.into_iter().map(move |n| (n, self.get(n)))
    }

    /// Parses every value; the first failure is returned with its raw text.
    pub fn parse_all(&self) -> Result<ParsedNutrients, (NutrientType, String)> {
        let mut amounts = [0.0; 18];
        for (nutrient, raw) in self.iter() {
            amounts[nutrient.index()] =
                parse_amount(raw).ok_or_else(|| (nutrient, raw.to_string()))?;
        }
        Ok(ParsedNutrients { amounts })
    }
}

/// Numeric amounts after successful validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedNutrients {
    amounts: [f64; 18],
}

impl ParsedNutrients {
    pub fn get(&self, nutrient: NutrientType) -> f64 {
        self.amounts[nutrient.index()]
    }

    /// Non-zero amounts of one group, keyed by wire name.
    pub fn group_map(&self, group: NutrientGroup) -> BTreeMap<String, f64> {
        NutrientType::ALL
            .into_iter()
            .filter(|n| n.group() == group)
            .filter_map(|n| {
                let amount = self.get(n);
                (amount > 0.0).then(|| (n.as_str().to_string(), amount))
            })
            .collect()
    }
}
