// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Patients and Foods
//!
//! The record types the flows are fed from. Records live in an external
//! store; these types only describe what the flows need from them.

use ahara_core::schema::{validate, Field, SchemaNode, ValidationError};
use ahara_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NOT_SPECIFIED: &str = "Not specified";
const NONE: &str = "None";

/// A patient record as entered on the patient form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub dosha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bowel_movements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_intake: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Diet plans saved on the record, in whatever shape they were stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_plans: Option<Vec<Value>>,
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

impl PatientProfile {
    /// The schema a patient record must satisfy.
    pub fn schema() -> Result<SchemaNode> {
        let optional_text = |name: &str| Field::optional(name, SchemaNode::string());
        Ok(SchemaNode::object([
            optional_text("id"),
            Field::required("name", SchemaNode::string().min_length(2)),
            Field::required("age", SchemaNode::integer().minimum(1)),
            Field::required("gender", SchemaNode::string().min_length(1)),
            Field::required("dosha", SchemaNode::string().min_length(1)),
            optional_text("diet"),
            optional_text("mealFrequency"),
            optional_text("bowelMovements"),
            optional_text("waterIntake"),
            optional_text("allergies"),
            optional_text("notes"),
            Field::optional("dietPlans", SchemaNode::array(SchemaNode::any())),
        ])?)
    }

    /// Reads a patient record, reporting every schema violation at once.
    pub fn from_json(value: Value) -> Result<Self> {
        let value = validate(&Self::schema()?, &value)?;
        serde_json::from_value(value.clone())
            .map_err(|e| ValidationError::undecodable(&e, value).into())
    }

    /// The profile text handed to the diet-plan and recommendation flows.
    pub fn summary(&self) -> String {
        format!(
            "Name: {}, Age: {}, Gender: {}, Dosha: {}.\nDietary Preferences: {}.\nHealth Notes: {}.\nAllergies: {}.",
            self.name,
            self.age,
            self.gender,
            self.dosha,
            or_default(&self.diet, NOT_SPECIFIED),
            or_default(&self.notes, NOT_SPECIFIED),
            or_default(&self.allergies, NONE),
        )
    }
}

/// An entry of the food reference database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub category: String,
    /// Dosha effects and taste, e.g. `V-P-K+, Sweet, Cooling`.
    pub properties: String,
    pub qualities: String,
}

/// Serializes `foods` as the JSON array the recommendation flow expects.
pub fn food_list_json(foods: &[FoodItem]) -> Result<String> {
    serde_json::to_string(foods)
        .map_err(|e| Error::new_internal(format!("failed to serialize food list: {}", e)))
}
