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

//! Food recommendations for a patient, chosen from the practice's food list.
//!
//! The model sees the whole food list as JSON and may return at most five
//! items. The flow additionally never returns more recommendations than the
//! list had foods.

use ahara_ai::{define_flow, Flow, Invoker};
use ahara_core::schema::{Field, SchemaNode, StringFormat};
use ahara_core::{FlowDefinition, Registry, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NAME: &str = "recommendFoodsForPatientFlow";

pub const MAX_RECOMMENDATIONS: usize = 5;

const PROMPT: &str = "You are an expert Ayurvedic nutritionist.

A user is searching for foods for a specific patient. Based on the patient's profile and their search query, recommend up to 5 suitable food items from the provided list.

For each recommendation, provide a clear and concise reason why it is beneficial for this particular patient, considering their dosha, health parameters (like weight and height), and Ayurvedic principles.

Patient Profile:
{{{patientProfile}}}

Food Search Query: \"{{searchQuery}}\"

Available Food List (JSON):
```json
{{{foodList}}}
```

Provide your recommendations in the specified output format.
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendFoodsInput {
    pub patient_profile: String,
    pub search_query: String,
    /// A JSON array of the foods to choose from.
    pub food_list: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecommendation {
    pub name: String,
    pub reasoning: String,
    pub ayurvedic_properties: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendFoodsOutput {
    pub recommendations: Vec<FoodRecommendation>,
}

fn recommendation_schema() -> Result<SchemaNode> {
    Ok(SchemaNode::object([
        Field::required(
            "name",
            SchemaNode::string().describe("The name of the recommended food item."),
        ),
        Field::required(
            "reasoning",
            SchemaNode::string().describe(
                "A brief explanation of why this food is recommended for the patient, based on their profile and Ayurvedic principles.",
            ),
        ),
        Field::required(
            "ayurvedicProperties",
            SchemaNode::string()
                .describe("The Ayurvedic properties of the food (e.g., V-P-K+, Sweet, Cooling)."),
        ),
    ])?)
}

pub fn definition() -> Result<FlowDefinition> {
    FlowDefinition::builder(NAME)
        .with_description("Recommends foods for a patient based on their profile and a search query.")
        .input_schema(SchemaNode::object([
            Field::required(
                "patientProfile",
                SchemaNode::string().describe(
                    "A summary of the patient's profile, including age, gender, dosha, health conditions, weight, and height.",
                ),
            ),
            Field::required(
                "searchQuery",
                SchemaNode::string().describe("The user's search query for a food type or name."),
            ),
            Field::required(
                "foodList",
                SchemaNode::string().format(StringFormat::JsonArray).describe(
                    "A JSON string of available food items to consider for recommendations.",
                ),
            ),
        ])?)
        .output_schema(SchemaNode::object([Field::required(
            "recommendations",
            SchemaNode::array(recommendation_schema()?)
                .max_items(MAX_RECOMMENDATIONS)
                .describe("A list of up to 5 recommended food items."),
        )])?)
        .prompt(PROMPT)
        .build()
}

/// The number of foods in the input list. Input validation has already
/// checked that the list is a JSON array.
fn food_count(food_list: &str) -> usize {
    serde_json::from_str::<Vec<Value>>(food_list)
        .map(|foods| foods.len())
        .unwrap_or(0)
}

/// Trims `output` to `min(5, number of foods offered)`.
pub fn limit_recommendations(
    input: &RecommendFoodsInput,
    mut output: RecommendFoodsOutput,
) -> RecommendFoodsOutput {
    let limit = MAX_RECOMMENDATIONS.min(food_count(&input.food_list));
    if output.recommendations.len() > limit {
        log::debug!(
            "trimming {} recommendations to {}",
            output.recommendations.len(),
            limit
        );
        output.recommendations.truncate(limit);
    }
    output
}

pub fn define(
    registry: &Registry,
    invoker: Invoker,
) -> Result<Flow<RecommendFoodsInput, RecommendFoodsOutput>> {
    let flow: Flow<RecommendFoodsInput, RecommendFoodsOutput> =
        define_flow(registry, definition()?, invoker)?;
    Ok(flow.with_post_process(limit_recommendations))
}
