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

//! Detailed nutritional and Ayurvedic analysis of a single food item.

use ahara_ai::{define_flow, Flow, Invoker};
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::{FlowDefinition, Registry, Result};
use serde::{Deserialize, Serialize};

pub const NAME: &str = "generateFoodAnalysisFlow";

const PROMPT: &str = "You are an expert in both modern nutrition and ancient Ayurvedic science.

Analyze the food item \"{{foodName}}\".

Known Ayurvedic properties are: \"{{foodProperties}}\".

Provide a concise analysis covering the following points. Use Markdown for formatting. Keep descriptions to one or two lines per point.

*   **Nutritional Profile**: Briefly list the key nutrients.
*   **Rasa (Taste)**: Describe its primary tastes.
*   **Guna (Qualities)**: List its main qualities.
*   **Virya (Potency)**: State its heating or cooling effect.
*   **Vipaka (Post-digestive effect)**: Describe its effect after digestion.
*   **Prabhava (Unique effect)**: Mention any special action, or state \"None\".
*   **Dosha Impact**: Explain how it pacifies or aggravates Vata, Pitta, and Kapha.

Return this information in the 'detailedAnalysis' field.
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysisInput {
    pub food_name: String,
    /// For example `V-P-K+, Sweet, Cooling`.
    pub food_properties: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysisOutput {
    pub detailed_analysis: String,
}

pub fn definition() -> Result<FlowDefinition> {
    FlowDefinition::builder(NAME)
        .with_description("Generates a detailed nutritional and Ayurvedic analysis for a food item.")
        .input_schema(SchemaNode::object([
            Field::required(
                "foodName",
                SchemaNode::string().describe("The name of the food item to analyze."),
            ),
            Field::required(
                "foodProperties",
                SchemaNode::string().describe(
                    "Known Ayurvedic properties of the food (e.g., V-P-K+, Sweet, Cooling).",
                ),
            ),
        ])?)
        .output_schema(SchemaNode::object([Field::required(
            "detailedAnalysis",
            SchemaNode::string().describe(
                "A detailed analysis of the food, including its primary nutrients, vitamins, minerals, and a comprehensive breakdown of its Ayurvedic qualities (Rasa, Virya, Vipaka) and its effects on the Vata, Pitta, and Kapha doshas.",
            ),
        )])?)
        .prompt(PROMPT)
        .build()
}

pub fn define(
    registry: &Registry,
    invoker: Invoker,
) -> Result<Flow<FoodAnalysisInput, FoodAnalysisOutput>> {
    define_flow(registry, definition()?, invoker)
}
