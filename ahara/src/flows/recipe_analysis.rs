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

//! Nutritional and Ayurvedic analysis of a custom recipe.

use ahara_ai::{define_flow, Flow, Invoker};
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::{FlowDefinition, Registry, Result};
use serde::{Deserialize, Serialize};

pub const NAME: &str = "analyzeRecipeAyurvedicPropertiesFlow";

const PROMPT: &str = "You are an expert dietitian with extensive knowledge of both modern nutrition and Ayurveda.

You will analyze a recipe provided by the user for its nutritional content and its effects according to Ayurvedic principles.

Recipe Name: {{{recipeName}}}
Ingredients: {{{ingredients}}}
Instructions: {{{instructions}}}

Provide a detailed nutritional analysis and an Ayurvedic analysis. For both sections, you MUST use bullet points (e.g., * point) to list out the key information. Do not write in long paragraphs.

The nutritional analysis should cover macronutrients and micronutrients.
The Ayurvedic analysis should cover the effects on each dosha (Vata, Pitta, Kapha) and any potential imbalances.
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAnalysisInput {
    pub recipe_name: String,
    pub ingredients: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAnalysisOutput {
    pub nutritional_analysis: String,
    pub ayurvedic_analysis: String,
}

pub fn definition() -> Result<FlowDefinition> {
    FlowDefinition::builder(NAME)
        .with_description("Analyzes a recipe for its nutritional and Ayurvedic properties.")
        .input_schema(SchemaNode::object([
            Field::required(
                "recipeName",
                SchemaNode::string()
                    .min_length(3)
                    .describe("The name of the recipe."),
            ),
            Field::required(
                "ingredients",
                SchemaNode::string()
                    .min_length(10)
                    .describe("The ingredients of the recipe."),
            ),
            Field::required(
                "instructions",
                SchemaNode::string()
                    .min_length(10)
                    .describe("The instructions for preparing the recipe."),
            ),
        ])?)
        .output_schema(SchemaNode::object([
            Field::required(
                "nutritionalAnalysis",
                SchemaNode::string().describe(
                    "Detailed nutritional analysis of the recipe, presented in bullet points.",
                ),
            ),
            Field::required(
                "ayurvedicAnalysis",
                SchemaNode::string().describe(
                    "Detailed Ayurvedic analysis of the recipe, including dosha effects, presented in bullet points.",
                ),
            ),
        ])?)
        .prompt(PROMPT)
        .build()
}

pub fn define(
    registry: &Registry,
    invoker: Invoker,
) -> Result<Flow<RecipeAnalysisInput, RecipeAnalysisOutput>> {
    define_flow(registry, definition()?, invoker)
}
