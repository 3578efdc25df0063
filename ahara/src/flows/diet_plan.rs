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

//! Personalised Ayurvedic diet plans from free-text patient data.

use ahara_ai::{define_flow, Flow, Invoker};
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::{FlowDefinition, Registry, Result};
use serde::{Deserialize, Serialize};

pub const NAME: &str = "generateAyurvedicDietPlanFlow";

const PROMPT: &str = "You are an expert Ayurvedic doctor.

  Based on the following patient data, generate a personalized Ayurvedic diet plan. Consider the patient's dosha, imbalances, health parameters, and dietary preferences.

  Patient Data: {{{patientData}}}

  Ensure the diet plan aligns with Ayurvedic principles and provides specific food recommendations, meal timings, and lifestyle advice.
";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanInput {
    /// Dosha, imbalances, health parameters and dietary preferences.
    pub patient_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlanOutput {
    pub diet_plan: String,
}

pub fn definition() -> Result<FlowDefinition> {
    FlowDefinition::builder(NAME)
        .with_description("Generates a personalized Ayurvedic diet plan for a patient.")
        .input_schema(SchemaNode::object([Field::required(
            "patientData",
            SchemaNode::string().min_length(20).describe(
                "Patient data including dosha, imbalances, health parameters, and dietary preferences.",
            ),
        )])?)
        .output_schema(SchemaNode::object([Field::required(
            "dietPlan",
            SchemaNode::string().describe("The generated Ayurvedic diet plan."),
        )])?)
        .prompt(PROMPT)
        .build()
}

pub fn define(registry: &Registry, invoker: Invoker) -> Result<Flow<DietPlanInput, DietPlanOutput>> {
    define_flow(registry, definition()?, invoker)
}
