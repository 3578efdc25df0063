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

//! Conversational diet and wellness Q&A.

use ahara_ai::{define_flow, Flow, Invoker};
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::{FlowDefinition, Registry, Result};
use serde::{Deserialize, Serialize};

pub const NAME: &str = "answerDietWellnessQuestionsFlow";

const PROMPT: &str = "You are a helpful AI assistant providing information related to diet and wellness, with a focus on Ayurvedic principles.

  Answer the following question:
  {{question}}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInput {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub answer: String,
}

pub fn definition() -> Result<FlowDefinition> {
    FlowDefinition::builder(NAME)
        .with_description("Answers diet and wellness questions in natural language.")
        .input_schema(SchemaNode::object([Field::required(
            "question",
            SchemaNode::string().describe("The question about diet and wellness."),
        )])?)
        .output_schema(SchemaNode::object([Field::required(
            "answer",
            SchemaNode::string().describe("The answer to the question."),
        )])?)
        .prompt(PROMPT)
        .build()
}

pub fn define(registry: &Registry, invoker: Invoker) -> Result<Flow<QuestionInput, AnswerOutput>> {
    define_flow(registry, definition()?, invoker)
}
