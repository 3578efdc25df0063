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

//! # Flow Definitions
//!
//! A [`FlowDefinition`] binds a unique name, an input schema, an output
//! schema and a prompt template. Definitions are built once at startup and
//! never change afterwards; building one checks that the template only
//! refers to declared input fields, so configuration mistakes surface before
//! the first request.

use crate::error::{Error, Result};
use crate::schema::{SchemaNode, SchemaType};
use crate::template::PromptTemplate;
use std::fmt;

/// The stages an invocation passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Validating,
    Rendering,
    Invoking,
    ValidatingOutput,
    Done,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowState::Validating => "validating",
            FlowState::Rendering => "rendering",
            FlowState::Invoking => "invoking",
            FlowState::ValidatingOutput => "validating_output",
            FlowState::Done => "done",
            FlowState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// An immutable, named pairing of schemas and a prompt template.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    name: String,
    description: Option<String>,
    input_schema: SchemaNode,
    output_schema: SchemaNode,
    template: PromptTemplate,
}

impl FlowDefinition {
    pub fn builder(name: impl Into<String>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input_schema(&self) -> &SchemaNode {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &SchemaNode {
        &self.output_schema
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }
}

/// Builder for a [`FlowDefinition`].
pub struct FlowDefinitionBuilder {
    name: String,
    description: Option<String>,
    input_schema: Option<SchemaNode>,
    output_schema: Option<SchemaNode>,
    prompt: Option<String>,
}

impl FlowDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
            output_schema: None,
            prompt: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_schema(mut self, schema: SchemaNode) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn output_schema(mut self, schema: SchemaNode) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt = Some(template.into());
        self
    }

    /// Finalizes the definition.
    ///
    /// Fails with `Error::Template` when the prompt refers to a field the
    /// input schema does not declare, with `Error::SchemaDefinition` when a
    /// schema carries a blank description, and with `Error::Internal` when a part
    /// is missing or a schema is not an object.
    pub fn build(self) -> Result<FlowDefinition> {
        if self.name.trim().is_empty() {
            return Err(Error::new_internal("flow name must not be empty"));
        }
        let input_schema = self.input_schema.ok_or_else(|| {
            Error::new_internal(format!("flow '{}' has no input schema", self.name))
        })?;
        let output_schema = self.output_schema.ok_or_else(|| {
            Error::new_internal(format!("flow '{}' has no output schema", self.name))
        })?;
        for (label, schema) in [("input", &input_schema), ("output", &output_schema)] {
            if schema.schema_type() != SchemaType::Object {
                return Err(Error::new_internal(format!(
                    "flow '{}' {} schema must be an object, got {}",
                    self.name,
                    label,
                    schema.schema_type()
                )));
            }
            schema.check_definition()?;
        }
        let source = self
            .prompt
            .ok_or_else(|| Error::new_internal(format!("flow '{}' has no prompt", self.name)))?;
        let template = PromptTemplate::parse(source)?;
        template.check_against(&input_schema)?;

        Ok(FlowDefinition {
            name: self.name,
            description: self.description,
            input_schema,
            output_schema,
            template,
        })
    }
}
