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

//! # JSON Output Format
//!
//! Asks the model for JSON matching the output schema and extracts the first
//! JSON object or array from whatever comes back.

use super::{Format, OutputMode};
use crate::extract::extract_json;
use ahara_core::error::{Error, Result};
use ahara_core::schema::SchemaNode;
use serde_json::{Map, Value};

/// The JSON format for a given output schema.
#[derive(Debug)]
pub struct JsonFormat {
    instructions: String,
    /// Set when the schema is an object whose only field is an array; a bare
    /// array response is wrapped into this field.
    array_field: Option<String>,
}

impl JsonFormat {
    pub fn new(output_schema: &SchemaNode) -> Self {
        let rendered = serde_json::to_string_pretty(&output_schema.to_json_schema())
            .unwrap_or_default();
        Self {
            instructions: format!(
                "Output should be in JSON format and conform to the following schema:\n\n```\n{}\n```\n",
                rendered
            ),
            array_field: output_schema.single_array_field().map(String::from),
        }
    }
}

impl Format for JsonFormat {
    fn mode(&self) -> OutputMode {
        OutputMode::Json
    }

    fn parse(&self, raw: &str) -> Result<Value> {
        let value: Value = extract_json(raw)?
            .ok_or_else(|| Error::new_schema_mismatch("response contains no JSON", raw))?;
        match (value, &self.array_field) {
            (Value::Array(items), Some(field)) => {
                let mut object = Map::new();
                object.insert(field.clone(), Value::Array(items));
                Ok(Value::Object(object))
            }
            (value, _) => Ok(value),
        }
    }

    fn instructions(&self) -> Option<String> {
        Some(self.instructions.clone())
    }
}
