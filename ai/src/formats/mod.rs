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

//! # Output Formats
//!
//! How a raw generator response becomes a JSON value depends only on the
//! output schema: an object with a single string field is generated as plain
//! text, everything else as JSON.

mod json;
mod text;

pub use self::json::JsonFormat;
pub use self::text::TextFormat;

use ahara_core::error::Result;
use ahara_core::schema::SchemaNode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The mode a generator is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputMode {
    Text,
    Json,
}

/// Turns raw model output into a value shaped like the output schema.
pub trait Format {
    fn mode(&self) -> OutputMode;

    /// Parses the complete response text.
    fn parse(&self, raw: &str) -> Result<Value>;

    /// Instructions appended to the prompt, if any.
    fn instructions(&self) -> Option<String> {
        None
    }
}

/// Picks the format for `output_schema`.
pub fn resolve_format(output_schema: &SchemaNode) -> Box<dyn Format + Send + Sync> {
    match output_schema.single_string_field() {
        Some(field) => Box::new(TextFormat::new(field)),
        None => Box::new(JsonFormat::new(output_schema)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahara_core::schema::Field;

    #[test]
    fn test_single_string_field_is_text() {
        let schema =
            SchemaNode::object([Field::required("answer", SchemaNode::string())]).unwrap();
        assert_eq!(resolve_format(&schema).mode(), OutputMode::Text);
    }

    #[test]
    fn test_everything_else_is_json() {
        let two_strings = SchemaNode::object([
            Field::required("nutritionalAnalysis", SchemaNode::string()),
            Field::required("ayurvedicAnalysis", SchemaNode::string()),
        ])
        .unwrap();
        let one_number = SchemaNode::object([Field::required("score", SchemaNode::number())]).unwrap();
        assert_eq!(resolve_format(&two_strings).mode(), OutputMode::Json);
        assert_eq!(resolve_format(&one_number).mode(), OutputMode::Json);
    }
}
