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

use super::{Format, OutputMode};
use ahara_core::error::Result;
use serde_json::{Map, Value};

/// Places the raw response, untouched, into the schema's only field.
#[derive(Debug)]
pub struct TextFormat {
    field: String,
}

impl TextFormat {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Format for TextFormat {
    fn mode(&self) -> OutputMode {
        OutputMode::Text
    }

    fn parse(&self, raw: &str) -> Result<Value> {
        let mut object = Map::new();
        object.insert(self.field.clone(), Value::String(raw.to_string()));
        Ok(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_text_verbatim() {
        let format = TextFormat::new("answer");
        let raw = "  **Pitta** balance:\n* cucumber\n* coconut {not json}  ";
        assert_eq!(format.parse(raw).unwrap(), json!({ "answer": raw }));
        assert!(format.instructions().is_none());
    }
}
