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

//! Conversions between Ahara generation requests and the Gemini wire format.

use crate::{Error, Result};
use ahara_ai::{GenerateRequest, OutputMode};
use serde_json::{Map, Value};

use super::types::*;

const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

/// Rewrites a JSON Schema into the OpenAPI subset Gemini accepts as a
/// `responseSchema`: upper-case type names, with `properties`, `required`,
/// `items`, `maxItems` and `description` kept and everything else dropped.
/// `propertyOrdering` pins the field order.
pub fn to_gemini_schema(schema: &Value) -> Value {
    let Some(object) = schema.as_object() else {
        return Value::Object(Map::new());
    };
    let mut out = Map::new();
    if let Some(ty) = object.get("type").and_then(Value::as_str) {
        out.insert("type".into(), Value::from(ty.to_uppercase()));
    }
    if let Some(description) = object.get("description") {
        out.insert("description".into(), description.clone());
    }
    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        let converted: Map<String, Value> = properties
            .iter()
            .map(|(name, schema)| (name.clone(), to_gemini_schema(schema)))
            .collect();
        let ordering: Vec<Value> = properties.keys().map(|k| Value::from(k.as_str())).collect();
        out.insert("properties".into(), Value::Object(converted));
        out.insert("propertyOrdering".into(), Value::Array(ordering));
    }
    if let Some(required) = object.get("required") {
        out.insert("required".into(), required.clone());
    }
    if let Some(items) = object.get("items") {
        out.insert("items".into(), to_gemini_schema(items));
    }
    if let Some(max_items) = object.get("maxItems") {
        out.insert("maxItems".into(), max_items.clone());
    }
    Value::Object(out)
}

/// Converts an Ahara `GenerateRequest` into a `GeminiRequest`.
pub fn to_gemini_request(req: &GenerateRequest) -> GeminiRequest {
    let (response_mime_type, response_schema) = match req.mode {
        OutputMode::Json => (
            Some("application/json".to_string()),
            req.output_schema
                .as_ref()
                .map(|schema| to_gemini_schema(schema.as_value())),
        ),
        OutputMode::Text => (None, None),
    };
    let config = GeminiGenerationConfig {
        temperature: req.config.temperature,
        max_output_tokens: req.config.max_output_tokens,
        top_k: req.config.top_k,
        top_p: req.config.top_p,
        stop_sequences: req.config.stop_sequences.clone(),
        response_mime_type,
        response_schema,
    };

    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart {
                text: Some(req.prompt.clone()),
                ..Default::default()
            }],
        }],
        generation_config: if config == GeminiGenerationConfig::default() {
            None
        } else {
            Some(config)
        },
    }
}

/// Extracts the answer text of the first candidate.
///
/// Thought parts are skipped. A blocked prompt, a blocked candidate or an
/// empty candidate list is an error.
pub fn from_gemini_response(resp: GeminiResponse) -> Result<String> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::Blocked(format!("prompt blocked ({})", reason)));
    }
    let candidate = resp.candidates.into_iter().next().ok_or(Error::NoCandidates)?;
    if let Some(reason) = candidate
        .finish_reason
        .as_deref()
        .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
    {
        return Err(Error::Blocked(format!("candidate blocked ({})", reason)));
    }
    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| part.thought != Some(true))
        .filter_map(|part| part.text)
        .collect();
    if text.is_empty() {
        return Err(Error::NoCandidates);
    }
    Ok(text)
}

/// Builds the error for a non-2xx response, preferring the message from the
/// API's error envelope.
pub fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{}: {}", envelope.error.status, envelope.error.message)
            }
        })
        .unwrap_or_else(|_| body.trim().to_string());
    Error::Api { status, message }
}
