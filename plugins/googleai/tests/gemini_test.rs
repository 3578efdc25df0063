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

//! # Gemini conversions and error classification

use ahara_ai::{GenerateRequest, GenerationConfig, Generator, OutputMode};
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::FailureKind;
use ahara_googleai::model::helpers::{
    api_error, from_gemini_response, to_gemini_request, to_gemini_schema,
};
use ahara_googleai::model::types::GeminiResponse;
use ahara_googleai::{Error, GeminiGenerator, GoogleAIPluginOptions};
use rstest::rstest;
use serde_json::{json, Value};
use std::time::Duration;

fn text_request(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        prompt: prompt.to_string(),
        mode: OutputMode::Text,
        output_schema: None,
        config: GenerationConfig::default(),
    }
}

#[cfg(test)]
/// toGeminiRequest
mod to_gemini_request_tests {
    use super::*;

    #[rstest]
    #[case(
        "should send the prompt as a single user turn",
        text_request("What foods balance Pitta?"),
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": "What foods balance Pitta?" }]
            }]
        })
    )]
    #[case(
        "should map sampling config",
        GenerateRequest {
            config: GenerationConfig {
                model: Some("gemini-2.0-flash".to_string()),
                temperature: Some(0.5),
                max_output_tokens: Some(512),
                stop_sequences: Some(vec!["END".to_string()]),
                ..Default::default()
            },
            ..text_request("hi")
        },
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }],
            "generationConfig": {
                "temperature": 0.5,
                "maxOutputTokens": 512,
                "stopSequences": ["END"]
            }
        })
    )]
    fn test_to_gemini_request(
        #[case] should: &str,
        #[case] input: GenerateRequest,
        #[case] expected: Value,
    ) {
        let actual = serde_json::to_value(to_gemini_request(&input)).unwrap();
        assert_eq!(actual, expected, "{}", should);
    }

    #[rstest]
    fn test_json_mode_sets_response_schema() {
        let schema = SchemaNode::object([
            Field::required("nutritionalAnalysis", SchemaNode::string().describe("Nutrition")),
            Field::required("ayurvedicAnalysis", SchemaNode::string().min_length(1)),
        ])
        .unwrap();
        let request = GenerateRequest {
            mode: OutputMode::Json,
            output_schema: Some(schema.to_json_schema()),
            ..text_request("analyze")
        };

        let body = serde_json::to_value(to_gemini_request(&request)).unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            config["responseSchema"]["properties"]["nutritionalAnalysis"],
            json!({ "type": "STRING", "description": "Nutrition" })
        );
        assert_eq!(
            config["responseSchema"]["required"],
            json!(["nutritionalAnalysis", "ayurvedicAnalysis"])
        );
        assert!(config["responseSchema"].get("additionalProperties").is_none());
    }
}

#[cfg(test)]
/// toGeminiSchema
mod to_gemini_schema_tests {
    use super::*;

    #[rstest]
    #[case(json!({ "type": "string", "minLength": 3 }), json!({ "type": "STRING" }))]
    #[case(
        json!({ "type": "array", "maxItems": 5, "items": { "type": "integer" } }),
        json!({ "type": "ARRAY", "maxItems": 5, "items": { "type": "INTEGER" } })
    )]
    #[case(
        json!({
            "type": "object",
            "properties": { "b": { "type": "boolean" }, "a": { "type": "number" } },
            "required": ["b"],
            "additionalProperties": false
        }),
        json!({
            "type": "OBJECT",
            "properties": { "b": { "type": "BOOLEAN" }, "a": { "type": "NUMBER" } },
            "propertyOrdering": ["b", "a"],
            "required": ["b"]
        })
    )]
    fn test_to_gemini_schema(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(to_gemini_schema(&input), expected);
    }
}

#[cfg(test)]
/// fromGeminiResponse
mod from_gemini_response_tests {
    use super::*;

    fn response(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case(
        "should join text parts",
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Favor cooling, " }, { "text": "sweet foods." }] },
                "finishReason": "STOP"
            }]
        }),
        "Favor cooling, sweet foods."
    )]
    #[case(
        "should skip thought parts",
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "thinking...", "thought": true }, { "text": "answer" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4 }
        }),
        "answer"
    )]
    fn test_from_gemini_response(#[case] should: &str, #[case] input: Value, #[case] expected: &str) {
        assert_eq!(from_gemini_response(response(input)).unwrap(), expected, "{}", should);
    }

    #[rstest]
    #[case::no_candidates(json!({ "candidates": [] }))]
    #[case::prompt_blocked(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))]
    #[case::candidate_blocked(json!({ "candidates": [{ "finishReason": "SAFETY" }] }))]
    fn test_unusable_responses_are_schema_mismatch(#[case] input: Value) {
        let err: ahara_core::Error = from_gemini_response(response(input)).unwrap_err().into();
        assert_eq!(err.kind(), FailureKind::SchemaMismatch);
    }
}

#[cfg(test)]
/// error classification
mod error_tests {
    use super::*;

    #[rstest]
    #[case(429, FailureKind::ServiceUnavailable)]
    #[case(500, FailureKind::ServiceUnavailable)]
    #[case(503, FailureKind::ServiceUnavailable)]
    #[case(400, FailureKind::Internal)]
    #[case(403, FailureKind::Internal)]
    fn test_api_status_classification(#[case] status: u16, #[case] expected: FailureKind) {
        let err: ahara_core::Error = api_error(status, "{}").into();
        assert_eq!(err.kind(), expected);
    }

    #[rstest]
    fn test_api_error_prefers_envelope_message() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        match api_error(503, body) {
            Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "UNAVAILABLE: The model is overloaded.");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[rstest]
    fn test_timeout_maps_to_timeout() {
        let err: ahara_core::Error = Error::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err.kind(), FailureKind::Timeout);
    }

    #[rstest]
    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let generator = GeminiGenerator::new(
            GoogleAIPluginOptions::new("key")
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();

        let err = generator.generate(text_request("hi")).await.unwrap_err();

        assert!(matches!(
            err.kind(),
            FailureKind::ServiceUnavailable | FailureKind::Timeout
        ));
        assert!(err.user_message().contains("temporarily unavailable"));
    }
}
