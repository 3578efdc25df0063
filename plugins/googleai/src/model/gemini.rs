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

//! # Gemini Generator
//!
//! Posts each request to `{base_url}/v1beta/models/{model}:generateContent`
//! with the API key in the `x-goog-api-key` header.

use super::helpers::{api_error, from_gemini_response, to_gemini_request};
use super::types::GeminiResponse;
use crate::{Error, GoogleAIPluginOptions, Result};
use ahara_ai::{GenerateRequest, Generator};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

/// The model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";
const MODEL_PREFIX: &str = "googleai/";

/// A `Generator` that calls the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GeminiGenerator {
    pub fn new(options: GoogleAIPluginOptions) -> Result<Self> {
        let mut api_key = HeaderValue::from_str(&options.api_key).map_err(|_| {
            Error::AharaCore(ahara_core::Error::new_internal(
                "API key contains characters not allowed in a header",
            ))
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            timeout: options.timeout,
        })
    }

    /// The endpoint for `model`, which may carry a `googleai/` prefix.
    pub fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix(MODEL_PREFIX).unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn run(&self, req: GenerateRequest) -> Result<String> {
        let model = req.config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let url = self.endpoint(model);
        let body = to_gemini_request(&req);
        log::debug!("Gemini request to {} ({:?} mode)", url, req.mode);
        log::trace!(
            "Gemini request body: {}",
            serde_json::to_string(&body).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            log::error!("Gemini API error: {} - {}", status, response_text);
            return Err(api_error(status.as_u16(), &response_text));
        }
        log::trace!("Gemini raw response: {}", response_text);
        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            log::error!(
                "Failed to decode Gemini response body: {}. Body: {}",
                e,
                response_text
            );
            Error::Json(e)
        })?;
        if let Some(usage) = &parsed.usage_metadata {
            log::debug!(
                "Gemini usage: {} prompt + {} candidate tokens",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }
        from_gemini_response(parsed)
    }

    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Request(e)
        }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "googleai/gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> ahara_core::Result<String> {
        self.run(request).await.map_err(Into::into)
    }
}
