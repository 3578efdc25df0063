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

//! # Generation
//!
//! The [`Generator`] trait is the seam to the external text-generation
//! service. An [`Invoker`] wraps a generator with default configuration and
//! a bounded wait, picks the output mode from the output schema, and turns
//! the raw response into a JSON value shaped like that schema.

use crate::formats::{resolve_format, OutputMode};
use ahara_core::error::{Error, Result};
use ahara_core::schema::SchemaNode;
use async_trait::async_trait;
use schemars::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// The default bounded wait for a single generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling and model selection parameters sent with a request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

impl GenerationConfig {
    /// Returns a copy of `self` with every field set in `overrides` replaced.
    pub fn merge(&self, overrides: &GenerationConfig) -> GenerationConfig {
        GenerationConfig {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            temperature: overrides.temperature.or(self.temperature),
            max_output_tokens: overrides.max_output_tokens.or(self.max_output_tokens),
            top_k: overrides.top_k.or(self.top_k),
            top_p: overrides.top_p.or(self.top_p),
            stop_sequences: overrides
                .stop_sequences
                .clone()
                .or_else(|| self.stop_sequences.clone()),
        }
    }
}

/// A single request to a [`Generator`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: String,
    pub mode: OutputMode,
    /// The JSON Schema the response must satisfy; set in `Json` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Schema>,
    pub config: GenerationConfig,
}

/// An external text-generation service.
///
/// Implementations must be safe to call concurrently. Transient upstream
/// failures are reported as [`Error::ServiceUnavailable`].
#[async_trait]
pub trait Generator: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    /// Sends `request` and returns the raw response text.
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

/// Per-call options for [`Invoker::invoke`].
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Merged over the invoker's default configuration.
    pub config: Option<GenerationConfig>,
    /// Replaces the invoker's default timeout.
    pub timeout: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl InvokeOptions {
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Sends rendered prompts to a [`Generator`] and parses what comes back.
#[derive(Clone)]
pub struct Invoker {
    generator: Arc<dyn Generator>,
    config: GenerationConfig,
    timeout: Duration,
}

impl fmt::Debug for Invoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("generator", &self.generator.name())
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Invoker {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            config: GenerationConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generates a value for `output_schema` from `prompt`.
    ///
    /// The returned value has the shape the output schema asks for, but is
    /// not validated against it; that is the caller's job.
    pub async fn invoke(
        &self,
        prompt: &str,
        output_schema: &SchemaNode,
        options: &InvokeOptions,
    ) -> Result<Value> {
        let invocation_id = Uuid::new_v4();
        let format = resolve_format(output_schema);
        let prompt = match format.instructions() {
            Some(instructions) => format!("{}\n\n{}", prompt, instructions),
            None => prompt.to_string(),
        };
        let config = match &options.config {
            Some(overrides) => self.config.merge(overrides),
            None => self.config.clone(),
        };
        let request = GenerateRequest {
            prompt,
            mode: format.mode(),
            output_schema: match format.mode() {
                OutputMode::Json => Some(output_schema.to_json_schema()),
                OutputMode::Text => None,
            },
            config,
        };
        let timeout = options.timeout.unwrap_or(self.timeout);

        log::debug!(
            "[{}] sending {:?} request to '{}' (timeout {:?})",
            invocation_id,
            request.mode,
            self.generator.name(),
            timeout
        );
        log::trace!("[{}] prompt: {}", invocation_id, request.prompt);

        let started = Instant::now();
        let generation = tokio::time::timeout(timeout, self.generator.generate(request));
        let outcome = match &options.cancellation {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    log::debug!("[{}] cancelled after {:?}", invocation_id, started.elapsed());
                    return Err(Error::Cancelled);
                }
                outcome = generation => outcome,
            },
            None => generation.await,
        };
        let raw = match outcome {
            Ok(result) => result?,
            Err(_) => {
                log::warn!("[{}] no response within {:?}", invocation_id, timeout);
                return Err(Error::Timeout(timeout));
            }
        };

        log::debug!(
            "[{}] response received in {:?} ({} bytes)",
            invocation_id,
            started.elapsed(),
            raw.len()
        );
        log::trace!("[{}] raw response: {}", invocation_id, raw);
        format.parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_overrides() {
        let base = GenerationConfig {
            model: Some("gemini-2.0-flash".to_string()),
            temperature: Some(0.2),
            max_output_tokens: Some(1024),
            ..Default::default()
        };
        let overrides = GenerationConfig {
            temperature: Some(0.9),
            stop_sequences: Some(vec!["END".to_string()]),
            ..Default::default()
        };
        let merged = base.merge(&overrides);
        assert_eq!(merged.model.as_deref(), Some("gemini-2.0-flash"));
        assert_eq!(merged.temperature, Some(0.9));
        assert_eq!(merged.max_output_tokens, Some(1024));
        assert_eq!(merged.stop_sequences, Some(vec!["END".to_string()]));
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = GenerationConfig {
            max_output_tokens: Some(256),
            top_k: Some(40),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            serde_json::json!({ "maxOutputTokens": 256, "topK": 40 })
        );
    }
}
