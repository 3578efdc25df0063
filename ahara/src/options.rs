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

//! Configuration for [`Ahara::init`](crate::Ahara::init).

use ahara_ai::{GenerationConfig, Generator, DEFAULT_TIMEOUT};
use ahara_core::{Error, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const MODEL_ENV: &str = "AHARA_MODEL";
pub const TIMEOUT_ENV: &str = "AHARA_TIMEOUT_SECS";

#[derive(Clone)]
pub struct AharaOptions {
    /// The generation backend. Required.
    pub generator: Option<Arc<dyn Generator>>,
    /// Defaults sent with every request.
    pub config: GenerationConfig,
    /// The bounded wait for a single generation call.
    pub timeout: Duration,
}

impl Default for AharaOptions {
    fn default() -> Self {
        Self {
            generator: None,
            config: GenerationConfig {
                model: Some(DEFAULT_MODEL.to_string()),
                ..Default::default()
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for AharaOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AharaOptions")
            .field("generator", &self.generator.as_ref().map(|g| g.name()))
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AharaOptions {
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Defaults, overridden by `AHARA_MODEL` and `AHARA_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.config.model = Some(model.trim().to_string());
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::new_internal(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, secs))
            })?;
            if secs == 0 {
                return Err(Error::new_internal(format!("{} must be greater than zero", TIMEOUT_ENV)));
            }
            self.timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }
}
