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

//! # Ahara Google AI Plugin
//!
//! A [`Generator`](ahara_ai::Generator) backed by the Gemini
//! `generateContent` endpoint of the Google AI REST API.

pub mod common;
pub mod model;

pub use self::common::GoogleAIPluginOptions;
pub use self::model::gemini::{GeminiGenerator, DEFAULT_MODEL};

use ahara_ai::Generator;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ahara core error: {0}")]
    AharaCore(#[from] ahara_core::Error),
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Response was blocked: {0}")]
    Blocked(String),
    #[error("Response contained no candidates")]
    NoCandidates,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the upstream service failed in a way that may pass.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Request(_) => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<Error> for ahara_core::Error {
    fn from(e: Error) -> Self {
        let message = e.to_string();
        match e {
            Error::AharaCore(inner) => inner,
            Error::Timeout(after) => ahara_core::Error::Timeout(after),
            Error::Request(source) => ahara_core::Error::ServiceUnavailable {
                message,
                source: Some(Box::new(source)),
            },
            e @ Error::Api { .. } if e.is_transient() => ahara_core::Error::new_unavailable(message),
            Error::Blocked(_) | Error::NoCandidates => {
                ahara_core::Error::new_schema_mismatch(message, "")
            }
            Error::Api { .. } | Error::Json(_) => ahara_core::Error::new_internal(message),
        }
    }
}

/// Creates a Gemini generator from `options`.
pub fn google_ai(options: GoogleAIPluginOptions) -> ahara_core::Result<Arc<dyn Generator>> {
    Ok(Arc::new(GeminiGenerator::new(options)?))
}
