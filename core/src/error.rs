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

//! # Error and Result types
//!
//! Every flow invocation settles with either its typed output or one of the
//! variants below; nothing escapes as an unstructured panic.

use crate::schema::{SchemaDefinitionError, ValidationError};
use crate::status::{Status, StatusCode};
use crate::template::TemplateError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// A convenient Result type, defaulting to the crate's `Error` type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The coarse failure taxonomy of a flow invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    Validation,
    SchemaDefinition,
    Template,
    ServiceUnavailable,
    Timeout,
    SchemaMismatch,
    Cancelled,
    NotFound,
    AlreadyExists,
    Internal,
}

/// The primary error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller supplied input that does not satisfy the input schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A schema was defined with duplicate fields or empty descriptions.
    #[error(transparent)]
    SchemaDefinition(#[from] SchemaDefinitionError),

    /// A prompt template is inconsistent with its input schema.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// The upstream generation service failed transiently.
    #[error("Generation service unavailable: {message}")]
    ServiceUnavailable {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// No response arrived within the bounded wait.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// The generator's response could not be coerced into the output schema.
    #[error("Generated output does not match the declared schema: {message}")]
    SchemaMismatch { message: String, raw: String },

    /// The caller cancelled the invocation.
    #[error("Invocation was cancelled")]
    Cancelled,

    /// No flow is registered under this name.
    #[error("Flow '{0}' is not registered")]
    NotFound(String),

    /// A flow with this name is already registered.
    #[error("Flow '{0}' is already registered")]
    AlreadyExists(String),

    /// A broken invariant inside the layer or its configuration.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Creates a new `Internal` error.
    pub fn new_internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `ServiceUnavailable` error.
    pub fn new_unavailable(message: impl Into<String>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new `SchemaMismatch` error, keeping the raw response for
    /// diagnostics.
    pub fn new_schema_mismatch(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Validation(_) => FailureKind::Validation,
            Error::SchemaDefinition(_) => FailureKind::SchemaDefinition,
            Error::Template(_) => FailureKind::Template,
            Error::ServiceUnavailable { .. } => FailureKind::ServiceUnavailable,
            Error::Timeout(_) => FailureKind::Timeout,
            Error::SchemaMismatch { .. } => FailureKind::SchemaMismatch,
            Error::Cancelled => FailureKind::Cancelled,
            Error::NotFound(_) => FailureKind::NotFound,
            Error::AlreadyExists(_) => FailureKind::AlreadyExists,
            Error::Internal { .. } => FailureKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::InvalidArgument,
            Error::ServiceUnavailable { .. } => StatusCode::Unavailable,
            Error::Timeout(_) => StatusCode::DeadlineExceeded,
            Error::SchemaMismatch { .. } => StatusCode::FailedPrecondition,
            Error::Cancelled => StatusCode::Cancelled,
            Error::NotFound(_) => StatusCode::NotFound,
            Error::AlreadyExists(_) => StatusCode::AlreadyExists,
            Error::SchemaDefinition(_) | Error::Template(_) | Error::Internal { .. } => {
                StatusCode::Internal
            }
        }
    }

    /// Returns the corresponding HTTP status code for the error.
    pub fn http_status(&self) -> u16 {
        self.status_code().to_http_status()
    }

    /// A short message that is safe to show to an end user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(ve) => {
                let fields: Vec<String> = ve
                    .paths()
                    .into_iter()
                    .map(|p| p.trim_start_matches('/').to_string())
                    .collect();
                format!(
                    "Some of the information provided is invalid ({}). Please check it and try again.",
                    fields.join(", ")
                )
            }
            Error::ServiceUnavailable { .. } | Error::Timeout(_) => {
                "The AI service is temporarily unavailable. Please try again in a few moments."
                    .to_string()
            }
            Error::Cancelled => "The request was cancelled.".to_string(),
            Error::NotFound(name) => format!("There is no AI feature called '{}'.", name),
            _ => "Sorry, something went wrong while generating a response. Please try again."
                .to_string(),
        }
    }

    /// Returns a `Status` suitable for serialization in API responses.
    ///
    /// Internal details are never included; validation failures carry their
    /// per-field violations.
    pub fn as_status(&self) -> Status {
        let details = match self {
            Error::Validation(ve) => Some(serde_json::json!({ "errors": ve.errors() })),
            _ => None,
        };
        Status {
            code: self.status_code(),
            message: self.user_message(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{validate, Field, SchemaNode};
    use serde_json::json;

    #[test]
    fn test_validation_status_lists_fields() {
        let schema = SchemaNode::object([Field::required("question", SchemaNode::string())]).unwrap();
        let err: Error = validate(&schema, &json!({})).unwrap_err().into();

        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.http_status(), 400);
        let status = err.as_status();
        assert!(status.message.contains("question"));
        assert_eq!(status.details.unwrap()["errors"][0]["path"], "/question");
    }

    #[test]
    fn test_transient_errors_share_user_message() {
        let unavailable = Error::new_unavailable("503 from upstream");
        let timeout = Error::Timeout(Duration::from_secs(1));
        assert_eq!(unavailable.user_message(), timeout.user_message());
        assert!(unavailable.user_message().contains("temporarily unavailable"));
        assert_eq!(timeout.status_code(), StatusCode::DeadlineExceeded);
    }

    #[test]
    fn test_unknown_flow_is_a_caller_error() {
        let err = Error::NotFound("noSuchFlow".to_string());
        assert_eq!(err.kind(), FailureKind::NotFound);
        assert_eq!(err.http_status(), 404);
        assert!(err.user_message().contains("noSuchFlow"));
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = Error::new_internal("api key missing from GEMINI_API_KEY");
        let status = err.as_status();
        assert_eq!(status.code, StatusCode::Internal);
        assert!(!status.message.contains("GEMINI_API_KEY"));
    }
}
