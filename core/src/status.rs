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

//! # Status Codes
//!
//! Canonical status codes attached to every flow failure, so that a UI or an
//! HTTP layer can map an [`Error`](crate::Error) to a response without
//! matching on the error itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use thiserror::Error;

/// Outcome classes of a flow invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Not an error.
    ///
    /// HTTP Mapping: 200 OK
    Ok,

    /// The caller cancelled the invocation.
    ///
    /// HTTP Mapping: 499 Client Closed Request
    Cancelled,

    /// The caller supplied input that does not match the flow's input schema.
    ///
    /// HTTP Mapping: 400 Bad Request
    InvalidArgument,

    /// No response arrived from the generator within the bounded wait.
    ///
    /// HTTP Mapping: 504 Gateway Timeout
    DeadlineExceeded,

    /// No flow is registered under the requested name.
    ///
    /// HTTP Mapping: 404 Not Found
    NotFound,

    /// A flow with the same name is already registered.
    ///
    /// HTTP Mapping: 409 Conflict
    AlreadyExists,

    /// The generator answered, but the answer could not be coerced into the
    /// declared output shape. Retrying may help; changing the input will not.
    ///
    /// HTTP Mapping: 502 Bad Gateway
    FailedPrecondition,

    /// A broken invariant inside the layer itself, such as a template that
    /// references an undeclared field.
    ///
    /// HTTP Mapping: 500 Internal Server Error
    Internal,

    /// The upstream generation service failed transiently.
    ///
    /// HTTP Mapping: 503 Service Unavailable
    Unavailable,
}

impl StatusCode {
    /// Returns the canonical upper-case name, e.g. `DEADLINE_EXCEEDED`.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
        }
    }

    /// Converts a `StatusCode` to its corresponding HTTP status code.
    pub fn to_http_status(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Cancelled => 499,
            StatusCode::InvalidArgument => 400,
            StatusCode::DeadlineExceeded => 504,
            StatusCode::NotFound => 404,
            StatusCode::AlreadyExists => 409,
            StatusCode::FailedPrecondition => 502,
            StatusCode::Internal => 500,
            StatusCode::Unavailable => 503,
        }
    }

    /// Whether a caller may reasonably try the same request again.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            StatusCode::Unavailable | StatusCode::DeadlineExceeded | StatusCode::FailedPrecondition
        )
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// An error returned when parsing a `StatusCode` from a string fails.
#[derive(Debug, Error)]
#[error("invalid status name: {0}")]
pub struct ParseStatusError(String);

impl FromStr for StatusCode {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(StatusCode::Ok),
            "CANCELLED" => Ok(StatusCode::Cancelled),
            "INVALID_ARGUMENT" => Ok(StatusCode::InvalidArgument),
            "DEADLINE_EXCEEDED" => Ok(StatusCode::DeadlineExceeded),
            "NOT_FOUND" => Ok(StatusCode::NotFound),
            "ALREADY_EXISTS" => Ok(StatusCode::AlreadyExists),
            "FAILED_PRECONDITION" => Ok(StatusCode::FailedPrecondition),
            "INTERNAL" => Ok(StatusCode::Internal),
            "UNAVAILABLE" => Ok(StatusCode::Unavailable),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        StatusCode::from_str(&name).map_err(serde::de::Error::custom)
    }
}

/// The serializable form of a failed invocation, as handed to a UI surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub code: StatusCode,
    /// A message that is safe to show to the end user.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}
