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

//! # Ahara Core
//!
//! The schema contract, prompt templates, flow definitions and error
//! taxonomy shared by every Ahara flow.

pub mod error;
pub mod flow;
pub mod logging;
pub mod registry;
pub mod schema;
pub mod status;
pub mod template;

// Re-export key components for easier access.
pub use error::{Error, FailureKind, Result};
pub use flow::{FlowDefinition, FlowDefinitionBuilder, FlowState};
pub use registry::Registry;
pub use schema::{define_schema, validate, Field, SchemaNode, ShapeSpec, ValidationError};
pub use status::{Status, StatusCode};
pub use template::{render, PromptTemplate, TemplateError};
