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

//! # Schema Definition and Validation
//!
//! This module provides the shape contract shared by every flow: a recursive
//! [`SchemaNode`] describing what a caller must supply and what the generator
//! must return, a strict validator that reports every violation in one pass,
//! and a renderer that turns a node into a JSON Schema document used to steer
//! the generator.
//!
//! Schemas are built either with the builder methods on [`SchemaNode`] or from
//! a declarative [`ShapeSpec`] (which can be deserialized from JSON) through
//! [`define_schema`]. Both paths reject duplicate sibling field names and
//! empty descriptions.

use schemars::Schema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

/// The primitive JSON type a schema node accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// Any JSON value.
    Any,
}

impl SchemaType {
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Any => "any",
        }
    }
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content formats a string field can be required to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringFormat {
    /// The string must parse as a JSON array.
    JsonArray,
}

/// The shape-specific part of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SchemaKind {
    String {
        #[serde(skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
    },
    Number,
    Integer {
        #[serde(skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
    },
    Boolean,
    Array {
        items: Box<SchemaNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    Object {
        fields: Vec<Field>,
    },
    Any,
}

/// A recursive descriptor of a value's shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(flatten)]
    kind: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// A named member of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub schema: SchemaNode,
    pub required: bool,
}

impl Field {
    pub fn required(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
            required: false,
        }
    }
}

impl SchemaNode {
    fn leaf(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::leaf(SchemaKind::String {
            min_length: None,
            format: None,
        })
    }

    pub fn number() -> Self {
        Self::leaf(SchemaKind::Number)
    }

    /// An integral number that fits in an `i64` or `u64`. Floats such as
    /// `34.0` are rejected.
    pub fn integer() -> Self {
        Self::leaf(SchemaKind::Integer { minimum: None })
    }

    pub fn boolean() -> Self {
        Self::leaf(SchemaKind::Boolean)
    }

    /// Accepts any JSON value.
    pub fn any() -> Self {
        Self::leaf(SchemaKind::Any)
    }

    pub fn array(items: SchemaNode) -> Self {
        Self::leaf(SchemaKind::Array {
            items: Box::new(items),
            max_items: None,
        })
    }

    /// Builds an object schema, checking the whole subtree for duplicate
    /// sibling names and empty descriptions.
    pub fn object(
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self, SchemaDefinitionError> {
        let node = Self::leaf(SchemaKind::Object {
            fields: fields.into_iter().collect(),
        });
        node.check_definition()?;
        Ok(node)
    }

    /// Attaches a human-readable description, which is also sent to the
    /// generator as a hint.
    ///
    /// A blank description is rejected by [`SchemaNode::check_definition`],
    /// which every object builder and flow definition runs.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Requires an integer to be at least `min`. No effect on non-integer
    /// nodes.
    pub fn minimum(mut self, min: i64) -> Self {
        if let SchemaKind::Integer { minimum } = &mut self.kind {
            *minimum = Some(min);
        }
        self
    }

    /// Requires a string to contain at least `min` characters. No effect on
    /// non-string nodes.
    pub fn min_length(mut self, min: usize) -> Self {
        if let SchemaKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(min);
        }
        self
    }

    /// Requires a string to hold content in the given format. No effect on
    /// non-string nodes.
    pub fn format(mut self, string_format: StringFormat) -> Self {
        if let SchemaKind::String { format, .. } = &mut self.kind {
            *format = Some(string_format);
        }
        self
    }

    /// Caps the number of items in an array. No effect on non-array nodes.
    pub fn max_items(mut self, max: usize) -> Self {
        if let SchemaKind::Array { max_items, .. } = &mut self.kind {
            *max_items = Some(max);
        }
        self
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn schema_type(&self) -> SchemaType {
        match self.kind {
            SchemaKind::String { .. } => SchemaType::String,
            SchemaKind::Number => SchemaType::Number,
            SchemaKind::Integer { .. } => SchemaType::Integer,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::Array { .. } => SchemaType::Array,
            SchemaKind::Object { .. } => SchemaType::Object,
            SchemaKind::Any => SchemaType::Any,
        }
    }

    /// The fields of an object node; empty for every other kind.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            SchemaKind::Object { fields } => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Returns the field name when this node is an object whose only field
    /// is a string. Such outputs are generated as plain text.
    pub fn single_string_field(&self) -> Option<&str> {
        match self.fields() {
            [only] if only.schema.schema_type() == SchemaType::String => Some(&only.name),
            _ => None,
        }
    }

    /// Returns the field name when this node is an object whose only field
    /// is an array.
    pub fn single_array_field(&self) -> Option<&str> {
        match self.fields() {
            [only] if only.schema.schema_type() == SchemaType::Array => Some(&only.name),
            _ => None,
        }
    }

    /// Checks the whole subtree for duplicate sibling names and blank
    /// descriptions.
    pub fn check_definition(&self) -> Result<(), SchemaDefinitionError> {
        let mut problems = Vec::new();
        collect_definition_problems(self, "", &mut problems);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(SchemaDefinitionError { problems })
        }
    }

    /// Renders the node as a JSON Schema document.
    pub fn to_json_schema(&self) -> Schema {
        match self.to_json_schema_value() {
            Value::Object(map) => Schema::from(map),
            _ => Schema::default(),
        }
    }

    fn to_json_schema_value(&self) -> Value {
        let mut out = Map::new();
        if !matches!(self.kind, SchemaKind::Any) {
            out.insert("type".into(), Value::from(self.schema_type().as_str()));
        }
        if let Some(description) = &self.description {
            out.insert("description".into(), Value::from(description.as_str()));
        }
        match &self.kind {
            SchemaKind::String { min_length, .. } => {
                if let Some(min) = min_length {
                    out.insert("minLength".into(), Value::from(*min));
                }
            }
            SchemaKind::Array { items, max_items } => {
                out.insert("items".into(), items.to_json_schema_value());
                if let Some(max) = max_items {
                    out.insert("maxItems".into(), Value::from(*max));
                }
            }
            SchemaKind::Object { fields } => {
                let properties: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.name.clone(), f.schema.to_json_schema_value()))
                    .collect();
                let required: Vec<Value> = fields
                    .iter()
                    .filter(|f| f.required)
                    .map(|f| Value::from(f.name.as_str()))
                    .collect();
                out.insert("properties".into(), Value::Object(properties));
                out.insert("required".into(), Value::Array(required));
                out.insert("additionalProperties".into(), Value::Bool(false));
            }
            SchemaKind::Integer { minimum } => {
                if let Some(min) = minimum {
                    out.insert("minimum".into(), Value::from(*min));
                }
            }
            SchemaKind::Number | SchemaKind::Boolean | SchemaKind::Any => {}
        }
        Value::Object(out)
    }
}

fn collect_definition_problems(
    node: &SchemaNode,
    path: &str,
    problems: &mut Vec<DefinitionProblem>,
) {
    if let Some(description) = &node.description {
        if description.trim().is_empty() {
            problems.push(DefinitionProblem {
                path: path.to_string(),
                message: "description is empty".to_string(),
            });
        }
    }
    match &node.kind {
        SchemaKind::Array { items, .. } => {
            collect_definition_problems(items, &format!("{}/items", path), problems);
        }
        SchemaKind::Object { fields } => {
            for (i, field) in fields.iter().enumerate() {
                let field_path = format!("{}/{}", path, field.name);
                if fields[..i].iter().any(|prev| prev.name == field.name) {
                    problems.push(DefinitionProblem {
                        path: field_path.clone(),
                        message: format!("duplicate field name `{}`", field.name),
                    });
                }
                collect_definition_problems(&field.schema, &field_path, problems);
            }
        }
        _ => {}
    }
}

//
// Declarative shapes
//

/// A declarative, serde-friendly description of a schema.
///
/// ```
/// use ahara_core::schema::{define_schema, ShapeSpec};
///
/// let shape: ShapeSpec = serde_json::from_value(serde_json::json!({
///     "type": "object",
///     "fields": [
///         { "name": "question", "schema": { "type": "string", "minLength": 1 } }
///     ]
/// }))
/// .unwrap();
/// let schema = define_schema(shape).unwrap();
/// assert_eq!(schema.single_string_field(), Some("question"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ShapeSpec {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<i64>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        items: Box<ShapeSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<usize>,
    },
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        fields: Vec<FieldSpec>,
    },
    Any {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

/// A named member of an object [`ShapeSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub schema: ShapeSpec,
    #[serde(default)]
    pub optional: bool,
}

impl From<ShapeSpec> for SchemaNode {
    fn from(shape: ShapeSpec) -> Self {
        let (kind, description) = match shape {
            ShapeSpec::String {
                description,
                min_length,
                format,
            } => (SchemaKind::String { min_length, format }, description),
            ShapeSpec::Number { description } => (SchemaKind::Number, description),
            ShapeSpec::Integer {
                description,
                minimum,
            } => (SchemaKind::Integer { minimum }, description),
            ShapeSpec::Boolean { description } => (SchemaKind::Boolean, description),
            ShapeSpec::Array {
                description,
                items,
                max_items,
            } => (
                SchemaKind::Array {
                    items: Box::new(SchemaNode::from(*items)),
                    max_items,
                },
                description,
            ),
            ShapeSpec::Object {
                description,
                fields,
            } => (
                SchemaKind::Object {
                    fields: fields
                        .into_iter()
                        .map(|f| Field {
                            name: f.name,
                            schema: SchemaNode::from(f.schema),
                            required: !f.optional,
                        })
                        .collect(),
                },
                description,
            ),
            ShapeSpec::Any { description } => (SchemaKind::Any, description),
        };
        SchemaNode { kind, description }
    }
}

/// Builds a [`SchemaNode`] from a nested shape specification.
///
/// Fails if two sibling fields share a name or a described node carries an
/// empty description. Every problem in the tree is reported.
pub fn define_schema(shape: ShapeSpec) -> Result<SchemaNode, SchemaDefinitionError> {
    let node = SchemaNode::from(shape);
    node.check_definition()?;
    Ok(node)
}

/// A single problem found while defining a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionProblem {
    pub path: String,
    pub message: String,
}

/// A schema definition was rejected.
#[derive(ThisError, Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDefinitionError {
    problems: Vec<DefinitionProblem>,
}

impl SchemaDefinitionError {
    pub fn problems(&self) -> &[DefinitionProblem] {
        &self.problems
    }
}

impl Display for SchemaDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid schema definition:")?;
        for p in &self.problems {
            write!(f, "\n- path: `{}`, {}", p.path, p.message)?;
        }
        Ok(())
    }
}

//
// Validation
//

/// The constraint a value failed to satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "constraint", content = "value", rename_all = "camelCase")]
pub enum Constraint {
    Required,
    Type(SchemaType),
    MinLength(usize),
    Minimum(i64),
    MaxItems(usize),
    Format(StringFormat),
    NoUnknownFields,
    /// The value satisfied the schema but not the target type.
    Decodable(String),
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "required"),
            Constraint::Type(t) => write!(f, "type {}", t),
            Constraint::MinLength(n) => write!(f, "at least {} characters", n),
            Constraint::Minimum(n) => write!(f, "at least {}", n),
            Constraint::MaxItems(n) => write!(f, "at most {} items", n),
            Constraint::Format(StringFormat::JsonArray) => write!(f, "a JSON array"),
            Constraint::NoUnknownFields => write!(f, "no undeclared fields"),
            Constraint::Decodable(reason) => write!(f, "a decodable value ({})", reason),
        }
    }
}

/// Contains details for a single schema validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrorDetail {
    /// The JSON pointer path to the offending value.
    pub path: String,
    /// What the schema expected at that path.
    pub expected: Constraint,
    /// The value found there; `None` when the field is missing.
    pub actual: Option<Value>,
}

impl Display for ValidationErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        match &self.actual {
            Some(actual) => write!(
                f,
                "path: `{}`, expected: {}, actual: `{}`",
                path, self.expected, actual
            ),
            None => write!(f, "path: `{}`, expected: {}, actual: missing", path, self.expected),
        }
    }
}

/// An error that occurs during schema validation.
///
/// Contains every violation found in the value, plus the value itself.
#[derive(ThisError, Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    errors: Vec<ValidationErrorDetail>,
    data: Value,
}

impl ValidationError {
    pub fn new(errors: Vec<ValidationErrorDetail>, data: Value) -> Self {
        Self { errors, data }
    }

    /// Wraps a deserialization failure of `data` that passed validation.
    pub fn undecodable(error: &serde_json::Error, data: Value) -> Self {
        let detail = ValidationErrorDetail {
            path: String::new(),
            expected: Constraint::Decodable(error.to_string()),
            actual: Some(data.clone()),
        };
        Self::new(vec![detail], data)
    }

    /// Returns a slice of the detailed validation errors.
    pub fn errors(&self) -> &[ValidationErrorDetail] {
        &self.errors
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// The distinct field paths that failed, in order of discovery.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for e in &self.errors {
            if !paths.contains(&e.path.as_str()) {
                paths.push(&e.path);
            }
        }
        paths
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error_list: String = self
            .errors
            .iter()
            .map(|e| format!("- {}", e))
            .collect::<Vec<_>>()
            .join("\n");
        write!(
            f,
            "Schema validation failed. Parse Errors:\n\n{}\n\nProvided data:\n\n{}",
            error_list,
            serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| "Invalid JSON data".to_string()),
        )
    }
}

/// Validates `value` against `schema`.
///
/// Checks presence, type, string length and format, integer minimum, array
/// size, and rejects fields the schema does not declare. All violations are collected before
/// returning. On success the validated value is returned unchanged.
pub fn validate(schema: &SchemaNode, value: &Value) -> Result<Value, ValidationError> {
    let mut errors = Vec::new();
    check_value(schema, value, "", &mut errors);
    if errors.is_empty() {
        Ok(value.clone())
    } else {
        Err(ValidationError::new(errors, value.clone()))
    }
}

fn type_error(path: &str, expected: SchemaType, actual: &Value) -> ValidationErrorDetail {
    ValidationErrorDetail {
        path: path.to_string(),
        expected: Constraint::Type(expected),
        actual: Some(actual.clone()),
    }
}


fn check_value(
    schema: &SchemaNode,
    value: &Value,
    path: &str,
    errors: &mut Vec<ValidationErrorDetail>,
) {
    match (&schema.kind, value) {
        (SchemaKind::String { min_length, format }, Value::String(s)) => {
            if let Some(min) = min_length {
                if s.chars().count() < *min {
                    errors.push(ValidationErrorDetail {
                        path: path.to_string(),
                        expected: Constraint::MinLength(*min),
                        actual: Some(value.clone()),
                    });
                }
            }
            if let Some(StringFormat::JsonArray) = format {
                if !matches!(serde_json::from_str::<Value>(s), Ok(Value::Array(_))) {
                    errors.push(ValidationErrorDetail {
                        path: path.to_string(),
                        expected: Constraint::Format(StringFormat::JsonArray),
                        actual: Some(value.clone()),
                    });
                }
            }
        }
        (SchemaKind::Number, Value::Number(_)) | (SchemaKind::Boolean, Value::Bool(_)) => {}
        (SchemaKind::Any, _) => {}
        (SchemaKind::Integer { minimum }, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            if let Some(min) = minimum {
                if n.as_i64().is_some_and(|i| i < *min) {
                    errors.push(ValidationErrorDetail {
                        path: path.to_string(),
                        expected: Constraint::Minimum(*min),
                        actual: Some(value.clone()),
                    });
                }
            }
        }
        (SchemaKind::Array { items, max_items }, Value::Array(elements)) => {
            if let Some(max) = max_items {
                if elements.len() > *max {
                    errors.push(ValidationErrorDetail {
                        path: path.to_string(),
                        expected: Constraint::MaxItems(*max),
                        actual: Some(Value::from(elements.len())),
                    });
                }
            }
            for (i, element) in elements.iter().enumerate() {
                check_value(items, element, &format!("{}/{}", path, i), errors);
            }
        }
        (SchemaKind::Object { fields }, Value::Object(map)) => {
            for field in fields {
                let field_path = format!("{}/{}", path, field.name);
                match map.get(&field.name) {
                    Some(v) => check_value(&field.schema, v, &field_path, errors),
                    None if field.required => errors.push(ValidationErrorDetail {
                        path: field_path,
                        expected: Constraint::Required,
                        actual: None,
                    }),
                    None => {}
                }
            }
            for (key, v) in map {
                if !fields.iter().any(|f| &f.name == key) {
                    errors.push(ValidationErrorDetail {
                        path: format!("{}/{}", path, key),
                        expected: Constraint::NoUnknownFields,
                        actual: Some(v.clone()),
                    });
                }
            }
        }
        (_, actual) => errors.push(type_error(path, schema.schema_type(), actual)),
    }
}
