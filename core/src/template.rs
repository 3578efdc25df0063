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

//! # Prompt Templates
//!
//! Prompt templates are plain text with field placeholders. Both `{{field}}`
//! and `{{{field}}}` substitute the named input field verbatim; nothing is
//! HTML-escaped. Helpers, blocks, partials, dotted paths and escaped
//! `\{{field}}` placeholders are rejected when the template is parsed, so a
//! template can only ever do substitution.
//!
//! Rendering is delegated to `handlebars` running in strict mode.

use crate::schema::SchemaNode;
use handlebars::Handlebars;
use serde_json::{Map, Value};
use thiserror::Error;

const TEMPLATE_NAME: &str = "prompt";
const RESERVED_NAMES: &[&str] = &["else", "this"];

/// Errors raised while parsing or rendering a prompt template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// One or more placeholders name a field that is not available.
    #[error("template references undeclared field(s): {}", .0.join(", "))]
    MissingField(Vec<String>),
    /// A placeholder uses something other than plain field substitution.
    #[error("unsupported template construct `{{{{{0}}}}}`; only field substitution is allowed")]
    UnsupportedConstruct(String),
    /// A placeholder was opened but never closed.
    #[error("malformed template: unterminated placeholder at byte {0}")]
    Malformed(usize),
    /// The rendering engine rejected the template or the input.
    #[error("failed to render template: {0}")]
    Render(String),
}

/// A single placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    /// Written with triple braces.
    pub triple: bool,
}

/// A parsed prompt template, ready to render.
#[derive(Clone)]
pub struct PromptTemplate {
    source: String,
    placeholders: Vec<Placeholder>,
    engine: Handlebars<'static>,
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("source", &self.source)
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !RESERVED_NAMES.contains(&name)
}

fn scan_placeholders(source: &str) -> Result<Vec<Placeholder>, TemplateError> {
    let mut placeholders = Vec::new();
    let mut offset = 0;
    while let Some(found) = source[offset..].find("{{") {
        let start = offset + found;
        let rest = &source[start..];
        // `\{{x}}` renders as literal braces.
        if source[..start].ends_with('\\') {
            return Err(TemplateError::UnsupportedConstruct(
                std::iter::once('\\').chain(rest.chars().take(16)).collect(),
            ));
        }
        if rest.starts_with("{{{{") {
            return Err(TemplateError::UnsupportedConstruct(
                rest.chars().take(16).collect(),
            ));
        }
        let triple = rest.starts_with("{{{");
        let (open, close) = if triple { (3, "}}}") } else { (2, "}}") };
        let body_start = start + open;
        let body_len = source[body_start..]
            .find(close)
            .ok_or(TemplateError::Malformed(start))?;
        let body = &source[body_start..body_start + body_len];
        let name = body.trim();
        if !is_plain_identifier(name) {
            return Err(TemplateError::UnsupportedConstruct(name.to_string()));
        }
        if !placeholders.iter().any(|p: &Placeholder| p.name == name && p.triple == triple) {
            placeholders.push(Placeholder {
                name: name.to_string(),
                triple,
            });
        }
        offset = body_start + body_len + close.len();
    }
    Ok(placeholders)
}

impl PromptTemplate {
    /// Parses `source`, rejecting anything other than field placeholders.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let placeholders = scan_placeholders(&source)?;

        let mut engine = Handlebars::new();
        engine.set_strict_mode(true);
        engine.register_escape_fn(handlebars::no_escape);
        engine
            .register_template_string(TEMPLATE_NAME, &source)
            .map_err(|e| TemplateError::Render(e.to_string()))?;

        Ok(Self {
            source,
            placeholders,
            engine,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// The distinct field names the template refers to, in order of first use.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for p in &self.placeholders {
            if !names.contains(&p.name.as_str()) {
                names.push(&p.name);
            }
        }
        names
    }

    /// Checks that every placeholder names a field declared in `schema`.
    pub fn check_against(&self, schema: &SchemaNode) -> Result<(), TemplateError> {
        let missing: Vec<String> = self
            .field_names()
            .into_iter()
            .filter(|name| schema.field(name).is_none())
            .map(String::from)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TemplateError::MissingField(missing))
        }
    }

    /// Substitutes the fields of `input` into the template.
    ///
    /// String values are inserted as-is; other values are inserted as their
    /// JSON text.
    pub fn render(&self, input: &Value) -> Result<String, TemplateError> {
        let mut context = Map::new();
        let mut missing = Vec::new();
        for name in self.field_names() {
            match input.get(name) {
                Some(Value::String(s)) => {
                    context.insert(name.to_string(), Value::String(s.clone()));
                }
                Some(other) => {
                    context.insert(name.to_string(), Value::String(other.to_string()));
                }
                None => missing.push(name.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(TemplateError::MissingField(missing));
        }
        self.engine
            .render(TEMPLATE_NAME, &Value::Object(context))
            .map_err(|e| TemplateError::Render(e.to_string()))
    }
}

/// Renders `template` with `input`. Pure: identical arguments always give
/// identical output.
pub fn render(template: &PromptTemplate, input: &Value) -> Result<String, TemplateError> {
    template.render(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_both_placeholder_forms() {
        let template = PromptTemplate::parse("A {{{a}}} and {{ b }} and {{a}} again").unwrap();
        assert_eq!(template.field_names(), vec!["a", "b"]);
        assert_eq!(template.placeholders().len(), 3);
    }

    #[test]
    fn test_rejects_block_helpers() {
        let err = PromptTemplate::parse("{{#if vip}}hi{{/if}}").unwrap_err();
        assert_eq!(err, TemplateError::UnsupportedConstruct("#if vip".to_string()));
    }

    #[test]
    fn test_rejects_escaped_placeholder() {
        let err = PromptTemplate::parse(r"Question: \{{question}}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnsupportedConstruct(r"\{{question}}".to_string())
        );
        assert!(PromptTemplate::parse(r"a \ b {{question}}").is_ok());
    }

    #[test]
    fn test_rejects_unterminated_placeholder() {
        let err = PromptTemplate::parse("Hello {{name").unwrap_err();
        assert_eq!(err, TemplateError::Malformed(6));
    }

    #[test]
    fn test_non_string_values_render_as_json() {
        let template = PromptTemplate::parse("age={{age}} tags={{{tags}}}").unwrap();
        let out = template
            .render(&json!({ "age": 42, "tags": ["vata", "pitta"] }))
            .unwrap();
        assert_eq!(out, r#"age=42 tags=["vata","pitta"]"#);
    }
}
