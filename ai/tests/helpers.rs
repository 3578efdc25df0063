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

//! # Common Test Helpers
//!
//! A programmable generator whose behaviour tests swap at runtime, plus the
//! small question/answer flow most tests exercise.

#![allow(dead_code)]

use ahara_ai::{define_flow, Flow, GenerateRequest, Generator, Invoker};
use ahara_core::error::Result;
use ahara_core::schema::{Field, SchemaNode};
use ahara_core::{FlowDefinition, Registry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

////////////////////////////////////////////////////////////////////////////
// Programmable Generator                                                 //
////////////////////////////////////////////////////////////////////////////

pub type BoxedReply = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// The swappable handler inside a [`ProgrammableGenerator`].
pub type GeneratorHandler = Arc<dyn Fn(GenerateRequest) -> BoxedReply + Send + Sync>;

/// A generator that records every request and answers with a handler the
/// test controls.
#[derive(Clone)]
pub struct ProgrammableGenerator {
    pub requests: Arc<Mutex<Vec<GenerateRequest>>>,
    handler: Arc<Mutex<GeneratorHandler>>,
}

impl ProgrammableGenerator {
    pub fn new() -> Self {
        Self::responding("")
    }

    /// A generator that always answers `text`.
    pub fn responding(text: &str) -> Self {
        let text = text.to_string();
        let handler: GeneratorHandler = Arc::new(move |_req: GenerateRequest| -> BoxedReply {
            let text = text.clone();
            Box::pin(async move { Ok(text) })
        });
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            handler: Arc::new(Mutex::new(handler)),
        }
    }

    pub fn set_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(GenerateRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        *self.handler.lock().unwrap() =
            Arc::new(move |req: GenerateRequest| -> BoxedReply { Box::pin(handler(req)) });
    }

    /// Makes every call hang forever.
    pub fn never_respond(&self) {
        self.set_handler(|_req| std::future::pending::<Result<String>>());
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn invoker(&self) -> Invoker {
        Invoker::new(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Generator for ProgrammableGenerator {
    fn name(&self) -> &str {
        "programmableGenerator"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let handler = self.handler.lock().unwrap().clone();
        handler(request).await
    }
}

////////////////////////////////////////////////////////////////////////////
// Sample flow                                                            //
////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInput {
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutput {
    pub answer: String,
}

pub fn question_definition(name: &str) -> FlowDefinition {
    FlowDefinition::builder(name)
        .with_description("Answers a wellness question")
        .input_schema(
            SchemaNode::object([Field::required(
                "question",
                SchemaNode::string().describe("The user's question"),
            )])
            .unwrap(),
        )
        .output_schema(
            SchemaNode::object([Field::required(
                "answer",
                SchemaNode::string().describe("The answer"),
            )])
            .unwrap(),
        )
        .prompt("Answer this question about diet and wellness: {{{question}}}")
        .build()
        .unwrap()
}

pub fn question_flow(
    registry: &Registry,
    generator: &ProgrammableGenerator,
) -> Flow<QuestionInput, AnswerOutput> {
    define_flow(registry, question_definition("answerQuestion"), generator.invoker()).unwrap()
}
