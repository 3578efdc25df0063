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

//! # Flows
//!
//! A [`Flow`] is the single async entry point a caller uses for one AI
//! feature. Each invocation validates the input, renders the prompt, makes
//! exactly one generation call, validates what came back and hands the
//! caller a typed value. Flows keep no state between invocations.

use crate::generate::{InvokeOptions, Invoker};
use ahara_core::error::{Error, Result};
use ahara_core::flow::{FlowDefinition, FlowState};
use ahara_core::registry::Registry;
use ahara_core::schema::validate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A hook applied to a flow's validated output before it is returned.
pub type PostProcess<I, O> = Arc<dyn Fn(&I, O) -> O + Send + Sync>;

/// A registered, callable flow taking `I` and producing `O`.
pub struct Flow<I, O> {
    definition: Arc<FlowDefinition>,
    invoker: Invoker,
    post_process: Option<PostProcess<I, O>>,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O> Clone for Flow<I, O> {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            invoker: self.invoker.clone(),
            post_process: self.post_process.clone(),
            _marker: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Flow<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow")
            .field("name", &self.definition.name())
            .field("invoker", &self.invoker)
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

/// Registers `definition` in `registry` and returns a callable flow.
///
/// Fails with [`Error::AlreadyExists`] when the registry already holds a
/// flow with the same name.
pub fn define_flow<I, O>(
    registry: &Registry,
    definition: FlowDefinition,
    invoker: Invoker,
) -> Result<Flow<I, O>> {
    let definition = Arc::new(definition);
    registry.register_flow(definition.clone())?;
    log::debug!("defined flow '{}'", definition.name());
    Ok(Flow {
        definition,
        invoker,
        post_process: None,
        _marker: PhantomData,
    })
}

impl<I, O> Flow<I, O>
where
    I: Serialize + DeserializeOwned + Send + Sync,
    O: Serialize + DeserializeOwned + Send,
{
    /// Adds a hook that adjusts the validated output, for example to trim a
    /// list to a bound that depends on the input.
    pub fn with_post_process(mut self, hook: impl Fn(&I, O) -> O + Send + Sync + 'static) -> Self {
        self.post_process = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    /// Runs the flow with the invoker's default options.
    pub async fn invoke(&self, input: I) -> Result<O> {
        self.invoke_with(input, InvokeOptions::default()).await
    }

    /// Runs the flow with per-call options.
    pub async fn invoke_with(&self, input: I, options: InvokeOptions) -> Result<O> {
        let value = serde_json::to_value(&input)
            .map_err(|e| Error::new_internal(format!("failed to serialize flow input: {}", e)))?;
        let output = self.run(&value, &options).await?;
        Ok(self.finish(&input, output))
    }

    /// Runs the flow on an untyped JSON input and returns untyped JSON.
    pub async fn invoke_json(&self, input: Value, options: InvokeOptions) -> Result<Value> {
        let output = self.run(&input, &options).await?;
        let typed_input: I = serde_json::from_value(input)
            .map_err(|e| Error::new_internal(format!("failed to read flow input: {}", e)))?;
        serde_json::to_value(self.finish(&typed_input, output))
            .map_err(|e| Error::new_internal(format!("failed to serialize flow output: {}", e)))
    }

    fn finish(&self, input: &I, output: O) -> O {
        match &self.post_process {
            Some(hook) => hook(input, output),
            None => output,
        }
    }

    async fn run(&self, input: &Value, options: &InvokeOptions) -> Result<O> {
        let invocation_id = Uuid::new_v4();
        let started = Instant::now();
        let result = self.execute(&invocation_id, input, options).await;
        match &result {
            Ok(_) => {
                self.transition(&invocation_id, FlowState::Done);
                log::info!(
                    "[{}:{}] completed in {:?}",
                    self.name(),
                    invocation_id,
                    started.elapsed()
                );
            }
            Err(e) => {
                self.transition(&invocation_id, FlowState::Failed);
                match e {
                    Error::Validation(_) | Error::Cancelled => log::warn!(
                        "[{}:{}] {:?} after {:?}: {}",
                        self.name(),
                        invocation_id,
                        e.kind(),
                        started.elapsed(),
                        e
                    ),
                    _ => log::error!(
                        "[{}:{}] {:?} after {:?}: {}",
                        self.name(),
                        invocation_id,
                        e.kind(),
                        started.elapsed(),
                        e
                    ),
                }
            }
        }
        result
    }

    async fn execute(
        &self,
        invocation_id: &Uuid,
        input: &Value,
        options: &InvokeOptions,
    ) -> Result<O> {
        self.transition(invocation_id, FlowState::Validating);
        validate(self.definition.input_schema(), input)?;

        self.transition(invocation_id, FlowState::Rendering);
        let prompt = self.definition.template().render(input)?;

        self.transition(invocation_id, FlowState::Invoking);
        let output_schema = self.definition.output_schema();
        let raw = self.invoker.invoke(&prompt, output_schema, options).await?;

        self.transition(invocation_id, FlowState::ValidatingOutput);
        let output = validate(output_schema, &raw).map_err(|ve| {
            Error::new_schema_mismatch(ve.to_string(), raw.to_string())
        })?;
        serde_json::from_value(output).map_err(|e| {
            Error::new_schema_mismatch(format!("failed to read generated output: {}", e), raw.to_string())
        })
    }

    fn transition(&self, invocation_id: &Uuid, state: FlowState) {
        log::debug!("[{}:{}] {}", self.name(), invocation_id, state);
    }
}
