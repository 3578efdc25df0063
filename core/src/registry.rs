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

//! # Flow Registry
//!
//! The registry records every flow defined in a process and enforces that
//! flow names are unique. It is cheap to clone and safe to share across
//! tasks; after startup it is only read.

use crate::error::{Error, Result};
use crate::flow::FlowDefinition;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A thread-safe catalogue of flow definitions keyed by name.
#[derive(Clone, Default)]
pub struct Registry {
    flows: Arc<Mutex<BTreeMap<String, Arc<FlowDefinition>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn flows(&self) -> Result<MutexGuard<'_, BTreeMap<String, Arc<FlowDefinition>>>> {
        self.flows
            .lock()
            .map_err(|_| Error::new_internal("flow registry lock poisoned"))
    }

    /// Registers a definition. Fails with `Error::AlreadyExists` if the name
    /// is taken.
    pub fn register_flow(&self, definition: Arc<FlowDefinition>) -> Result<()> {
        let mut flows = self.flows()?;
        let name = definition.name().to_string();
        if flows.contains_key(&name) {
            return Err(Error::AlreadyExists(name));
        }
        log::debug!("registered flow '{}'", name);
        flows.insert(name, definition);
        Ok(())
    }

    pub fn lookup_flow(&self, name: &str) -> Option<Arc<FlowDefinition>> {
        self.flows().ok()?.get(name).cloned()
    }

    /// The names of all registered flows, sorted.
    pub fn list_flows(&self) -> Vec<String> {
        self.flows()
            .map(|flows| flows.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("flows", &self.list_flows())
            .finish()
    }
}
