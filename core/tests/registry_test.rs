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

//! # Registry Tests
//!
//! Integration tests for flow name uniqueness and lookup.

use ahara_core::error::Error;
use ahara_core::flow::FlowDefinition;
use ahara_core::registry::Registry;
use ahara_core::schema::{Field, SchemaNode};
use rstest::*;
use std::sync::Arc;

/// Fixture that provides a new, empty `Registry` for each test.
#[fixture]
fn registry() -> Registry {
    Registry::new()
}

fn definition(name: &str) -> Arc<FlowDefinition> {
    Arc::new(
        FlowDefinition::builder(name)
            .input_schema(
                SchemaNode::object([Field::required("foodName", SchemaNode::string())]).unwrap(),
            )
            .output_schema(
                SchemaNode::object([Field::required("detailedAnalysis", SchemaNode::string())])
                    .unwrap(),
            )
            .prompt("Analyze {{foodName}}")
            .build()
            .unwrap(),
    )
}

#[cfg(test)]
mod registry_test {
    use super::*;

    #[rstest]
    fn lists_registered_flows_sorted(registry: Registry) {
        registry.register_flow(definition("zeta")).unwrap();
        registry.register_flow(definition("alpha")).unwrap();
        assert_eq!(registry.list_flows(), vec!["alpha", "zeta"]);
    }

    #[rstest]
    fn rejects_duplicate_names(registry: Registry) {
        registry.register_flow(definition("foodAnalysis")).unwrap();
        let err = registry.register_flow(definition("foodAnalysis")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(ref name) if name == "foodAnalysis"));
        assert_eq!(registry.list_flows().len(), 1);
    }

    #[rstest]
    fn clones_share_the_same_catalogue(registry: Registry) {
        let clone = registry.clone();
        clone.register_flow(definition("shared")).unwrap();
        let found = registry.lookup_flow("shared").unwrap();
        assert_eq!(found.name(), "shared");
        assert!(registry.lookup_flow("missing").is_none());
    }
}
