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

//! # Ahara AI
//!
//! The generation invoker and the flow façade built on top of `ahara-core`.

pub mod extract;
pub mod flow;
pub mod formats;
pub mod generate;

pub use self::flow::{define_flow, Flow, PostProcess};
pub use self::formats::OutputMode;
pub use self::generate::{
    GenerateRequest, GenerationConfig, Generator, InvokeOptions, Invoker, DEFAULT_TIMEOUT,
};
pub use tokio_util::sync::CancellationToken;
