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
//! A scripted generator and an `Ahara` instance wired to it.

#![allow(dead_code)]

use ahara::{Ahara, AharaOptions, GenerateRequest, Generator, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the scripted generator does for one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Unavailable,
    Hang,
    /// Answers after a delay.
    Delayed(Duration, String),
}

/// A generator that answers from a script, falling back to echoing the
/// last line of the prompt once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    pub requests: Arc<Mutex<Vec<GenerateRequest>>>,
    script: Arc<Mutex<VecDeque<Reply>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().push_back(reply);
        self
    }

    pub fn reply_text(&self, text: &str) -> &Self {
        self.push(Reply::Text(text.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scriptedGenerator"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Unavailable) => Err(ahara::Error::new_unavailable("503 Service Unavailable")),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            None => Ok(request.prompt.lines().last().unwrap_or_default().to_string()),
        }
    }
}

pub fn ahara_with(generator: &ScriptedGenerator) -> Arc<Ahara> {
    Ahara::init(AharaOptions::default().with_generator(Arc::new(generator.clone()))).unwrap()
}

pub fn ahara_with_timeout(generator: &ScriptedGenerator, timeout: Duration) -> Arc<Ahara> {
    let options = AharaOptions {
        timeout,
        ..AharaOptions::default().with_generator(Arc::new(generator.clone()))
    };
    Ahara::init(options).unwrap()
}
