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

use ahara::flows::FLOW_NAMES;
use ahara::markdown::markdown_lite_to_html;
use ahara::{Ahara, AharaOptions, InvokeOptions};
use ahara_googleai::{google_ai, GoogleAIPluginOptions};
use serde_json::Value;
use std::process::ExitCode;

const USAGE: &str = "usage: ayurveda-cli list
       ayurveda-cli <flow-name> '<json-input>' [--html]";

/// Renders every string field of a flow output as markdown-lite HTML.
fn to_html(output: Value) -> Value {
    match output {
        Value::String(text) => Value::String(markdown_lite_to_html(&text)),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, to_html(v))).collect()),
        Value::Array(items) => Value::Array(items.into_iter().map(to_html).collect()),
        other => other,
    }
}

async fn run(flow: &str, input: &str, html: bool) -> ahara::Result<Value> {
    let input: Value = serde_json::from_str(input)
        .map_err(|e| ahara::Error::new_internal(format!("input is not valid JSON: {}", e)))?;
    let generator = google_ai(GoogleAIPluginOptions::from_env()?)?;
    let ahara = Ahara::init(AharaOptions::from_env()?.with_generator(generator))?;

    let output = ahara.invoke_json(flow, input, InvokeOptions::default()).await?;
    Ok(if html { to_html(output) } else { output })
}

#[tokio::main]
async fn main() -> ExitCode {
    ahara::logging::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [command] if command == "list" => {
            for name in FLOW_NAMES {
                println!("{}", name);
            }
            ExitCode::SUCCESS
        }
        [flow, input, rest @ ..] if rest.iter().all(|a| a == "--html") => {
            log::info!("Running {}...", flow);
            match run(flow, input, !rest.is_empty()).await {
                Ok(output) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
                    );
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    log::error!("{} failed: {}", flow, e);
                    eprintln!("{}", e.user_message());
                    if let Ok(status) = serde_json::to_string_pretty(&e.as_status()) {
                        eprintln!("{}", status);
                    }
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            ExitCode::from(2)
        }
    }
}
