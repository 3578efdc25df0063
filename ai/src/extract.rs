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

//! # JSON Extraction
//!
//! Models often wrap JSON in prose or markdown fences. [`extract_json`] finds
//! the first complete top-level object or array in a string and parses it
//! with a lenient JSON5 parser, so trailing commas and similar slips are
//! tolerated.

use ahara_core::error::{Error, Result};
use serde::de::DeserializeOwned;

/// Extracts the first JSON object or array from `text`.
///
/// Returns `Ok(None)` when `text` contains no `{` or `[`. Returns an error
/// when a structure is found but is unterminated or does not parse.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<Option<T>> {
    let mut start_pos: Option<usize> = None;
    let mut opening_char = '{';
    let mut closing_char = '}';
    let mut nesting_count = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        let Some(start) = start_pos else {
            if c == '{' || c == '[' {
                opening_char = c;
                closing_char = if c == '{' { '}' } else { ']' };
                start_pos = Some(i);
                nesting_count = 1;
            }
            continue;
        };

        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            c if c == opening_char => nesting_count += 1,
            c if c == closing_char => {
                nesting_count -= 1;
                if nesting_count == 0 {
                    let json_str = &text[start..i + c.len_utf8()];
                    return json5::from_str(json_str).map(Some).map_err(|e| {
                        Error::new_schema_mismatch(format!("JSON parsing error: {}", e), text)
                    });
                }
            }
            _ => {}
        }
    }

    match start_pos {
        Some(_) => Err(Error::new_schema_mismatch(
            "unterminated JSON structure in response",
            text,
        )),
        None => Ok(None),
    }
}
