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

//! # Logging
//!
//! The library only emits records through the `log` facade. Applications
//! choose the backend; [`init`] installs `env_logger` for those that do not
//! care, honouring `RUST_LOG` and defaulting to `info`.

use log::LevelFilter;
use once_cell::sync::OnceCell;

// Re-export log macros for convenient use as `ahara_core::logging::info!`.
pub use log::{debug, error, info, trace, warn};

static INITIALIZED: OnceCell<bool> = OnceCell::new();

/// Installs `env_logger` as the global logger.
///
/// Safe to call more than once; only the first call has an effect. Returns
/// `false` when another logger was already installed by someone else.
pub fn init() -> bool {
    init_with_default(LevelFilter::Info)
}

/// Like [`init`], with an explicit level used when `RUST_LOG` is unset.
pub fn init_with_default(level: LevelFilter) -> bool {
    *INITIALIZED.get_or_init(|| {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
        )
        .format_timestamp_millis()
        .try_init()
        .is_ok()
    })
}

/// Logs a message with a JSON metadata payload at the INFO level.
pub fn log_structured(msg: &str, metadata: serde_json::Value) {
    info!("{}: {}", msg, metadata);
}

/// Logs a message with a JSON metadata payload at the ERROR level.
pub fn log_structured_error(msg: &str, metadata: serde_json::Value) {
    error!("{}: {}", msg, metadata);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let first = init();
        assert_eq!(init_with_default(LevelFilter::Debug), first);
    }
}
