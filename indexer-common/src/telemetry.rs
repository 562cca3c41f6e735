// This file is part of chain-indexer.
// Copyright (C) 2026 Chain Indexer Contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use log::LevelFilter;
use logforth::{append::Stderr, layout::TextLayout};
use serde::Deserialize;

/// Configuration for logging.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Config {
    #[serde(default = "color_default")]
    pub color: bool,

    #[serde(default)]
    pub level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: color_default(),
            level: LogLevel::default(),
        }
    }
}

/// Log level, deserialized from its lowercase name. The `log` facade has no `panic` severity;
/// `panic` filters like `error`, with panics reported through the panic hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Panic,
    Error,
    #[default]
    Info,
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Panic | LogLevel::Error => LevelFilter::Error,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

/// Initialize logging to stderr with the given [Config]. Must only be called once.
pub fn init_logging(config: Config) {
    let layout = if config.color {
        TextLayout::default()
    } else {
        TextLayout::default().no_color()
    };

    let filter = match LevelFilter::from(config.level) {
        LevelFilter::Off => logforth::record::LevelFilter::Off,
        LevelFilter::Error => logforth::record::LevelFilter::MoreSevereEqual(logforth::record::Level::Error),
        LevelFilter::Warn => logforth::record::LevelFilter::MoreSevereEqual(logforth::record::Level::Warn),
        LevelFilter::Info => logforth::record::LevelFilter::MoreSevereEqual(logforth::record::Level::Info),
        LevelFilter::Debug => logforth::record::LevelFilter::MoreSevereEqual(logforth::record::Level::Debug),
        LevelFilter::Trace => logforth::record::LevelFilter::MoreSevereEqual(logforth::record::Level::Trace),
    };

    logforth::starter_log::builder()
        .dispatch(|dispatch| {
            dispatch
                .filter(filter)
                .append(Stderr::default().with_layout(layout))
        })
        .apply();
}

fn color_default() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        Figment,
        providers::{Format, Toml},
    };

    #[test]
    fn test_level_deserialization() {
        let config = Figment::new()
            .merge(Toml::string("color = false\nlevel = \"panic\""))
            .extract::<Config>()
            .expect("config can be extracted");

        assert_eq!(config.level, LogLevel::Panic);
        assert_eq!(LevelFilter::from(config.level), LevelFilter::Error);
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        let config = Figment::new()
            .merge(Toml::string("level = \"warn\""))
            .extract::<Config>();

        assert!(config.is_err());
    }
}
