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

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::de::DeserializeOwned;
use std::env;

const CONFIG_FILE_ENV_VAR: &str = "CONFIG_FILE";
const CONFIG_FILE_DEFAULT: &str = "config.toml";
const ENV_VAR_PREFIX: &str = "APP__";
const ENV_VAR_SEPARATOR: &str = "__";

/// Extension methods for configuration loading.
pub trait ConfigExt
where
    Self: DeserializeOwned,
{
    /// Load the configuration from a TOML file, the path of which is taken from the `CONFIG_FILE`
    /// environment variable and defaults to `config.toml`. Values can be overridden by `APP__`
    /// prefixed and `__` separated environment variables, e.g. `APP__DATABASE__PORT`.
    fn load() -> Result<Self, figment::Error> {
        let config_file =
            env::var(CONFIG_FILE_ENV_VAR).unwrap_or_else(|_| CONFIG_FILE_DEFAULT.to_string());

        Figment::new()
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_VAR_PREFIX).split(ENV_VAR_SEPARATOR))
            .extract()
    }
}

impl<T> ConfigExt for T where T: DeserializeOwned {}
