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

use crate::{application, infra};
use indexer_common::{infra::pool::postgres, telemetry};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run_migrations: bool,

    #[serde(default)]
    pub logger: telemetry::Config,

    pub database: postgres::Config,

    pub database_pool: postgres::PoolConfig,

    pub tendermint: infra::tendermint::Config,

    #[serde(rename = "sync")]
    pub sync_config: application::Config,
}
