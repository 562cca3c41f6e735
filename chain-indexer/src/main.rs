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

use anyhow::Context;
use chain_indexer::{
    application::{self, StatusHandle},
    config::Config,
    infra::{storage::postgres::PostgresStorage, tendermint::HttpNode, tx_decoder::JsonTransactionDecoder},
};
use indexer_common::{
    config::ConfigExt,
    infra::{migrations, pool::postgres::PostgresPool},
    telemetry,
};
use log::{error, info};
use std::panic;
use tokio::signal::unix::{SignalKind, signal};

#[tokio::main]
async fn main() {
    // Configuration failures are fatal before any pipeline task starts; logging is not yet set
    // up at this point.
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("cannot load configuration: {error}");
            std::process::exit(1);
        }
    };

    telemetry::init_logging(config.logger);
    panic::set_hook(Box::new(|panic| error!(panic:%; "process panicked")));

    if let Err(error) = run(config).await {
        let error = format!("{error:#}");
        error!(error; "process exited with ERROR");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let sigterm = signal(SignalKind::terminate()).context("register SIGTERM handler")?;

    info!(config:?; "starting");
    let Config {
        run_migrations,
        logger: _,
        database,
        database_pool,
        tendermint,
        sync_config,
    } = config;

    let pool = PostgresPool::new(database, database_pool)
        .await
        .context("create DB pool for Postgres")?;

    if run_migrations {
        migrations::postgres::run(&pool)
            .await
            .context("run database migrations")?;
    }

    let node = HttpNode::new(tendermint).context("create Tendermint client")?;
    let storage = PostgresStorage::new(pool);
    let status = StatusHandle::default();

    application::run(
        sync_config,
        node,
        JsonTransactionDecoder,
        storage,
        status,
        sigterm,
    )
    .await
    .context("run chain indexer")
}
