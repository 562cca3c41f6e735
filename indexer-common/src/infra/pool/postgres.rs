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

use log::warn;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{ops::Deref, time::Duration};
use tokio::time::interval;

/// Connection options for the Postgres database.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ssl: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub name: String,
    pub schema: String,
}

/// Tuning options for the Postgres connection pool.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoolConfig {
    pub max_conns: u32,
    pub min_conns: u32,

    #[serde(with = "humantime_serde")]
    pub max_conn_lifetime: Duration,

    #[serde(with = "humantime_serde")]
    pub max_conn_idle_time: Duration,

    #[serde(with = "humantime_serde")]
    pub health_check_interval: Duration,
}

/// A connection pool for the Postgres database.
#[derive(Debug, Clone)]
pub struct PostgresPool(PgPool);

impl PostgresPool {
    /// Create a new [PostgresPool] with the given connection and pool options and spawn a
    /// background task pinging the database on the configured health check interval.
    pub async fn new(config: Config, pool_config: PoolConfig) -> Result<Self, sqlx::Error> {
        let Config {
            ssl,
            host,
            port,
            username,
            password,
            name,
            schema,
        } = config;

        let ssl_mode = if ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let options = PgConnectOptions::new()
            .ssl_mode(ssl_mode)
            .host(&host)
            .port(port)
            .username(&username)
            .password(password.expose_secret())
            .database(&name)
            .options([("search_path", schema.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(pool_config.max_conns)
            .min_connections(pool_config.min_conns)
            .max_lifetime(pool_config.max_conn_lifetime)
            .idle_timeout(pool_config.max_conn_idle_time)
            .connect_with(options)
            .await?;

        spawn_health_check(pool.clone(), pool_config.health_check_interval);

        Ok(Self(pool))
    }
}

impl Deref for PostgresPool {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn spawn_health_check(pool: PgPool, period: Duration) {
    tokio::spawn(async move {
        let mut interval = interval(period);
        interval.tick().await;

        loop {
            interval.tick().await;

            if let Err(error) = sqlx::query("SELECT 1").execute(&pool).await {
                warn!(error:%; "database health check failed");
            }
        }
    });
}
