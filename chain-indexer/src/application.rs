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

use crate::domain::{
    BlockData, GENESIS_BLOCK_HEIGHT, SerialHeight, SlidingWindow, TransactionDecoder,
    node::Node, parse_block_data, parse_genesis_block_data, storage::Storage,
};
use anyhow::{Context, bail};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::{
    select,
    signal::unix::Signal,
    sync::mpsc,
    task,
    time::{interval, sleep},
};

/// Fixed back-off before a failed fetch or store is retried. The upstream node and the database
/// are assumed to be authoritative and recoverable, so retries are unbounded.
const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(with = "humantime_serde")]
    pub block_height_polling_interval: Duration,

    pub max_concurrent_block_worker: usize,

    pub block_data_channel_size: usize,
}

/// Read access to the pipeline's two high-water marks, shared with the HTTP status layer.
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    tendermint_height: Arc<SerialHeight>,
    sync_height: Arc<SerialHeight>,
}

impl StatusHandle {
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            tendermint_block_height: self.tendermint_height.get(),
            sync_block_height: self.sync_height.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub tendermint_block_height: u64,
    pub sync_block_height: u64,
}

/// Run the sync pipeline: a tip poller, a fetch dispatcher with at most
/// `max_concurrent_block_worker` concurrent fetchers, an aggregator restoring block height order
/// and a persister storing one block per database transaction. Runs until SIGTERM.
pub async fn run(
    config: Config,
    node: impl Node,
    decoder: impl TransactionDecoder,
    storage: impl Storage,
    status: StatusHandle,
    mut sigterm: Signal,
) -> anyhow::Result<()> {
    let Config {
        block_height_polling_interval,
        max_concurrent_block_worker,
        block_data_channel_size,
    } = config;

    let last_sync_height = storage
        .last_synced_height()
        .await
        .context("get last synced height")?;
    info!(last_sync_height; "starting from last synchronized height");

    status.sync_height.set_if_greater(last_sync_height);
    let StatusHandle {
        tendermint_height,
        sync_height,
    } = status;

    let (completions_tx, completions_rx) = mpsc::channel(max_concurrent_block_worker);
    let (slot_freed_tx, slot_freed_rx) = mpsc::channel(max_concurrent_block_worker);
    let (block_data_tx, block_data_rx) = mpsc::channel(block_data_channel_size);
    let (block_stored_tx, block_stored_rx) = mpsc::channel(block_data_channel_size);

    let window = Arc::new(SlidingWindow::new(
        max_concurrent_block_worker,
        last_sync_height + 1,
    ));

    // Prime the dispatcher so it distributes before the first slot is freed.
    slot_freed_tx
        .send(0)
        .await
        .expect("slot freed channel has capacity");

    let tip_poller_task = task::spawn(poll_tip(
        node.clone(),
        Arc::clone(&tendermint_height),
        block_height_polling_interval,
    ));

    let dispatcher_task = task::spawn(dispatch_blocks(
        node,
        decoder,
        Arc::clone(&tendermint_height),
        slot_freed_rx,
        completions_tx,
        max_concurrent_block_worker,
        last_sync_height,
    ));

    let aggregator_task = task::spawn(aggregate_completions(
        completions_rx,
        window,
        slot_freed_tx,
        block_data_tx,
    ));

    let persister_task = task::spawn(persist_block_data(
        storage,
        block_data_rx,
        block_stored_tx,
    ));

    let sync_height_task = task::spawn(track_sync_height(block_stored_rx, sync_height));

    // Completion of any task is unexpected; only SIGTERM ends the pipeline cleanly.
    select! {
        result = tip_poller_task => {
            result.context("tip poller panicked")?;
            bail!("tip poller completed unexpectedly");
        }

        result = dispatcher_task => {
            result.context("dispatcher panicked")?;
            bail!("dispatcher completed unexpectedly");
        }

        result = aggregator_task => {
            result.context("aggregator panicked")?;
            bail!("aggregator completed unexpectedly");
        }

        result = persister_task => {
            result.context("persister panicked")?;
            bail!("persister completed unexpectedly");
        }

        result = sync_height_task => {
            result.context("sync height tracker panicked")?;
            bail!("sync height tracker completed unexpectedly");
        }

        _ = sigterm.recv() => {
            warn!("SIGTERM received");
            Ok(())
        }
    }
}

/// Periodically poll the node for its latest block height and publish strictly increasing values
/// to the shared tip cell.
async fn poll_tip(node: impl Node, tendermint_height: Arc<SerialHeight>, period: Duration) {
    let mut interval = interval(period);

    loop {
        interval.tick().await;

        match node.latest_height().await {
            Ok(height) => {
                debug!(height, last = tendermint_height.get(); "latest block height polled");
                tendermint_height.set_if_greater(height);
            }

            Err(error) => error!(error:%; "error polling latest block height"),
        }
    }
}

/// Distribute block heights to fetchers, at most `max_worker` in flight. Blocks on the slot-freed
/// channel when all slots are taken and on the tip notification when caught up.
async fn dispatch_blocks(
    node: impl Node,
    decoder: impl TransactionDecoder,
    tendermint_height: Arc<SerialHeight>,
    mut slot_freed: mpsc::Receiver<usize>,
    completions: mpsc::Sender<BlockData>,
    max_worker: usize,
    last_sync_height: u64,
) {
    let mut last_distributed_height = last_sync_height;
    let mut inflight = 0;

    while let Some(freed) = slot_freed.recv().await {
        inflight -= freed;

        let mut tip = tendermint_height.get();
        if last_distributed_height == tip {
            debug!("dispatcher has free workers but is blocked because of no new block");
            tendermint_height.updated().await;
            tip = tendermint_height.get();
        }

        while last_distributed_height < tip && inflight < max_worker {
            let height = last_distributed_height + 1;
            debug!(height; "distributing block height");

            task::spawn(fetch_block_data(
                node.clone(),
                decoder.clone(),
                height,
                completions.clone(),
            ));

            inflight += 1;
            last_distributed_height = height;
        }
    }

    info!("shutting down dispatcher");
}

/// Fetch and parse one block, retrying forever on transient errors.
async fn fetch_block_data(
    node: impl Node,
    decoder: impl TransactionDecoder,
    height: u64,
    completions: mpsc::Sender<BlockData>,
) {
    loop {
        match get_block_data(&node, &decoder, height).await {
            Ok(block_data) => {
                debug!(height; "processed block data");

                if completions.send(block_data).await.is_err() {
                    warn!(height; "block data completions channel closed");
                }
                return;
            }

            Err(error) => {
                error!(height, error:%; "error processing block");
                sleep(RETRY_DELAY).await;
            }
        }
    }
}

async fn get_block_data<N>(
    node: &N,
    decoder: &impl TransactionDecoder,
    height: u64,
) -> Result<BlockData, N::Error>
where
    N: Node,
{
    info!(height; "processing block");

    if height == GENESIS_BLOCK_HEIGHT {
        let genesis = node.genesis().await?;
        let block = node.block(GENESIS_BLOCK_HEIGHT).await?;

        Ok(parse_genesis_block_data(genesis, block))
    } else {
        let block = node.block(height).await?;
        let block_results = node.block_results(height).await?;

        Ok(parse_block_data(decoder, block, block_results))
    }
}

/// Reassemble out-of-order completions and forward the consecutive prefix downstream in height
/// order, reporting the number of freed slots to the dispatcher after every insert.
async fn aggregate_completions(
    mut completions: mpsc::Receiver<BlockData>,
    window: Arc<SlidingWindow>,
    slot_freed: mpsc::Sender<usize>,
    block_data_out: mpsc::Sender<BlockData>,
) {
    while let Some(block_data) = completions.recv().await {
        debug!(height = block_data.block.height; "received block data from worker");

        window.insert(block_data.block.height, block_data);
        let popped = window.pop_consecutive();

        if slot_freed.send(popped.len()).await.is_err() {
            break;
        }

        for block_data in popped {
            if block_data_out.send(block_data).await.is_err() {
                info!("shutting down aggregator");
                return;
            }
        }
    }

    info!("shutting down aggregator");
}

/// Store blocks one at a time in height order, retrying each block forever on transient database
/// errors; a rolled back transaction leaves no partial writes.
async fn persist_block_data(
    storage: impl Storage,
    mut block_data_in: mpsc::Receiver<BlockData>,
    block_stored: mpsc::Sender<u64>,
) {
    while let Some(block_data) = block_data_in.recv().await {
        let height = block_data.block.height;

        loop {
            info!(height; "storing block data");

            match storage.save_block_data(&block_data).await {
                Ok(()) => break,
                Err(error) => {
                    error!(height, error:%; "error storing block data");
                    sleep(RETRY_DELAY).await;
                }
            }
        }

        if block_stored.send(height).await.is_err() {
            break;
        }
    }

    info!("shutting down persister");
}

async fn track_sync_height(mut block_stored: mpsc::Receiver<u64>, sync_height: Arc<SerialHeight>) {
    while let Some(height) = block_stored.recv().await {
        sync_height.set_if_greater(height);
    }
}
