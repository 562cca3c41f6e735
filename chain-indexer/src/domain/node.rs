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

use chrono::{DateTime, Utc};
use std::error::Error as StdError;

/// Consensus node abstraction: the four read operations the indexer needs. Implementations
/// report transport and decode failures through `Error`; retrying is left to the caller.
#[trait_variant::make(Send)]
pub trait Node
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    /// The genesis document, flattened into typed council node and distribution lists.
    async fn genesis(&self) -> Result<Genesis, Self::Error>;

    /// The height of the latest block known to the node.
    async fn latest_height(&self) -> Result<u64, Self::Error>;

    /// The block at the given height: header fields, opaque transaction payloads and signatures.
    async fn block(&self, height: u64) -> Result<Block, Self::Error>;

    /// The execution results for the block at the given height: per-transaction events,
    /// begin-block events and validator updates.
    async fn block_results(&self, height: u64) -> Result<BlockResults, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genesis {
    pub genesis_time: DateTime<Utc>,
    pub chain_id: String,
    pub app_hash: String,
    pub app_state: GenesisAppState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisAppState {
    /// Sorted ascending by derived Tendermint address.
    pub council_nodes: Vec<GenesisCouncilNode>,
    /// Sorted ascending by staking account address.
    pub distribution: Vec<GenesisDistribution>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisCouncilNode {
    pub staking_account_address: String,
    pub address: String,
    pub name: String,
    pub security_contact: String,
    pub pubkey_type: String,
    pub pubkey: String,
}

/// One initial distribution entry; exactly one of `bonded` and `unbonded` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisDistribution {
    pub staking_account_address: String,
    pub bonded: Option<String>,
    pub unbonded: Option<String>,
}

/// A raw block as delivered by the consensus node, before parsing into activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub hash: String,
    pub time: DateTime<Utc>,
    pub app_hash: String,
    pub proposer_address: String,
    /// Opaque base64 encoded transaction payloads.
    pub txs: Vec<String>,
    pub signatures: Vec<BlockSignature>,
}

/// A raw signature; non-voting slots (absent signature) are already dropped by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    pub validator_address: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResults {
    pub height: u64,
    /// One event list per transaction, in payload order.
    pub txs_events: Vec<Vec<Event>>,
    pub begin_block_events: Vec<Event>,
    pub validator_updates: Vec<ValidatorUpdate>,
}

/// An event with base64 encoded attribute keys and values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: String,
    pub attributes: Vec<EventAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
}

/// A validator set change; an absent `power` signals that the validator was kicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorUpdate {
    pub pubkey_type: String,
    pub pubkey: String,
    pub address: String,
    pub power: Option<String>,
}
