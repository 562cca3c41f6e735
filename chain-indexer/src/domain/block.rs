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
use num_bigint::BigInt;

/// Relevant block data from the perspective of the Chain Indexer. The hash and app hash are
/// uppercase hex encoded as delivered by the consensus node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub hash: String,
    pub time: DateTime<Utc>,
    pub app_hash: String,
}

/// Coins minted by the chain at the start of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockReward {
    pub block_height: u64,
    pub minted: BigInt,
}

/// A council node's vote on a block. The proposer is identified by matching the signature's
/// validator address against the block header's proposer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    pub block_height: u64,
    pub council_node_address: String,
    pub signature: String,
    pub is_proposer: bool,
}
