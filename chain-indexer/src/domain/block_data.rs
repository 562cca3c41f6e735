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

use crate::domain::{Activity, Block, BlockReward, BlockSignature, CouncilNodeUpdate};

/// Everything the indexer materializes for one block: the block itself, its signatures, the
/// semantically typed activities, an optional reward and the validator set changes. Persisted
/// atomically in a single database transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockData {
    pub block: Block,
    pub signatures: Vec<BlockSignature>,
    pub activities: Vec<Activity>,
    pub reward: Option<BlockReward>,
    pub council_node_updates: Vec<CouncilNodeUpdate>,
}
