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

use crate::domain::BlockData;

/// Storage abstraction. Errors are transient and retryable; invariant violations (a missing
/// staking account, a signature referencing an unknown council node, an update affecting zero
/// rows where exactly one was required) panic, because they indicate upstream corruption or a
/// schema-code mismatch.
#[trait_variant::make(Send)]
pub trait Storage
where
    Self: Clone + Send + Sync + 'static,
{
    /// The height of the highest persisted block, or 0 when the store is empty.
    async fn last_synced_height(&self) -> Result<u64, sqlx::Error>;

    /// Persist the given block data atomically: the block, its signatures, every activity, the
    /// reward if present and the validator set changes.
    async fn save_block_data(&self, block_data: &BlockData) -> Result<(), sqlx::Error>;
}
