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
use parking_lot::RwLock;
use std::collections::HashMap;

/// A bounded window reassembling out-of-order block completions into a contiguous sequence. Its
/// capacity equals the number of concurrent block fetchers, which also bounds how far the fetch
/// side can run ahead of the persister.
#[derive(Debug)]
pub struct SlidingWindow {
    inner: RwLock<Inner>,
    max_size: usize,
}

#[derive(Debug)]
struct Inner {
    data: HashMap<u64, BlockData>,
    first_height: u64,
}

impl SlidingWindow {
    /// Create a window of the given capacity expecting `init_height` as the first height.
    pub fn new(max_size: usize, init_height: u64) -> Self {
        Self {
            inner: RwLock::new(Inner {
                data: HashMap::with_capacity(max_size),
                first_height: init_height,
            }),
            max_size,
        }
    }

    /// Store block data under its height. Inserting a new height into a full window panics, as
    /// that means the dispatcher has distributed more heights than it has slots for. Duplicate
    /// heights are ignored.
    pub fn insert(&self, height: u64, block_data: BlockData) {
        let mut inner = self.inner.write();

        if inner.data.len() == self.max_size && !inner.data.contains_key(&height) {
            panic!("error inserting block data into sliding window: already full");
        }

        inner.data.entry(height).or_insert(block_data);
    }

    /// Remove and return the longest run of consecutive block data starting at the first
    /// expected height, advancing it past the run.
    pub fn pop_consecutive(&self) -> Vec<BlockData> {
        let mut inner = self.inner.write();
        let Inner { data, first_height } = &mut *inner;

        let mut result = Vec::new();
        while let Some(block_data) = data.remove(first_height) {
            result.push(block_data);
            *first_height += 1;
        }

        result
    }

    #[cfg(test)]
    fn get(&self, height: u64) -> Option<BlockData> {
        self.inner.read().data.get(&height).cloned()
    }
}
