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

use parking_lot::RwLock;
use tokio::sync::Notify;

/// A monotonically non-decreasing block height shared between one writer and several readers.
/// An update fires a one-slot notification: when no task is awaiting [SerialHeight::updated], a
/// single permit is stored and later notifications collapse into it, so a slow subscriber simply
/// observes the newest value on its next read.
#[derive(Debug, Default)]
pub struct SerialHeight {
    value: RwLock<u64>,
    on_update: Notify,
}

impl SerialHeight {
    pub fn new(value: u64) -> Self {
        Self {
            value: RwLock::new(value),
            on_update: Notify::new(),
        }
    }

    pub fn get(&self) -> u64 {
        *self.value.read()
    }

    /// Set the value if the given one is strictly greater and notify; return whether it was
    /// updated.
    pub fn set_if_greater(&self, value: u64) -> bool {
        {
            let mut current = self.value.write();
            if value <= *current {
                return false;
            }
            *current = value;
        }

        self.on_update.notify_one();
        true
    }

    /// Wait for the next update. A notification fired while nobody was waiting is delivered
    /// immediately.
    pub async fn updated(&self) {
        self.on_update.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};
    use tokio::time::timeout;

    #[test]
    fn test_set_if_greater() {
        let height = SerialHeight::new(10);

        assert!(!height.set_if_greater(10));
        assert!(!height.set_if_greater(9));
        assert_eq!(height.get(), 10);

        assert!(height.set_if_greater(11));
        assert_eq!(height.get(), 11);
    }

    #[tokio::test]
    async fn test_updated_receives_pending_notification() {
        let height = Arc::new(SerialHeight::new(0));

        height.set_if_greater(1);

        timeout(Duration::from_secs(1), height.updated())
            .await
            .expect("pending notification is delivered");
    }

    #[tokio::test]
    async fn test_updated_wakes_waiter() {
        let height = Arc::new(SerialHeight::new(0));

        let waiter = tokio::spawn({
            let height = Arc::clone(&height);
            async move { height.updated().await }
        });

        tokio::task::yield_now().await;
        height.set_if_greater(42);

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter is woken")
            .expect("waiter does not panic");
        assert_eq!(height.get(), 42);
    }
}
