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

use crate::domain::PunishmentKind;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;

/// An on-chain account whose balance is split into a bonded (validator stake) and an unbonded
/// (liquid) portion. Created lazily by the first genesis or deposit activity naming its address,
/// mutated by every later activity naming it and never destroyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingAccount {
    pub address: String,
    pub nonce: u64,
    pub bonded: BigInt,
    pub unbonded: BigInt,
    pub unbonded_from: Option<DateTime<Utc>>,
    pub punishment_kind: Option<PunishmentKind>,
    pub jailed_until: Option<DateTime<Utc>>,
    pub current_council_node_id: Option<u64>,
}

impl StakingAccount {
    /// A fresh account with zero nonce and the given balances.
    pub fn new(address: String, bonded: BigInt, unbonded: BigInt) -> Self {
        Self {
            address,
            nonce: 0,
            bonded,
            unbonded,
            unbonded_from: None,
            punishment_kind: None,
            jailed_until: None,
            current_council_node_id: None,
        }
    }

    pub fn increment_nonce(&mut self) {
        self.nonce += 1;
    }

    pub fn add_bonded(&mut self, value: &BigInt) {
        self.bonded += value;
    }

    pub fn add_unbonded(&mut self, value: &BigInt) {
        self.unbonded += value;
    }

    pub fn jail(&mut self, jailed_until: DateTime<Utc>, punishment_kind: Option<PunishmentKind>) {
        self.jailed_until = Some(jailed_until);
        self.punishment_kind = punishment_kind;
    }

    pub fn unjail(&mut self) {
        self.jailed_until = None;
        self.punishment_kind = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn account() -> StakingAccount {
        StakingAccount::new(
            "0x4b75f275dde0a8c8e70fb84243adc97a3afb78f2".to_string(),
            BigInt::from(100_000_000_145_u64),
            BigInt::from(0),
        )
    }

    #[test]
    fn test_unbond_arithmetic() {
        let mut account = account();
        account.nonce = 1;

        account.increment_nonce();
        account.add_bonded(&BigInt::from(-100_000_000_145_i64));
        account.add_unbonded(&BigInt::from(100_000_000_000_u64));

        assert_eq!(account.nonce, 2);
        assert_eq!(account.bonded, BigInt::from(0));
        assert_eq!(account.unbonded, BigInt::from(100_000_000_000_u64));
    }

    #[test]
    fn test_balance_linearity() {
        let mut account = account();
        let deltas = [
            BigInt::from(25),
            BigInt::from(-100),
            BigInt::from(1_000_000_000_i64),
        ];

        for delta in &deltas {
            account.add_bonded(delta);
        }

        let expected = BigInt::from(100_000_000_145_u64) + deltas.iter().sum::<BigInt>();
        assert_eq!(account.bonded, expected);
    }

    #[test]
    fn test_jail_unjail() {
        let mut account = account();
        let jailed_until = DateTime::from_timestamp(1_588_851_025, 0).expect("valid timestamp");

        account.jail(jailed_until, Some(PunishmentKind::ByzantineFault));
        assert_eq!(account.jailed_until, Some(jailed_until));
        assert_eq!(account.punishment_kind, Some(PunishmentKind::ByzantineFault));

        account.unjail();
        assert_eq!(account.jailed_until, None);
        assert_eq!(account.punishment_kind, None);
    }

    #[test]
    fn test_nonce_increments_by_one() {
        let mut account = account();

        for expected in 1..=4 {
            account.increment_nonce();
            assert_eq!(account.nonce, expected);
        }
    }
}
