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

use crate::domain::CouncilNode;
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::Serialize;
use std::fmt::{self, Display};

/// A semantic record of a state change, caused either by a user transaction or by an event the
/// chain itself authored at block start. Activities are applied in the order produced by the
/// block parser: transactions first, begin-block events second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub block_height: u64,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Genesis(GenesisActivity),
    Transfer(TransferActivity),
    Deposit(DepositActivity),
    Unbond(UnbondActivity),
    Withdraw(WithdrawActivity),
    NodeJoin(NodeJoinActivity),
    Unjail(UnjailActivity),
    Reward(RewardEvent),
    Slash(SlashEvent),
    Jail(JailEvent),
}

impl ActivityKind {
    /// The type discriminator as persisted in the `activities` table.
    pub fn activity_type(&self) -> ActivityType {
        match self {
            Self::Genesis(_) => ActivityType::Genesis,
            Self::Transfer(_) => ActivityType::Transfer,
            Self::Deposit(_) => ActivityType::Deposit,
            Self::Unbond(_) => ActivityType::Unbond,
            Self::Withdraw(_) => ActivityType::Withdraw,
            Self::NodeJoin(_) => ActivityType::NodeJoin,
            Self::Unjail(_) => ActivityType::Unjail,
            Self::Reward(_) => ActivityType::Reward,
            Self::Slash(_) => ActivityType::Slash,
            Self::Jail(_) => ActivityType::Jail,
        }
    }
}

/// The flattened type discriminator. `NodeKicked` is part of the persisted vocabulary, but kicks
/// are materialized as council node updates, so no activity of that type is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Genesis,
    Transfer,
    Deposit,
    Unbond,
    Withdraw,
    NodeJoin,
    Unjail,
    Reward,
    Slash,
    Jail,
    NodeKicked,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "genesis",
            Self::Transfer => "transfer",
            Self::Deposit => "deposit",
            Self::Unbond => "unbond",
            Self::Withdraw => "withdraw",
            Self::NodeJoin => "nodejoin",
            Self::Unjail => "unjail",
            Self::Reward => "reward",
            Self::Slash => "slash",
            Self::Jail => "jail",
            Self::NodeKicked => "nodekicked",
        }
    }
}

impl Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One genesis distribution entry, block height 1. Carries council node metadata when the staking
/// address also appears in the genesis council node list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisActivity {
    pub staking_address: String,
    pub bonded: Option<BigInt>,
    pub unbonded: Option<BigInt>,
    pub council_node_meta: Option<CouncilNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub inputs: Vec<TransferInput>,
    pub output_count: u32,
}

/// Reference to an unspent output of an earlier transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferInput {
    #[serde(rename = "prev_txid")]
    pub tx_id: String,

    #[serde(rename = "prev_output_index")]
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub staking_address: String,
    pub bonded: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbondActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub staking_address: String,
    /// Negative: the amount leaving the bonded balance.
    pub bonded: BigInt,
    pub unbonded: BigInt,
    pub unbonded_from: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub staking_address: String,
    /// Negative: the amount leaving the unbonded balance.
    pub unbonded: BigInt,
    pub output_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeJoinActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub staking_address: String,
    pub council_node_meta: CouncilNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnjailActivity {
    pub tx_id: Option<String>,
    pub fee: Option<BigInt>,
    pub staking_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEvent {
    pub event_position: u32,
    pub staking_address: String,
    pub bonded: BigInt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashEvent {
    pub event_position: u32,
    pub staking_address: String,
    /// Negative or zero.
    pub bonded: BigInt,
    /// Negative or zero.
    pub unbonded: BigInt,
    pub punishment_kind: Option<PunishmentKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JailEvent {
    pub event_position: u32,
    pub staking_address: String,
    pub jailed_until: DateTime<Utc>,
    pub punishment_kind: Option<PunishmentKind>,
}

/// The reason a staking account was punished by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunishmentKind {
    NonLive,
    ByzantineFault,
}

impl PunishmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NonLive => "NonLive",
            Self::ByzantineFault => "ByzantineFault",
        }
    }

    /// Parse the persisted string form; panics on an unknown value, which indicates a
    /// schema-code mismatch.
    pub fn from_str_strict(s: &str) -> Self {
        match s {
            "NonLive" => Self::NonLive,
            "ByzantineFault" => Self::ByzantineFault,
            other => panic!("unsupported punishment kind {other}"),
        }
    }
}

impl Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
