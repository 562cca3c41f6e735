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

use serde::Deserialize;
use std::error::Error as StdError;

/// Decoder for the opaque transaction payload format. The indexer depends only on the typed
/// descriptor returned here; the wire format itself is the decoder's concern.
pub trait TransactionDecoder
where
    Self: Clone + Send + Sync + 'static,
{
    type Error: StdError + Send + Sync + 'static;

    fn decode_base64(&self, raw_tx: &str) -> Result<DecodedTransaction, Self::Error>;
}

/// The typed descriptor of a decoded transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedTransaction {
    pub tx_type: TransactionType,

    #[serde(default)]
    pub inputs: Vec<DecodedTransactionInput>,

    pub output_count: Option<u32>,

    #[serde(rename = "staked_state_address")]
    pub staking_account_address: Option<String>,

    pub council_node_meta: Option<DecodedCouncilNodeMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TransactionType {
    Transfer,
    Deposit,
    Unbond,
    Withdraw,
    NodeJoin,
    Unjail,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedTransactionInput {
    /// Hex encoded id of the transaction whose output is spent.
    pub id: String,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedCouncilNodeMeta {
    pub name: String,
    pub security_contact: Option<String>,
    pub consensus_pubkey: DecodedConsensusPubKey,
    pub confidential_init: Option<DecodedConfidentialInit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedConsensusPubKey {
    #[serde(rename = "type")]
    pub pubkey_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DecodedConfidentialInit {
    pub cert: String,
}
