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

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A validator identity: a name, a consensus public key and the Tendermint address derived from
/// it. Bound to a staking account by a `nodejoin` transaction or the genesis document. The id is
/// absent until the node has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilNode {
    pub id: Option<u64>,
    pub name: String,
    pub security_contact: Option<String>,
    pub pubkey_type: PubKeyType,
    pub pubkey: String,
    pub address: String,
    pub created_at_block_height: u64,
    pub last_left_at_block_height: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubKeyType {
    Ed25519,
}

/// A change to the active validator set reported alongside a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouncilNodeUpdate {
    pub address: String,
    pub kind: CouncilNodeUpdateKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouncilNodeUpdateKind {
    Left,
}

/// Derive the Tendermint address for a base64 encoded ed25519 public key: the first 20 bytes of
/// its SHA-256 digest, uppercase hex encoded.
pub fn address_from_pubkey(base64_pubkey: &str) -> String {
    let pubkey = STANDARD.decode(base64_pubkey).unwrap_or_default();
    let digest = Sha256::digest(&pubkey);

    const_hex::encode_upper(&digest[..20])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_pubkey() {
        let address = address_from_pubkey("rXhu7xhqYBtJftVLKxvKN0XnpyOzxFnUEfAhD1dEF/I=");

        assert_eq!(address.len(), 40);
        assert_eq!(address, address.to_uppercase());
    }

    #[test]
    fn test_address_from_pubkey_deterministic() {
        let one = address_from_pubkey("EIosObgfONUsnWCBGRpFlRFq5lSxjGIChRlVrVWVkcE=");
        let other = address_from_pubkey("EIosObgfONUsnWCBGRpFlRFq5lSxjGIChRlVrVWVkcE=");

        assert_eq!(one, other);
    }
}
