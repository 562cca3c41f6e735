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

use crate::domain::{
    address_from_pubkey,
    node::{
        Block, BlockResults, BlockSignature, Event, EventAttribute, Genesis, GenesisAppState,
        GenesisCouncilNode, GenesisDistribution, Node, ValidatorUpdate,
    },
};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::{collections::HashMap, time::Duration};
use thiserror::Error;

const GENESIS_DISTRIBUTION_TYPE_BONDED: &str = "Bonded";
const GENESIS_DISTRIBUTION_TYPE_UNBONDED: &str = "UnbondedFromGenesis";

fn request_timeout_default() -> Duration {
    Duration::from_secs(10)
}

/// Config for the connection to the Tendermint node.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub http_rpc_url: String,

    #[serde(with = "humantime_serde", default = "request_timeout_default")]
    pub request_timeout: Duration,
}

/// A [Node] implementation talking JSON-RPC over HTTP to a Tendermint node.
#[derive(Debug, Clone)]
pub struct HttpNode {
    client: Client,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum HttpNodeError {
    #[error("error requesting Tendermint {0} endpoint")]
    Request(&'static str, #[source] reqwest::Error),

    #[error("error requesting Tendermint {0} endpoint: status {1}")]
    UnexpectedStatus(&'static str, StatusCode),

    #[error("error converting block height {0} to unsigned integer")]
    InvalidHeight(String),
}

impl HttpNode {
    /// Create a new [HttpNode] with the given [Config].
    pub fn new(config: Config) -> Result<Self, HttpNodeError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| HttpNodeError::Request("client", error))?;

        Ok(Self {
            client,
            base_url: config.http_rpc_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request<T>(
        &self,
        method: &'static str,
        height: Option<u64>,
    ) -> Result<T, HttpNodeError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let mut request = self.client.get(url);
        if let Some(height) = height {
            request = request.query(&[("height", height.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|error| HttpNodeError::Request(method, error))?;
        if !response.status().is_success() {
            return Err(HttpNodeError::UnexpectedStatus(method, response.status()));
        }

        let envelope = response
            .json::<JsonRpcResponse<T>>()
            .await
            .map_err(|error| HttpNodeError::Request(method, error))?;

        Ok(envelope.result)
    }
}

impl Node for HttpNode {
    type Error = HttpNodeError;

    async fn genesis(&self) -> Result<Genesis, Self::Error> {
        let result = self.request::<GenesisResult>("genesis", None).await?;
        Ok(genesis_from_raw(result.genesis))
    }

    async fn latest_height(&self) -> Result<u64, Self::Error> {
        let result = self
            .request::<RawBlockResults>("block_results", None)
            .await?;

        parse_height(&result.height)
    }

    async fn block(&self, height: u64) -> Result<Block, Self::Error> {
        let result = self.request::<BlockResult>("block", Some(height)).await?;
        block_from_raw(result)
    }

    async fn block_results(&self, height: u64) -> Result<BlockResults, Self::Error> {
        let result = self
            .request::<RawBlockResults>("block_results", Some(height))
            .await?;

        block_results_from_raw(result)
    }
}

fn parse_height(height: &str) -> Result<u64, HttpNodeError> {
    height
        .parse()
        .map_err(|_| HttpNodeError::InvalidHeight(height.to_string()))
}

fn genesis_from_raw(raw: RawGenesis) -> Genesis {
    Genesis {
        genesis_time: raw.genesis_time,
        chain_id: raw.chain_id,
        app_hash: raw.app_hash,
        app_state: GenesisAppState {
            council_nodes: genesis_council_nodes_from_raw(raw.app_state.council_nodes),
            distribution: genesis_distribution_from_raw(raw.app_state.distribution),
        },
    }
}

fn genesis_council_nodes_from_raw(
    raw_nodes: HashMap<String, RawGenesisCouncilNode>,
) -> Vec<GenesisCouncilNode> {
    let mut nodes = raw_nodes
        .into_iter()
        .map(|(staking_account_address, raw_node)| {
            let RawGenesisCouncilNode(name, security_contact, pubkey) = raw_node;

            GenesisCouncilNode {
                staking_account_address,
                address: address_from_pubkey(&pubkey.value),
                name,
                security_contact,
                pubkey_type: pubkey.pubkey_type,
                pubkey: pubkey.value,
            }
        })
        .collect::<Vec<_>>();
    nodes.sort_by(|a, b| a.address.cmp(&b.address));

    nodes
}

fn genesis_distribution_from_raw(
    raw_distribution: HashMap<String, (String, String)>,
) -> Vec<GenesisDistribution> {
    let mut distribution = raw_distribution
        .into_iter()
        .map(
            |(staking_account_address, (distribution_type, amount))| match distribution_type
                .as_str()
            {
                GENESIS_DISTRIBUTION_TYPE_BONDED => GenesisDistribution {
                    staking_account_address,
                    bonded: Some(amount),
                    unbonded: None,
                },
                GENESIS_DISTRIBUTION_TYPE_UNBONDED => GenesisDistribution {
                    staking_account_address,
                    bonded: None,
                    unbonded: Some(amount),
                },
                other => {
                    panic!("error parsing genesis distribution type: unknown type {other}")
                }
            },
        )
        .collect::<Vec<_>>();
    distribution.sort_by(|a, b| {
        a.staking_account_address.cmp(&b.staking_account_address)
    });

    distribution
}

fn block_from_raw(raw: BlockResult) -> Result<Block, HttpNodeError> {
    let height = parse_height(&raw.block.header.height)?;

    // Non-voting slots carry no signature and are dropped.
    let signatures = raw
        .block
        .last_commit
        .signatures
        .unwrap_or_default()
        .into_iter()
        .filter_map(|signature| {
            signature.signature.map(|s| BlockSignature {
                validator_address: signature.validator_address,
                signature: s,
            })
        })
        .collect();

    Ok(Block {
        height,
        hash: raw.block_id.hash,
        time: raw.block.header.time,
        app_hash: raw.block.header.app_hash,
        proposer_address: raw.block.header.proposer_address,
        txs: raw.block.data.txs.unwrap_or_default(),
        signatures,
    })
}

fn block_results_from_raw(raw: RawBlockResults) -> Result<BlockResults, HttpNodeError> {
    let height = parse_height(&raw.height)?;

    let txs_events = raw
        .txs_results
        .unwrap_or_default()
        .into_iter()
        .map(|tx_result| events_from_raw(tx_result.events))
        .collect();

    let validator_updates = raw
        .validator_updates
        .unwrap_or_default()
        .into_iter()
        .map(|update| ValidatorUpdate {
            address: address_from_pubkey(&update.pub_key.data),
            pubkey_type: update.pub_key.pubkey_type,
            pubkey: update.pub_key.data,
            power: update.power,
        })
        .collect();

    Ok(BlockResults {
        height,
        txs_events,
        begin_block_events: events_from_raw(raw.begin_block_events.unwrap_or_default()),
        validator_updates,
    })
}

fn events_from_raw(raw_events: Vec<RawEvent>) -> Vec<Event> {
    raw_events
        .into_iter()
        .map(|event| Event {
            event_type: event.event_type,
            attributes: event
                .attributes
                .into_iter()
                .map(|attribute| EventAttribute {
                    key: attribute.key,
                    value: attribute.value,
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: T,
}

#[derive(Debug, Deserialize)]
struct GenesisResult {
    genesis: RawGenesis,
}

#[derive(Debug, Deserialize)]
struct RawGenesis {
    genesis_time: DateTime<Utc>,
    chain_id: String,
    app_hash: String,
    app_state: RawGenesisAppState,
}

#[derive(Debug, Deserialize)]
struct RawGenesisAppState {
    council_nodes: HashMap<String, RawGenesisCouncilNode>,
    distribution: HashMap<String, (String, String)>,
}

/// Raw council node tuple: name, security contact, consensus pubkey.
#[derive(Debug, Deserialize)]
struct RawGenesisCouncilNode(String, String, RawPubKey);

#[derive(Debug, Deserialize)]
struct RawPubKey {
    #[serde(rename = "type")]
    pubkey_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct BlockResult {
    block_id: RawBlockId,
    block: RawBlock,
}

#[derive(Debug, Deserialize)]
struct RawBlockId {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    header: RawBlockHeader,
    data: RawBlockData,
    last_commit: RawLastCommit,
}

#[derive(Debug, Deserialize)]
struct RawBlockHeader {
    height: String,
    time: DateTime<Utc>,
    app_hash: String,
    proposer_address: String,
}

#[derive(Debug, Deserialize)]
struct RawBlockData {
    txs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawLastCommit {
    signatures: Option<Vec<RawBlockSignature>>,
}

#[derive(Debug, Deserialize)]
struct RawBlockSignature {
    validator_address: String,
    signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBlockResults {
    height: String,
    txs_results: Option<Vec<RawTxResult>>,
    begin_block_events: Option<Vec<RawEvent>>,
    validator_updates: Option<Vec<RawValidatorUpdate>>,
}

#[derive(Debug, Deserialize)]
struct RawTxResult {
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,

    #[serde(default)]
    attributes: Vec<RawEventAttribute>,
}

#[derive(Debug, Deserialize)]
struct RawEventAttribute {
    key: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawValidatorUpdate {
    pub_key: RawValidatorPubKey,
    power: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValidatorPubKey {
    #[serde(rename = "type")]
    pubkey_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_genesis_response() {
        let response = indoc! {r#"
            {
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "genesis": {
                        "genesis_time": "2020-05-01T12:09:01.568951Z",
                        "chain_id": "testnet-thaler-crypto-com-chain-42",
                        "app_hash": "F62DDB49D7EB8ED0883C735A0FB7DE7F2A3FA38FCFCFC4B49B4BCB2DEF8A7BDC",
                        "app_state": {
                            "council_nodes": {
                                "0x6dbd5b8fe0dad494465aa7574defba711c184102": [
                                    "eastus_validator_1",
                                    "security@crypto.com",
                                    {
                                        "type": "tendermint/PubKeyEd25519",
                                        "value": "/SvfTeO4Du4oR/VYTjm7IgObc14zzddEAyFb4nU8E3Q="
                                    }
                                ]
                            },
                            "distribution": {
                                "0x4ae85b35597fcb61c6c47b1fe0bdd7eed8421cdd": ["Bonded", "6000000000000000000"],
                                "0x4b75f275dde0a8c8e70fb84243adc97a3afb78f2": ["UnbondedFromGenesis", "7946000000000000000"]
                            }
                        }
                    }
                }
            }
        "#};

        let envelope =
            serde_json::from_str::<JsonRpcResponse<GenesisResult>>(response).expect("valid JSON");
        let genesis = genesis_from_raw(envelope.result.genesis);

        assert_eq!(genesis.chain_id, "testnet-thaler-crypto-com-chain-42");
        assert_eq!(genesis.app_state.council_nodes.len(), 1);

        let council_node = &genesis.app_state.council_nodes[0];
        assert_eq!(
            council_node.staking_account_address,
            "0x6dbd5b8fe0dad494465aa7574defba711c184102"
        );
        assert_eq!(council_node.name, "eastus_validator_1");
        assert_eq!(council_node.address.len(), 40);

        assert_eq!(
            genesis.app_state.distribution,
            vec![
                GenesisDistribution {
                    staking_account_address: "0x4ae85b35597fcb61c6c47b1fe0bdd7eed8421cdd"
                        .to_string(),
                    bonded: Some("6000000000000000000".to_string()),
                    unbonded: None,
                },
                GenesisDistribution {
                    staking_account_address: "0x4b75f275dde0a8c8e70fb84243adc97a3afb78f2"
                        .to_string(),
                    bonded: None,
                    unbonded: Some("7946000000000000000".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_block_response() {
        let response = indoc! {r#"
            {
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "block_id": {
                        "hash": "E0A124DE3D02EB2D2F0EB6BB10BF8DE3F392D4D2B9CBCDFCF335A92B3D4B381C"
                    },
                    "block": {
                        "header": {
                            "chain_id": "testnet-thaler-crypto-com-chain-42",
                            "height": "32168",
                            "time": "2020-05-15T08:51:13.625387834Z",
                            "app_hash": "A95DD7DC03658F208E0CEDE8A6FD83E9F4A375DC6DE1A33D690B6DCE2F5C9E3C",
                            "proposer_address": "35DF153325BB6D7D1D5BCEC2E2F79D316CA47EF5"
                        },
                        "data": {
                            "txs": ["AAACqqq=", "AAACu7s="]
                        },
                        "last_commit": {
                            "signatures": [
                                {
                                    "block_id_flag": 2,
                                    "validator_address": "35DF153325BB6D7D1D5BCEC2E2F79D316CA47EF5",
                                    "timestamp": "2020-05-15T08:51:13.625387834Z",
                                    "signature": "t2X5GLRqYsY0pVQIp5MCPLpXnDnGEjkFXlyEL0uvBNkw9w=="
                                },
                                {
                                    "block_id_flag": 1,
                                    "validator_address": "",
                                    "timestamp": "0001-01-01T00:00:00Z",
                                    "signature": null
                                }
                            ]
                        }
                    }
                }
            }
        "#};

        let envelope =
            serde_json::from_str::<JsonRpcResponse<BlockResult>>(response).expect("valid JSON");
        let block = block_from_raw(envelope.result).expect("valid block");

        assert_eq!(block.height, 32_168);
        assert_eq!(
            block.hash,
            "E0A124DE3D02EB2D2F0EB6BB10BF8DE3F392D4D2B9CBCDFCF335A92B3D4B381C"
        );
        assert_eq!(block.time.timestamp_subsec_nanos(), 625_387_834);
        assert_eq!(block.txs.len(), 2);
        assert_eq!(block.signatures.len(), 1);
        assert_eq!(
            block.signatures[0].validator_address,
            "35DF153325BB6D7D1D5BCEC2E2F79D316CA47EF5"
        );
    }

    #[test]
    fn test_parse_block_results_response() {
        let response = indoc! {r#"
            {
                "jsonrpc": "2.0",
                "id": -1,
                "result": {
                    "height": "600",
                    "txs_results": null,
                    "begin_block_events": [
                        {
                            "type": "staking_change",
                            "attributes": [
                                {"key": "c3Rha2luZ19hZGRyZXNz", "value": "MHg2YzJiZTQ1ODQ2ZGU1NWQ5ZTdhNzdiYTg2YjE2NDlmNDkzZDczN2M0"}
                            ]
                        }
                    ],
                    "validator_updates": [
                        {
                            "pub_key": {
                                "type": "ed25519",
                                "data": "rXhu7xhqYBtJftVLKxvKN0XnpyOzxFnUEfAhD1dEF/I="
                            }
                        },
                        {
                            "pub_key": {
                                "type": "ed25519",
                                "data": "EIosObgfONUsnWCBGRpFlRFq5lSxjGIChRlVrVWVkcE="
                            },
                            "power": "60000000"
                        }
                    ]
                }
            }
        "#};

        let envelope = serde_json::from_str::<JsonRpcResponse<RawBlockResults>>(response)
            .expect("valid JSON");
        let block_results = block_results_from_raw(envelope.result).expect("valid block results");

        assert_eq!(block_results.height, 600);
        assert!(block_results.txs_events.is_empty());
        assert_eq!(block_results.begin_block_events.len(), 1);
        assert_eq!(
            block_results.begin_block_events[0].event_type,
            "staking_change"
        );

        assert_eq!(block_results.validator_updates.len(), 2);
        assert!(block_results.validator_updates[0].power.is_none());
        assert_eq!(
            block_results.validator_updates[1].power.as_deref(),
            Some("60000000")
        );
        assert_eq!(block_results.validator_updates[0].address.len(), 40);
    }

    #[test]
    fn test_parse_height_rejects_garbage() {
        assert!(parse_height("not-a-number").is_err());
        assert_eq!(parse_height("42").expect("valid height"), 42);
    }
}
