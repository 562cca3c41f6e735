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
    Activity, ActivityKind, Block, BlockData, BlockReward, BlockSignature, CouncilNode,
    CouncilNodeUpdate, CouncilNodeUpdateKind, DecodedCouncilNodeMeta, DepositActivity,
    GenesisActivity, JailEvent, NodeJoinActivity, PubKeyType, PunishmentKind, RewardEvent,
    SlashEvent, TransactionDecoder, TransactionType, TransferActivity, TransferInput,
    UnbondActivity, UnjailActivity, WithdrawActivity, address_from_pubkey, must_cro_to_coin,
    must_parse_bigint, node,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The genesis block is parsed from the genesis document, not from a normal block.
pub const GENESIS_BLOCK_HEIGHT: u64 = 1;

const EVENT_TYPE_VALID_TXS: &str = "valid_txs";
const EVENT_TYPE_STAKING_CHANGE: &str = "staking_change";
const EVENT_TYPE_REWARD: &str = "reward";

/// Convert the genesis document and the first block into [BlockData] at height 1: one `genesis`
/// activity per distribution entry, council node metadata attached where the staking address
/// also appears in the genesis council node list.
pub fn parse_genesis_block_data(genesis: node::Genesis, block: node::Block) -> BlockData {
    let activities = parse_genesis_activities(&genesis.app_state);

    BlockData {
        block: Block {
            height: GENESIS_BLOCK_HEIGHT,
            hash: block.hash,
            time: genesis.genesis_time,
            app_hash: genesis.app_hash,
        },
        signatures: Vec::new(),
        activities,
        reward: None,
        council_node_updates: Vec::new(),
    }
}

fn parse_genesis_activities(app_state: &node::GenesisAppState) -> Vec<Activity> {
    let council_nodes = app_state
        .council_nodes
        .iter()
        .map(|node| (node.staking_account_address.as_str(), node))
        .collect::<HashMap<_, _>>();

    app_state
        .distribution
        .iter()
        .map(|entry| {
            let council_node_meta =
                council_nodes
                    .get(entry.staking_account_address.as_str())
                    .map(|node| CouncilNode {
                        id: None,
                        name: node.name.clone(),
                        security_contact: (!node.security_contact.is_empty())
                            .then(|| node.security_contact.clone()),
                        pubkey_type: PubKeyType::Ed25519,
                        pubkey: node.pubkey.clone(),
                        address: node.address.clone(),
                        created_at_block_height: GENESIS_BLOCK_HEIGHT,
                        last_left_at_block_height: None,
                    });

            Activity {
                block_height: GENESIS_BLOCK_HEIGHT,
                kind: ActivityKind::Genesis(GenesisActivity {
                    staking_address: entry.staking_account_address.clone(),
                    bonded: entry.bonded.as_deref().map(must_parse_bigint),
                    unbonded: entry.unbonded.as_deref().map(must_parse_bigint),
                    council_node_meta,
                }),
            }
        })
        .collect()
}

/// Convert a raw block and its execution results into [BlockData]. Activities are ordered
/// transactions first (in payload order), begin-block events second (in position order).
pub fn parse_block_data(
    decoder: &impl TransactionDecoder,
    block: node::Block,
    block_results: node::BlockResults,
) -> BlockData {
    let signatures = parse_signatures(block.height, &block.proposer_address, &block.signatures);

    let mut activities =
        parse_transactions(decoder, block.height, &block_results.txs_events, &block.txs);

    let (event_activities, reward) =
        parse_begin_block_events(block.height, &block_results.begin_block_events);
    activities.extend(event_activities);

    let council_node_updates = parse_validator_updates(&block_results.validator_updates);

    BlockData {
        block: Block {
            height: block.height,
            hash: block.hash,
            time: block.time,
            app_hash: block.app_hash,
        },
        signatures,
        activities,
        reward,
        council_node_updates,
    }
}

fn parse_signatures(
    block_height: u64,
    proposer_address: &str,
    signatures: &[node::BlockSignature],
) -> Vec<BlockSignature> {
    signatures
        .iter()
        .map(|signature| BlockSignature {
            block_height,
            council_node_address: signature.validator_address.clone(),
            signature: signature.signature.clone(),
            is_proposer: signature.validator_address == proposer_address,
        })
        .collect()
}

fn parse_transactions(
    decoder: &impl TransactionDecoder,
    block_height: u64,
    txs_events: &[Vec<node::Event>],
    raw_txs: &[String],
) -> Vec<Activity> {
    txs_events
        .iter()
        .enumerate()
        .map(|(index, tx_events)| {
            let decoded = decoder
                .decode_base64(&raw_txs[index])
                .unwrap_or_else(|error| panic!("error decoding transaction payload: {error}"));

            let mut attributes = TxAttributes::default();
            for event in tx_events {
                match event.event_type.as_str() {
                    EVENT_TYPE_VALID_TXS => attributes.collect_valid_txs(event),
                    EVENT_TYPE_STAKING_CHANGE => attributes.collect_staking_change(event, block_height),
                    _ => {}
                }
            }

            let TxAttributes {
                tx_id,
                fee,
                staking_address,
                bonded,
                unbonded,
                unbonded_from,
                jailed_until: _,
                council_node_meta,
            } = attributes;

            let kind = match decoded.tx_type {
                TransactionType::Transfer => ActivityKind::Transfer(TransferActivity {
                    tx_id,
                    fee,
                    inputs: decoded
                        .inputs
                        .iter()
                        .map(|input| TransferInput {
                            tx_id: input.id.clone(),
                            index: input.index,
                        })
                        .collect(),
                    output_count: decoded
                        .output_count
                        .expect("transfer transaction without output count"),
                }),
                TransactionType::Deposit => ActivityKind::Deposit(DepositActivity {
                    tx_id,
                    fee,
                    staking_address: staking_address
                        .expect("deposit transaction without staking address"),
                    bonded: bonded.expect("deposit transaction without bonded amount"),
                }),
                TransactionType::Unbond => ActivityKind::Unbond(UnbondActivity {
                    tx_id,
                    fee,
                    staking_address: staking_address
                        .expect("unbond transaction without staking address"),
                    bonded: bonded.expect("unbond transaction without bonded amount"),
                    unbonded: unbonded.expect("unbond transaction without unbonded amount"),
                    unbonded_from,
                }),
                TransactionType::Withdraw => ActivityKind::Withdraw(WithdrawActivity {
                    tx_id,
                    fee,
                    staking_address: staking_address
                        .expect("withdraw transaction without staking address"),
                    unbonded: unbonded.expect("withdraw transaction without unbonded amount"),
                    output_count: decoded
                        .output_count
                        .expect("withdraw transaction without output count"),
                }),
                TransactionType::NodeJoin => ActivityKind::NodeJoin(NodeJoinActivity {
                    tx_id,
                    fee,
                    staking_address: staking_address
                        .expect("nodejoin transaction without staking address"),
                    council_node_meta: council_node_meta
                        .expect("nodejoin transaction without council node"),
                }),
                TransactionType::Unjail => ActivityKind::Unjail(UnjailActivity {
                    tx_id,
                    fee,
                    staking_address: staking_address
                        .expect("unjail transaction without staking address"),
                }),
            };

            Activity { block_height, kind }
        })
        .collect()
}

fn parse_begin_block_events(
    block_height: u64,
    events: &[node::Event],
) -> (Vec<Activity>, Option<BlockReward>) {
    let mut activities = Vec::new();
    let mut reward = None;

    for (position, event) in events.iter().enumerate() {
        match event.event_type.as_str() {
            EVENT_TYPE_REWARD => {
                for attribute in &event.attributes {
                    let key = decode_attribute(&attribute.key);
                    let value = decode_attribute(&attribute.value);

                    if key == "minted" {
                        // Some node versions wrap the minted amount in literal double quotes.
                        let minted = must_parse_bigint(value.trim_matches('"'));
                        reward = Some(BlockReward {
                            block_height,
                            minted,
                        });
                    }
                }
            }

            EVENT_TYPE_STAKING_CHANGE => {
                activities.push(parse_staking_change_event(block_height, position as u32, event));
            }

            _ => {}
        }
    }

    (activities, reward)
}

fn parse_staking_change_event(
    block_height: u64,
    event_position: u32,
    event: &node::Event,
) -> Activity {
    let mut optype = None;
    let mut punishment_kind = None;
    let mut attributes = TxAttributes::default();

    for attribute in &event.attributes {
        let key = decode_attribute(&attribute.key);
        let value = decode_attribute(&attribute.value);

        match key.as_str() {
            "staking_address" => attributes.staking_address = Some(value),
            "staking_optype" => optype = Some(value),
            "staking_opreason" => {
                punishment_kind = Some(PunishmentKind::from_str_strict(&value));
            }
            "staking_diff" => attributes.collect_staking_diff(&value, block_height),
            _ => {}
        }
    }

    let staking_address = attributes
        .staking_address
        .expect("staking_change event without staking address");

    let kind = match optype.as_deref() {
        Some("reward") => ActivityKind::Reward(RewardEvent {
            event_position,
            staking_address,
            bonded: attributes.bonded.expect("reward event without bonded diff"),
        }),
        Some("slash") => ActivityKind::Slash(SlashEvent {
            event_position,
            staking_address,
            bonded: attributes.bonded.expect("slash event without bonded diff"),
            unbonded: attributes
                .unbonded
                .expect("slash event without unbonded diff"),
            punishment_kind,
        }),
        Some("jail") => ActivityKind::Jail(JailEvent {
            event_position,
            staking_address,
            jailed_until: attributes
                .jailed_until
                .expect("jail event without JailedUntil diff"),
            punishment_kind,
        }),
        other => panic!("unsupported staking_optype {other:?}"),
    };

    Activity { block_height, kind }
}

fn parse_validator_updates(updates: &[node::ValidatorUpdate]) -> Vec<CouncilNodeUpdate> {
    updates
        .iter()
        .filter(|update| update.power.is_none())
        .map(|update| CouncilNodeUpdate {
            address: update.address.clone(),
            kind: CouncilNodeUpdateKind::Left,
        })
        .collect()
}

/// Scratch space for event attributes collected before the activity variant is known.
#[derive(Debug, Default)]
struct TxAttributes {
    tx_id: Option<String>,
    fee: Option<BigInt>,
    staking_address: Option<String>,
    bonded: Option<BigInt>,
    unbonded: Option<BigInt>,
    unbonded_from: Option<DateTime<Utc>>,
    jailed_until: Option<DateTime<Utc>>,
    council_node_meta: Option<CouncilNode>,
}

impl TxAttributes {
    fn collect_valid_txs(&mut self, event: &node::Event) {
        for attribute in &event.attributes {
            let key = decode_attribute(&attribute.key);
            let value = decode_attribute(&attribute.value);

            match key.as_str() {
                "txid" => self.tx_id = Some(value),
                "fee" => self.fee = Some(must_cro_to_coin(&value)),
                _ => {}
            }
        }
    }

    fn collect_staking_change(&mut self, event: &node::Event, block_height: u64) {
        for attribute in &event.attributes {
            let key = decode_attribute(&attribute.key);
            let value = decode_attribute(&attribute.value);

            match key.as_str() {
                "staking_address" => self.staking_address = Some(value),
                "staking_diff" => self.collect_staking_diff(&value, block_height),
                _ => {}
            }
        }
    }

    fn collect_staking_diff(&mut self, diff: &str, block_height: u64) {
        let entries = serde_json::from_str::<Vec<StakingDiffEntry>>(diff)
            .unwrap_or_else(|error| panic!("error deserializing staking_diff: {error}"));

        for StakingDiffEntry { key, value } in entries {
            match key.as_str() {
                "Bonded" => self.bonded = Some(diff_bigint(&key, &value)),
                "Unbonded" => self.unbonded = Some(diff_bigint(&key, &value)),
                "UnbondedFrom" => self.unbonded_from = Some(diff_timestamp(&key, &value)),
                "JailedUntil" => self.jailed_until = Some(diff_timestamp(&key, &value)),
                "CouncilNode" => {
                    let meta = serde_json::from_value::<DecodedCouncilNodeMeta>(value)
                        .unwrap_or_else(|error| {
                            panic!("error deserializing staking_diff council node: {error}")
                        });

                    self.council_node_meta = Some(CouncilNode {
                        id: None,
                        name: meta.name,
                        security_contact: meta.security_contact,
                        pubkey_type: PubKeyType::Ed25519,
                        address: address_from_pubkey(&meta.consensus_pubkey.value),
                        pubkey: meta.consensus_pubkey.value,
                        created_at_block_height: block_height,
                        last_left_at_block_height: None,
                    });
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StakingDiffEntry {
    key: String,
    value: Value,
}

fn diff_bigint(key: &str, value: &Value) -> BigInt {
    let value = value
        .as_str()
        .unwrap_or_else(|| panic!("staking_diff {key} value is not a string"));

    must_parse_bigint(value)
}

fn diff_timestamp(key: &str, value: &Value) -> DateTime<Utc> {
    let seconds = value
        .as_i64()
        .unwrap_or_else(|| panic!("staking_diff {key} value is not a unix timestamp"));

    DateTime::from_timestamp(seconds, 0)
        .unwrap_or_else(|| panic!("staking_diff {key} value is out of range"))
}

fn decode_attribute(attribute: &str) -> String {
    let decoded = STANDARD
        .decode(attribute)
        .unwrap_or_else(|error| panic!("error base64 decoding event attribute: {error}"));

    String::from_utf8(decoded)
        .unwrap_or_else(|error| panic!("error decoding event attribute as UTF-8: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityType, DecodedTransaction, DecodedTransactionInput};
    use assert_matches::assert_matches;
    use std::convert::Infallible;

    const TRANSFER_TX_ID: &str = "8AC4C7FF3F2F35B6B2E2E06D5D9D18D11AE2D9ED11ACEB8E3E9B4B4A2D6E8F90";

    #[derive(Clone)]
    struct MockDecoder;

    impl TransactionDecoder for MockDecoder {
        type Error = Infallible;

        fn decode_base64(&self, raw_tx: &str) -> Result<DecodedTransaction, Self::Error> {
            let tx_type = match raw_tx {
                "dHJhbnNmZXI=" => TransactionType::Transfer,
                "ZGVwb3NpdA==" => TransactionType::Deposit,
                "dW5ib25k" => TransactionType::Unbond,
                other => panic!("unexpected raw transaction {other}"),
            };

            Ok(DecodedTransaction {
                tx_type,
                inputs: match tx_type {
                    TransactionType::Transfer => vec![DecodedTransactionInput {
                        id: TRANSFER_TX_ID.to_lowercase(),
                        index: 1,
                    }],
                    _ => Vec::new(),
                },
                output_count: (tx_type == TransactionType::Transfer).then_some(2),
                staking_account_address: None,
                council_node_meta: None,
            })
        }
    }

    fn attribute(key: &str, value: &str) -> node::EventAttribute {
        node::EventAttribute {
            key: STANDARD.encode(key),
            value: STANDARD.encode(value),
        }
    }

    fn raw_block(height: u64, txs: Vec<String>) -> node::Block {
        node::Block {
            height,
            hash: format!("{height:064X}"),
            time: DateTime::from_timestamp(1_589_539_662, 0).expect("valid timestamp"),
            app_hash: "A5FF".repeat(16),
            proposer_address: "B0B0".repeat(10),
            txs,
            signatures: Vec::new(),
        }
    }

    fn empty_block_results(height: u64) -> node::BlockResults {
        node::BlockResults {
            height,
            txs_events: Vec::new(),
            begin_block_events: Vec::new(),
            validator_updates: Vec::new(),
        }
    }

    #[test]
    fn test_parse_genesis_block_data() {
        let council_addresses = ["0xaa", "0xbb", "0xcc"];
        let council_nodes = council_addresses
            .iter()
            .enumerate()
            .map(|(index, address)| node::GenesisCouncilNode {
                staking_account_address: address.to_string(),
                address: format!("{index:040X}"),
                name: format!("node-{index}"),
                security_contact: String::new(),
                pubkey_type: "tendermint/PubKeyEd25519".to_string(),
                pubkey: format!("pubkey-{index}"),
            })
            .collect();

        let distribution = (0..10)
            .map(|index| {
                let address = if index < 3 {
                    council_addresses[index].to_string()
                } else {
                    format!("0x{index:02x}")
                };

                node::GenesisDistribution {
                    staking_account_address: address,
                    bonded: (index % 2 == 0).then(|| "6000000000000000000".to_string()),
                    unbonded: (index % 2 == 1).then(|| "4000000000000000000".to_string()),
                }
            })
            .collect();

        let genesis = node::Genesis {
            genesis_time: DateTime::from_timestamp(1_587_000_000, 0).expect("valid timestamp"),
            chain_id: "test-chain-y3m1e6".to_string(),
            app_hash: "F3F3".repeat(16),
            app_state: node::GenesisAppState {
                council_nodes,
                distribution,
            },
        };

        let block_data = parse_genesis_block_data(genesis, raw_block(1, Vec::new()));

        assert_eq!(block_data.block.height, GENESIS_BLOCK_HEIGHT);
        assert_eq!(block_data.activities.len(), 10);
        assert!(block_data.reward.is_none());
        assert!(block_data.council_node_updates.is_empty());

        let with_council_node = block_data
            .activities
            .iter()
            .filter(|activity| {
                assert_eq!(activity.block_height, GENESIS_BLOCK_HEIGHT);
                let ActivityKind::Genesis(genesis) = &activity.kind else {
                    panic!("expected genesis activity");
                };
                assert!(genesis.bonded.is_some() ^ genesis.unbonded.is_some());

                genesis
                    .council_node_meta
                    .as_ref()
                    .map(|meta| {
                        assert_eq!(meta.created_at_block_height, GENESIS_BLOCK_HEIGHT);
                        assert_eq!(meta.security_contact, None);
                    })
                    .is_some()
            })
            .count();
        assert_eq!(with_council_node, 3);
    }

    #[test]
    fn test_parse_transfer_transactions() {
        let tx_events = vec![node::Event {
            event_type: EVENT_TYPE_VALID_TXS.to_string(),
            attributes: vec![
                attribute("fee", "0.00000469"),
                attribute("txid", TRANSFER_TX_ID),
            ],
        }];
        let block_results = node::BlockResults {
            txs_events: vec![tx_events.clone(), tx_events],
            ..empty_block_results(32_168)
        };
        let block = raw_block(
            32_168,
            vec!["dHJhbnNmZXI=".to_string(), "dHJhbnNmZXI=".to_string()],
        );

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        assert_eq!(block_data.activities.len(), 2);
        for activity in &block_data.activities {
            assert_matches!(&activity.kind, ActivityKind::Transfer(transfer) => {
                assert_eq!(transfer.fee, Some(BigInt::from(469)));
                assert_eq!(transfer.tx_id.as_deref(), Some(TRANSFER_TX_ID));
                assert_eq!(transfer.output_count, 2);
                assert_eq!(
                    transfer.inputs,
                    vec![TransferInput {
                        tx_id: TRANSFER_TX_ID.to_lowercase(),
                        index: 1,
                    }]
                );
            });
        }
    }

    #[test]
    fn test_parse_unbond_transaction() {
        let diff = r#"[
            {"key": "Bonded", "value": "-100000000145"},
            {"key": "Unbonded", "value": "100000000000"},
            {"key": "UnbondedFrom", "value": 1589539662}
        ]"#;
        let block_results = node::BlockResults {
            txs_events: vec![vec![node::Event {
                event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                attributes: vec![
                    attribute("staking_address", "0x4b75f275dde0a8c8e70fb84243adc97a3afb78f2"),
                    attribute("staking_diff", diff),
                ],
            }]],
            ..empty_block_results(32_702)
        };
        let block = raw_block(32_702, vec!["dW5ib25k".to_string()]);

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        assert_eq!(block_data.activities.len(), 1);
        assert_matches!(&block_data.activities[0].kind, ActivityKind::Unbond(unbond) => {
            assert_eq!(
                unbond.staking_address,
                "0x4b75f275dde0a8c8e70fb84243adc97a3afb78f2"
            );
            assert_eq!(unbond.bonded, BigInt::from(-100_000_000_145_i64));
            assert_eq!(unbond.unbonded, BigInt::from(100_000_000_000_i64));
            assert_eq!(
                unbond.unbonded_from,
                DateTime::from_timestamp(1_589_539_662, 0)
            );
        });
    }

    #[test]
    fn test_parse_slash_with_validator_kicks() {
        let diff = r#"[
            {"key": "Bonded", "value": "-600000000000000"},
            {"key": "Unbonded", "value": "-0"}
        ]"#;
        let block_results = node::BlockResults {
            begin_block_events: vec![node::Event {
                event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                attributes: vec![
                    attribute("staking_address", "0x6c2be45846de55d9e7a77ba86b1649f493d737c4"),
                    attribute("staking_optype", "slash"),
                    attribute("staking_opreason", "NonLive"),
                    attribute("staking_diff", diff),
                ],
            }],
            validator_updates: vec![
                node::ValidatorUpdate {
                    pubkey_type: "ed25519".to_string(),
                    pubkey: "kicked-1".to_string(),
                    address: "1111".repeat(10),
                    power: None,
                },
                node::ValidatorUpdate {
                    pubkey_type: "ed25519".to_string(),
                    pubkey: "kicked-2".to_string(),
                    address: "2222".repeat(10),
                    power: None,
                },
                node::ValidatorUpdate {
                    pubkey_type: "ed25519".to_string(),
                    pubkey: "staying".to_string(),
                    address: "3333".repeat(10),
                    power: Some("60000000".to_string()),
                },
            ],
            ..empty_block_results(600)
        };
        let block = raw_block(600, Vec::new());

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        assert_eq!(block_data.activities.len(), 1);
        assert_matches!(&block_data.activities[0].kind, ActivityKind::Slash(slash) => {
            assert_eq!(slash.event_position, 0);
            assert_eq!(slash.bonded, BigInt::from(-600_000_000_000_000_i64));
            assert_eq!(slash.unbonded, BigInt::from(0));
            assert_eq!(slash.punishment_kind, Some(PunishmentKind::NonLive));
        });

        assert_eq!(
            block_data.council_node_updates,
            vec![
                CouncilNodeUpdate {
                    address: "1111".repeat(10),
                    kind: CouncilNodeUpdateKind::Left,
                },
                CouncilNodeUpdate {
                    address: "2222".repeat(10),
                    kind: CouncilNodeUpdateKind::Left,
                },
            ]
        );
    }

    #[test]
    fn test_parse_slash_then_jail_keeps_positions() {
        let slash_diff = r#"[
            {"key": "Bonded", "value": "-66666666666"},
            {"key": "Unbonded", "value": "-0"}
        ]"#;
        let jail_diff = r#"[{"key": "JailedUntil", "value": 1588851025}]"#;
        let address = "0x95e2b2a09c8a80a6dee2c64e44b8d3c4e6a78f7b";

        let block_results = node::BlockResults {
            begin_block_events: vec![
                node::Event {
                    event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                    attributes: vec![
                        attribute("staking_address", address),
                        attribute("staking_optype", "slash"),
                        attribute("staking_opreason", "ByzantineFault"),
                        attribute("staking_diff", slash_diff),
                    ],
                },
                node::Event {
                    event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                    attributes: vec![
                        attribute("staking_address", address),
                        attribute("staking_optype", "jail"),
                        attribute("staking_opreason", "ByzantineFault"),
                        attribute("staking_diff", jail_diff),
                    ],
                },
            ],
            ..empty_block_results(3_510)
        };
        let block = raw_block(3_510, Vec::new());

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        assert_eq!(block_data.activities.len(), 2);
        assert_matches!(&block_data.activities[0].kind, ActivityKind::Slash(slash) => {
            assert_eq!(slash.event_position, 0);
            assert_eq!(slash.punishment_kind, Some(PunishmentKind::ByzantineFault));
        });
        assert_matches!(&block_data.activities[1].kind, ActivityKind::Jail(jail) => {
            assert_eq!(jail.event_position, 1);
            assert_eq!(jail.jailed_until, DateTime::from_timestamp(1_588_851_025, 0).expect("valid timestamp"));
            assert_eq!(jail.punishment_kind, Some(PunishmentKind::ByzantineFault));
        });
    }

    #[test]
    fn test_parse_reward_event_strips_quotes() {
        let block_results = node::BlockResults {
            begin_block_events: vec![node::Event {
                event_type: EVENT_TYPE_REWARD.to_string(),
                attributes: vec![attribute("minted", "\"145000000\"")],
            }],
            ..empty_block_results(2)
        };
        let block = raw_block(2, Vec::new());

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        assert!(block_data.activities.is_empty());
        assert_eq!(
            block_data.reward,
            Some(BlockReward {
                block_height: 2,
                minted: BigInt::from(145_000_000),
            })
        );
    }

    #[test]
    fn test_activities_are_ordered_transactions_first() {
        let deposit_diff = r#"[{"key": "Bonded", "value": "100000000"}]"#;
        let reward_diff = r#"[{"key": "Bonded", "value": "42"}]"#;
        let block_results = node::BlockResults {
            txs_events: vec![vec![node::Event {
                event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                attributes: vec![
                    attribute("staking_address", "0x01"),
                    attribute("staking_diff", deposit_diff),
                ],
            }]],
            begin_block_events: vec![node::Event {
                event_type: EVENT_TYPE_STAKING_CHANGE.to_string(),
                attributes: vec![
                    attribute("staking_address", "0x02"),
                    attribute("staking_optype", "reward"),
                    attribute("staking_diff", reward_diff),
                ],
            }],
            ..empty_block_results(77)
        };
        let block = raw_block(77, vec!["ZGVwb3NpdA==".to_string()]);

        let block_data = parse_block_data(&MockDecoder, block, block_results);

        let activity_types = block_data
            .activities
            .iter()
            .map(|activity| activity.kind.activity_type())
            .collect::<Vec<_>>();
        assert_eq!(
            activity_types,
            vec![ActivityType::Deposit, ActivityType::Reward]
        );
    }

    #[test]
    fn test_parse_signatures_marks_proposer() {
        let mut block = raw_block(5, Vec::new());
        block.signatures = vec![
            node::BlockSignature {
                validator_address: "AAAA".repeat(10),
                signature: "c2lnLTE=".to_string(),
            },
            node::BlockSignature {
                validator_address: block.proposer_address.clone(),
                signature: "c2lnLTI=".to_string(),
            },
        ];

        let block_data = parse_block_data(&MockDecoder, block, empty_block_results(5));

        assert_eq!(block_data.signatures.len(), 2);
        assert!(!block_data.signatures[0].is_proposer);
        assert!(block_data.signatures[1].is_proposer);
    }

    #[test]
    #[should_panic(expected = "loss in precision")]
    fn test_parse_inexact_fee_panics() {
        let block_results = node::BlockResults {
            txs_events: vec![vec![node::Event {
                event_type: EVENT_TYPE_VALID_TXS.to_string(),
                attributes: vec![attribute("fee", "0.000000001")],
            }]],
            ..empty_block_results(9)
        };
        let block = raw_block(9, vec!["dHJhbnNmZXI=".to_string()]);

        parse_block_data(&MockDecoder, block, block_results);
    }
}
