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
    Activity, ActivityType, Block, BlockData, BlockReward, BlockSignature, CouncilNode,
    CouncilNodeUpdate, CouncilNodeUpdateKind, DepositActivity, GenesisActivity, JailEvent,
    NodeJoinActivity, PubKeyType, PunishmentKind, RewardEvent, SlashEvent, StakingAccount,
    TransferActivity, UnbondActivity, UnjailActivity, WithdrawActivity, storage::Storage,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use indexer_common::infra::pool::postgres::PostgresPool;
use indoc::indoc;
use num_bigint::{BigInt, ToBigInt};
use serde::Serialize;
use sqlx::{Postgres, Row, postgres::PgRow, types::Json};

type Tx = sqlx::Transaction<'static, Postgres>;

/// Postgres based implementation of [Storage].
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PostgresPool,
}

impl PostgresStorage {
    /// Create a new [PostgresStorage].
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }
}

impl Storage for PostgresStorage {
    async fn last_synced_height(&self) -> Result<u64, sqlx::Error> {
        let query = indoc! {"
            SELECT height
            FROM blocks
            ORDER BY height DESC
            LIMIT 1
        "};

        let height = sqlx::query_as::<_, (i64,)>(query)
            .fetch_optional(&*self.pool)
            .await?
            .map(|(height,)| height as u64)
            .unwrap_or_default();

        Ok(height)
    }

    async fn save_block_data(&self, block_data: &BlockData) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let committed_council_nodes = resolve_committed_council_nodes(
            &mut tx,
            block_data.block.height,
            &block_data.signatures,
        )
        .await?;

        insert_block(&mut tx, &block_data.block, &committed_council_nodes).await?;
        insert_block_committed_council_nodes(&mut tx, &committed_council_nodes).await?;

        for activity in &block_data.activities {
            apply_activity(&mut tx, activity).await?;
        }

        if let Some(reward) = &block_data.reward {
            insert_block_reward(&mut tx, reward).await?;
        }

        apply_council_node_updates(
            &mut tx,
            &block_data.council_node_updates,
            block_data.block.height,
        )
        .await?;

        tx.commit().await
    }
}

/// A signature resolved to its council node, as persisted both as a row and inside the block's
/// `committed_council_nodes` JSON.
#[derive(Debug, Clone, Serialize)]
struct CommittedCouncilNodeRow {
    #[serde(skip)]
    block_height: u64,
    id: u64,
    name: String,
    address: String,
    signature: String,
    is_proposer: bool,
}

/// Sort the proposer first, keeping the relative order of the remaining signatures.
fn proposer_first(signatures: &[BlockSignature]) -> Vec<BlockSignature> {
    let mut signatures = signatures.to_vec();
    signatures.sort_by_key(|signature| !signature.is_proposer);
    signatures
}

async fn resolve_committed_council_nodes(
    tx: &mut Tx,
    block_height: u64,
    signatures: &[BlockSignature],
) -> Result<Vec<CommittedCouncilNodeRow>, sqlx::Error> {
    let mut rows = Vec::with_capacity(signatures.len());

    for signature in proposer_first(signatures) {
        let (id, name) =
            find_latest_council_node_id_by_address(tx, &signature.council_node_address)
                .await?
                .unwrap_or_else(|| {
                    panic!(
                        "block signature references unknown council node at address {}",
                        signature.council_node_address
                    )
                });

        rows.push(CommittedCouncilNodeRow {
            block_height,
            id,
            name,
            address: signature.council_node_address,
            signature: signature.signature,
            is_proposer: signature.is_proposer,
        });
    }

    Ok(rows)
}

async fn insert_block(
    tx: &mut Tx,
    block: &Block,
    committed_council_nodes: &[CommittedCouncilNodeRow],
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO blocks (
            height,
            hash,
            time,
            app_hash,
            committed_council_nodes
        )
        VALUES ($1, $2, $3, $4, $5)
    "};

    let committed_council_nodes =
        (!committed_council_nodes.is_empty()).then(|| Json(committed_council_nodes));

    sqlx::query(query)
        .bind(block.height as i64)
        .bind(&block.hash)
        .bind(block.time)
        .bind(&block.app_hash)
        .bind(committed_council_nodes)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn insert_block_committed_council_nodes(
    tx: &mut Tx,
    rows: &[CommittedCouncilNodeRow],
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO block_committed_council_nodes (
            block_height,
            council_node_id,
            signature,
            is_proposer
        )
        VALUES ($1, $2, $3, $4)
    "};

    for row in rows {
        sqlx::query(query)
            .bind(row.block_height as i64)
            .bind(row.id as i64)
            .bind(&row.signature)
            .bind(row.is_proposer)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn insert_block_reward(tx: &mut Tx, reward: &BlockReward) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO block_rewards (
            block_height,
            minted
        )
        VALUES ($1, $2)
    "};

    sqlx::query(query)
        .bind(reward.block_height as i64)
        .bind(BigDecimal::from(reward.minted.clone()))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn apply_council_node_updates(
    tx: &mut Tx,
    updates: &[CouncilNodeUpdate],
    block_height: u64,
) -> Result<(), sqlx::Error> {
    for update in updates {
        let CouncilNodeUpdateKind::Left = update.kind;

        let (id, _) = find_latest_council_node_id_by_address(tx, &update.address)
            .await?
            .unwrap_or_else(|| {
                panic!(
                    "validator update references unknown council node at address {}",
                    update.address
                )
            });

        set_council_node_last_left(tx, id, block_height).await?;
        clear_staking_account_council_node(tx, id).await?;
    }

    Ok(())
}

async fn set_council_node_last_left(
    tx: &mut Tx,
    council_node_id: u64,
    block_height: u64,
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        UPDATE council_nodes
        SET last_left_at_block_height = $1
        WHERE id = $2
    "};

    let result = sqlx::query(query)
        .bind(block_height as i64)
        .bind(council_node_id as i64)
        .execute(&mut **tx)
        .await?;
    if result.rows_affected() != 1 {
        panic!("error setting council node last left at block height: no row updated");
    }

    Ok(())
}

async fn clear_staking_account_council_node(
    tx: &mut Tx,
    council_node_id: u64,
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        UPDATE staking_accounts
        SET current_council_node_id = NULL
        WHERE current_council_node_id = $1
    "};

    let result = sqlx::query(query)
        .bind(council_node_id as i64)
        .execute(&mut **tx)
        .await?;
    if result.rows_affected() != 1 {
        panic!("error removing council node id from staking account: no row updated");
    }

    Ok(())
}

async fn apply_activity(tx: &mut Tx, activity: &Activity) -> Result<(), sqlx::Error> {
    use crate::domain::ActivityKind::*;

    let block_height = activity.block_height;
    match &activity.kind {
        Genesis(genesis) => apply_genesis(tx, block_height, genesis).await,
        Transfer(transfer) => apply_transfer(tx, block_height, transfer).await,
        Deposit(deposit) => apply_deposit(tx, block_height, deposit).await,
        Unbond(unbond) => apply_unbond(tx, block_height, unbond).await,
        Withdraw(withdraw) => apply_withdraw(tx, block_height, withdraw).await,
        NodeJoin(nodejoin) => apply_nodejoin(tx, block_height, nodejoin).await,
        Unjail(unjail) => apply_unjail(tx, block_height, unjail).await,
        Reward(reward) => apply_reward(tx, block_height, reward).await,
        Slash(slash) => apply_slash(tx, block_height, slash).await,
        Jail(jail) => apply_jail(tx, block_height, jail).await,
    }
}

async fn apply_genesis(
    tx: &mut Tx,
    block_height: u64,
    genesis: &GenesisActivity,
) -> Result<(), sqlx::Error> {
    let council_node = match &genesis.council_node_meta {
        Some(meta) => {
            let id = insert_council_node(tx, meta).await?;
            Some(CouncilNode {
                id: Some(id),
                ..meta.clone()
            })
        }
        None => None,
    };

    let mut account = StakingAccount::new(
        genesis.staking_address.clone(),
        genesis.bonded.clone().unwrap_or_default(),
        genesis.unbonded.clone().unwrap_or_default(),
    );
    account.current_council_node_id = council_node.as_ref().and_then(|node| node.id);
    insert_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Genesis);
    row.staking_address = Some(genesis.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.bonded = genesis.bonded.clone();
    row.unbonded = genesis.unbonded.clone();
    row.joined_council_node = council_node;
    insert_activity(tx, row).await
}

async fn apply_transfer(
    tx: &mut Tx,
    block_height: u64,
    transfer: &TransferActivity,
) -> Result<(), sqlx::Error> {
    let mut row = ActivityRow::new(block_height, ActivityType::Transfer);
    row.tx_id = transfer.tx_id.clone();
    row.fee = transfer.fee.clone();
    row.inputs = (!transfer.inputs.is_empty()).then(|| transfer.inputs.clone());
    row.output_count = Some(transfer.output_count);
    insert_activity(tx, row).await?;

    let tx_id = transfer
        .tx_id
        .as_deref()
        .expect("transfer activity without transaction id");

    for input in &transfer.inputs {
        let query = indoc! {"
            UPDATE transaction_outputs
            SET spent_at_txid = $1
            WHERE txid = $2 AND index = $3
        "};

        let result = sqlx::query(query)
            .bind(tx_id)
            .bind(&input.tx_id)
            .bind(input.index as i32)
            .execute(&mut **tx)
            .await?;
        if result.rows_affected() != 1 {
            panic!("error updating spent transaction output: no row updated");
        }
    }

    insert_transaction_outputs(tx, tx_id, transfer.output_count).await
}

async fn apply_deposit(
    tx: &mut Tx,
    block_height: u64,
    deposit: &DepositActivity,
) -> Result<(), sqlx::Error> {
    let account = match find_staking_account(tx, &deposit.staking_address).await? {
        Some(mut account) => {
            // A deposit does not increment the nonce.
            account.add_bonded(&deposit.bonded);
            update_staking_account(tx, &account).await?;
            account
        }

        None => {
            let account = StakingAccount::new(
                deposit.staking_address.clone(),
                deposit.bonded.clone(),
                BigInt::default(),
            );
            insert_staking_account(tx, &account).await?;
            account
        }
    };

    let mut row = ActivityRow::new(block_height, ActivityType::Deposit);
    row.tx_id = deposit.tx_id.clone();
    row.fee = deposit.fee.clone();
    row.staking_address = Some(deposit.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.bonded = Some(deposit.bonded.clone());
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &deposit.staking_address).await?;
    insert_activity(tx, row).await
}

async fn apply_unbond(
    tx: &mut Tx,
    block_height: u64,
    unbond: &UnbondActivity,
) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &unbond.staking_address)
        .await?
        .expect("staking account of unbond activity does not exist");

    account.increment_nonce();
    account.add_bonded(&unbond.bonded);
    account.add_unbonded(&unbond.unbonded);
    if unbond.unbonded_from.is_some() {
        account.unbonded_from = unbond.unbonded_from;
    }
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Unbond);
    row.tx_id = unbond.tx_id.clone();
    row.fee = unbond.fee.clone();
    row.staking_address = Some(unbond.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.bonded = Some(unbond.bonded.clone());
    row.unbonded = Some(unbond.unbonded.clone());
    row.unbonded_from = unbond.unbonded_from;
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &unbond.staking_address).await?;
    insert_activity(tx, row).await
}

async fn apply_withdraw(
    tx: &mut Tx,
    block_height: u64,
    withdraw: &WithdrawActivity,
) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &withdraw.staking_address)
        .await?
        .expect("staking account of withdraw activity does not exist");

    account.increment_nonce();
    account.add_unbonded(&withdraw.unbonded);
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Withdraw);
    row.tx_id = withdraw.tx_id.clone();
    row.fee = withdraw.fee.clone();
    row.staking_address = Some(withdraw.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.unbonded = Some(withdraw.unbonded.clone());
    row.output_count = Some(withdraw.output_count);
    insert_activity(tx, row).await?;

    let tx_id = withdraw
        .tx_id
        .as_deref()
        .expect("withdraw activity without transaction id");

    insert_transaction_outputs(tx, tx_id, withdraw.output_count).await
}

async fn apply_nodejoin(
    tx: &mut Tx,
    block_height: u64,
    nodejoin: &NodeJoinActivity,
) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &nodejoin.staking_address)
        .await?
        .expect("staking account of nodejoin activity does not exist");

    let last_by_address =
        find_last_council_node_by_address(tx, &nodejoin.council_node_meta.address).await?;
    let last_by_account =
        find_last_council_node_by_staking_account(tx, &nodejoin.staking_address).await?;

    let council_node = if is_node_continuation(
        last_by_address.as_ref(),
        last_by_account.as_ref(),
        &nodejoin.council_node_meta.name,
    ) {
        let mut node = last_by_address.expect("checked above");
        clear_council_node_last_left(tx, node.id.expect("persisted council node has an id"))
            .await?;
        node.last_left_at_block_height = None;
        node
    } else {
        let id = insert_council_node(tx, &nodejoin.council_node_meta).await?;
        CouncilNode {
            id: Some(id),
            ..nodejoin.council_node_meta.clone()
        }
    };

    account.increment_nonce();
    account.current_council_node_id = council_node.id;
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::NodeJoin);
    row.tx_id = nodejoin.tx_id.clone();
    row.fee = nodejoin.fee.clone();
    row.staking_address = Some(nodejoin.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.joined_council_node = Some(council_node);
    insert_activity(tx, row).await
}

async fn apply_unjail(
    tx: &mut Tx,
    block_height: u64,
    unjail: &UnjailActivity,
) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &unjail.staking_address)
        .await?
        .expect("staking account of unjail activity does not exist");

    account.increment_nonce();
    account.unjail();
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Unjail);
    row.tx_id = unjail.tx_id.clone();
    row.fee = unjail.fee.clone();
    row.staking_address = Some(unjail.staking_address.clone());
    row.staking_account_nonce = Some(account.nonce);
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &unjail.staking_address).await?;
    insert_activity(tx, row).await
}

async fn apply_reward(
    tx: &mut Tx,
    block_height: u64,
    reward: &RewardEvent,
) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &reward.staking_address)
        .await?
        .expect("staking account of reward activity does not exist");

    account.add_bonded(&reward.bonded);
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Reward);
    row.event_position = Some(reward.event_position);
    row.staking_address = Some(reward.staking_address.clone());
    row.bonded = Some(reward.bonded.clone());
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &reward.staking_address).await?;
    insert_activity(tx, row).await
}

async fn apply_slash(tx: &mut Tx, block_height: u64, slash: &SlashEvent) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &slash.staking_address)
        .await?
        .expect("staking account of slash activity does not exist");

    account.add_bonded(&slash.bonded);
    account.add_unbonded(&slash.unbonded);
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Slash);
    row.event_position = Some(slash.event_position);
    row.staking_address = Some(slash.staking_address.clone());
    row.bonded = Some(slash.bonded.clone());
    row.unbonded = Some(slash.unbonded.clone());
    row.punishment_kind = slash.punishment_kind;
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &slash.staking_address).await?;
    insert_activity(tx, row).await
}

async fn apply_jail(tx: &mut Tx, block_height: u64, jail: &JailEvent) -> Result<(), sqlx::Error> {
    let mut account = find_staking_account(tx, &jail.staking_address)
        .await?
        .expect("staking account of jail activity does not exist");

    account.jail(jail.jailed_until, jail.punishment_kind);
    update_staking_account(tx, &account).await?;

    let mut row = ActivityRow::new(block_height, ActivityType::Jail);
    row.event_position = Some(jail.event_position);
    row.staking_address = Some(jail.staking_address.clone());
    row.jailed_until = Some(jail.jailed_until);
    row.punishment_kind = jail.punishment_kind;
    row.affected_council_node =
        find_current_council_node_by_staking_account(tx, &jail.staking_address).await?;
    insert_activity(tx, row).await
}

/// Whether a nodejoin continues the account's most recent council node: both lookups resolve to
/// the same row and the declared name matches it. In that case the existing row is re-activated
/// instead of inserting a new one.
fn is_node_continuation(
    last_by_address: Option<&CouncilNode>,
    last_by_account: Option<&CouncilNode>,
    declared_name: &str,
) -> bool {
    match (last_by_address, last_by_account) {
        (Some(by_address), Some(by_account)) => {
            by_address.id == by_account.id && by_address.name == declared_name
        }
        _ => false,
    }
}

async fn insert_transaction_outputs(
    tx: &mut Tx,
    tx_id: &str,
    output_count: u32,
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO transaction_outputs (
            txid,
            index
        )
        VALUES ($1, $2)
    "};

    for index in 0..output_count {
        sqlx::query(query)
            .bind(tx_id)
            .bind(index as i32)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

async fn find_staking_account(
    tx: &mut Tx,
    address: &str,
) -> Result<Option<StakingAccount>, sqlx::Error> {
    let query = indoc! {"
        SELECT nonce, bonded, unbonded, unbonded_from, punishment_kind, jailed_until, current_council_node_id
        FROM staking_accounts
        WHERE address = $1
    "};

    sqlx::query(query)
        .bind(address)
        .fetch_optional(&mut **tx)
        .await?
        .map(|row: PgRow| {
            Ok(StakingAccount {
                address: address.to_string(),
                nonce: row.try_get::<i64, _>("nonce")? as u64,
                bonded: numeric_to_bigint(row.try_get("bonded")?)?,
                unbonded: numeric_to_bigint(row.try_get("unbonded")?)?,
                unbonded_from: row.try_get("unbonded_from")?,
                punishment_kind: row
                    .try_get::<Option<String>, _>("punishment_kind")?
                    .as_deref()
                    .map(PunishmentKind::from_str_strict),
                jailed_until: row.try_get("jailed_until")?,
                current_council_node_id: row
                    .try_get::<Option<i64>, _>("current_council_node_id")?
                    .map(|id| id as u64),
            })
        })
        .transpose()
}

async fn insert_staking_account(tx: &mut Tx, account: &StakingAccount) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO staking_accounts (
            address,
            nonce,
            bonded,
            unbonded,
            unbonded_from,
            punishment_kind,
            jailed_until,
            current_council_node_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    "};

    sqlx::query(query)
        .bind(&account.address)
        .bind(account.nonce as i64)
        .bind(BigDecimal::from(account.bonded.clone()))
        .bind(BigDecimal::from(account.unbonded.clone()))
        .bind(account.unbonded_from)
        .bind(account.punishment_kind.map(|kind| kind.as_str()))
        .bind(account.jailed_until)
        .bind(account.current_council_node_id.map(|id| id as i64))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

async fn update_staking_account(tx: &mut Tx, account: &StakingAccount) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        UPDATE staking_accounts
        SET
            nonce = $1,
            bonded = $2,
            unbonded = $3,
            unbonded_from = $4,
            punishment_kind = $5,
            jailed_until = $6,
            current_council_node_id = $7
        WHERE address = $8
    "};

    let result = sqlx::query(query)
        .bind(account.nonce as i64)
        .bind(BigDecimal::from(account.bonded.clone()))
        .bind(BigDecimal::from(account.unbonded.clone()))
        .bind(account.unbonded_from)
        .bind(account.punishment_kind.map(|kind| kind.as_str()))
        .bind(account.jailed_until)
        .bind(account.current_council_node_id.map(|id| id as i64))
        .bind(&account.address)
        .execute(&mut **tx)
        .await?;
    if result.rows_affected() != 1 {
        panic!("error updating staking account: no row updated");
    }

    Ok(())
}

async fn insert_council_node(tx: &mut Tx, node: &CouncilNode) -> Result<u64, sqlx::Error> {
    let query = indoc! {"
        INSERT INTO council_nodes (
            name,
            security_contact,
            pubkey_type,
            pubkey,
            address,
            created_at_block_height,
            last_left_at_block_height
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
    "};

    let (id,) = sqlx::query_as::<_, (i64,)>(query)
        .bind(&node.name)
        .bind(&node.security_contact)
        .bind(pubkey_type_to_str(node.pubkey_type))
        .bind(&node.pubkey)
        .bind(&node.address)
        .bind(node.created_at_block_height as i64)
        .bind(node.last_left_at_block_height.map(|height| height as i64))
        .fetch_one(&mut **tx)
        .await?;

    Ok(id as u64)
}

async fn clear_council_node_last_left(
    tx: &mut Tx,
    council_node_id: u64,
) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        UPDATE council_nodes
        SET last_left_at_block_height = NULL
        WHERE id = $1
    "};

    let result = sqlx::query(query)
        .bind(council_node_id as i64)
        .execute(&mut **tx)
        .await?;
    if result.rows_affected() == 0 {
        panic!("error clearing council node last left at block height: no row updated");
    }

    Ok(())
}

async fn find_latest_council_node_id_by_address(
    tx: &mut Tx,
    address: &str,
) -> Result<Option<(u64, String)>, sqlx::Error> {
    let query = indoc! {"
        SELECT id, name
        FROM council_nodes
        WHERE address = $1
        ORDER BY id DESC
        LIMIT 1
    "};

    let row = sqlx::query_as::<_, (i64, String)>(query)
        .bind(address)
        .fetch_optional(&mut **tx)
        .await?
        .map(|(id, name)| (id as u64, name));

    Ok(row)
}

const COUNCIL_NODE_COLUMNS: &str = indoc! {"
    c.id,
    c.name,
    c.security_contact,
    c.pubkey_type,
    c.pubkey,
    c.address,
    c.created_at_block_height,
    c.last_left_at_block_height
"};

async fn find_last_council_node_by_address(
    tx: &mut Tx,
    address: &str,
) -> Result<Option<CouncilNode>, sqlx::Error> {
    let query = format!(
        indoc! {"
            SELECT {}
            FROM council_nodes c
            WHERE c.address = $1
            ORDER BY c.id DESC
            LIMIT 1
        "},
        COUNCIL_NODE_COLUMNS
    );

    sqlx::query(&query)
        .bind(address)
        .fetch_optional(&mut **tx)
        .await?
        .map(|row| council_node_from_row(&row))
        .transpose()
}

/// The council node most recently joined by the given staking account, via its `genesis` and
/// `nodejoin` activities.
async fn find_last_council_node_by_staking_account(
    tx: &mut Tx,
    staking_address: &str,
) -> Result<Option<CouncilNode>, sqlx::Error> {
    let query = format!(
        indoc! {"
            SELECT {}
            FROM council_nodes c
            JOIN activities a ON c.id = a.joined_council_node_id
            WHERE a.type IN ('genesis', 'nodejoin') AND a.staking_account_address = $1
            ORDER BY a.id DESC
            LIMIT 1
        "},
        COUNCIL_NODE_COLUMNS
    );

    sqlx::query(&query)
        .bind(staking_address)
        .fetch_optional(&mut **tx)
        .await?
        .map(|row| council_node_from_row(&row))
        .transpose()
}

async fn find_current_council_node_by_staking_account(
    tx: &mut Tx,
    staking_address: &str,
) -> Result<Option<CouncilNode>, sqlx::Error> {
    let query = format!(
        indoc! {"
            SELECT {}
            FROM council_nodes c
            JOIN staking_accounts sa ON c.id = sa.current_council_node_id
            WHERE c.last_left_at_block_height IS NULL AND sa.address = $1
        "},
        COUNCIL_NODE_COLUMNS
    );

    sqlx::query(&query)
        .bind(staking_address)
        .fetch_optional(&mut **tx)
        .await?
        .map(|row| council_node_from_row(&row))
        .transpose()
}

fn council_node_from_row(row: &PgRow) -> Result<CouncilNode, sqlx::Error> {
    Ok(CouncilNode {
        id: Some(row.try_get::<i64, _>("id")? as u64),
        name: row.try_get("name")?,
        security_contact: row.try_get("security_contact")?,
        pubkey_type: pubkey_type_from_str(&row.try_get::<String, _>("pubkey_type")?),
        pubkey: row.try_get("pubkey")?,
        address: row.try_get("address")?,
        created_at_block_height: row.try_get::<i64, _>("created_at_block_height")? as u64,
        last_left_at_block_height: row
            .try_get::<Option<i64>, _>("last_left_at_block_height")?
            .map(|height| height as u64),
    })
}

fn pubkey_type_to_str(pubkey_type: PubKeyType) -> &'static str {
    match pubkey_type {
        PubKeyType::Ed25519 => "ed25519",
    }
}

fn pubkey_type_from_str(pubkey_type: &str) -> PubKeyType {
    match pubkey_type {
        "ed25519" => PubKeyType::Ed25519,
        other => panic!("unsupported pubkey type {other}"),
    }
}

fn numeric_to_bigint(value: BigDecimal) -> Result<BigInt, sqlx::Error> {
    value
        .to_bigint()
        .ok_or_else(|| sqlx::Error::Decode("cannot convert numeric into big integer".into()))
}

/// The flattened shape of the `activities` table; nullable columns stay optional for
/// queryability by the read layer.
#[derive(Debug)]
struct ActivityRow {
    block_height: u64,
    activity_type: ActivityType,
    tx_id: Option<String>,
    event_position: Option<u32>,
    fee: Option<BigInt>,
    inputs: Option<Vec<crate::domain::TransferInput>>,
    output_count: Option<u32>,
    staking_address: Option<String>,
    staking_account_nonce: Option<u64>,
    bonded: Option<BigInt>,
    unbonded: Option<BigInt>,
    unbonded_from: Option<DateTime<Utc>>,
    joined_council_node: Option<CouncilNode>,
    affected_council_node: Option<CouncilNode>,
    jailed_until: Option<DateTime<Utc>>,
    punishment_kind: Option<PunishmentKind>,
}

impl ActivityRow {
    fn new(block_height: u64, activity_type: ActivityType) -> Self {
        Self {
            block_height,
            activity_type,
            tx_id: None,
            event_position: None,
            fee: None,
            inputs: None,
            output_count: None,
            staking_address: None,
            staking_account_nonce: None,
            bonded: None,
            unbonded: None,
            unbonded_from: None,
            joined_council_node: None,
            affected_council_node: None,
            jailed_until: None,
            punishment_kind: None,
        }
    }
}

async fn insert_activity(tx: &mut Tx, row: ActivityRow) -> Result<(), sqlx::Error> {
    let query = indoc! {"
        INSERT INTO activities (
            block_height,
            type,
            txid,
            event_position,
            fee,
            inputs,
            output_count,
            staking_account_address,
            staking_account_nonce,
            bonded,
            unbonded,
            unbonded_from,
            joined_council_node,
            joined_council_node_id,
            affected_council_node,
            affected_council_node_id,
            jailed_until,
            punishment_kind
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
    "};

    let joined_council_node_id = row
        .joined_council_node
        .as_ref()
        .and_then(|node| node.id)
        .map(|id| id as i64);
    let affected_council_node_id = row
        .affected_council_node
        .as_ref()
        .and_then(|node| node.id)
        .map(|id| id as i64);

    sqlx::query(query)
        .bind(row.block_height as i64)
        .bind(row.activity_type.as_str())
        .bind(row.tx_id)
        .bind(row.event_position.map(|position| position as i32))
        .bind(row.fee.map(BigDecimal::from))
        .bind(row.inputs.map(Json))
        .bind(row.output_count.map(|count| count as i32))
        .bind(row.staking_address)
        .bind(row.staking_account_nonce.map(|nonce| nonce as i64))
        .bind(row.bonded.map(BigDecimal::from))
        .bind(row.unbonded.map(BigDecimal::from))
        .bind(row.unbonded_from)
        .bind(row.joined_council_node.map(Json))
        .bind(joined_council_node_id)
        .bind(row.affected_council_node.map(Json))
        .bind(affected_council_node_id)
        .bind(row.jailed_until)
        .bind(row.punishment_kind.map(|kind| kind.as_str()))
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(address: &str, is_proposer: bool) -> BlockSignature {
        BlockSignature {
            block_height: 5,
            council_node_address: address.to_string(),
            signature: "c2ln".to_string(),
            is_proposer,
        }
    }

    fn council_node(id: u64, name: &str) -> CouncilNode {
        CouncilNode {
            id: Some(id),
            name: name.to_string(),
            security_contact: None,
            pubkey_type: PubKeyType::Ed25519,
            pubkey: "cHVia2V5".to_string(),
            address: "ABCD".repeat(10),
            created_at_block_height: 1,
            last_left_at_block_height: None,
        }
    }

    #[test]
    fn test_proposer_first_keeps_relative_order() {
        let signatures = vec![
            signature("aa", false),
            signature("bb", false),
            signature("cc", true),
            signature("dd", false),
        ];

        let sorted = proposer_first(&signatures);

        let addresses = sorted
            .iter()
            .map(|signature| signature.council_node_address.as_str())
            .collect::<Vec<_>>();
        assert_eq!(addresses, vec!["cc", "aa", "bb", "dd"]);
    }

    #[test]
    fn test_is_node_continuation() {
        let node = council_node(7, "validator");

        assert!(is_node_continuation(
            Some(&node),
            Some(&node.clone()),
            "validator"
        ));

        // Different rows mean a fresh council node.
        assert!(!is_node_continuation(
            Some(&node),
            Some(&council_node(8, "validator")),
            "validator"
        ));

        // A different declared name means a fresh council node.
        assert!(!is_node_continuation(
            Some(&node),
            Some(&node.clone()),
            "renamed"
        ));

        assert!(!is_node_continuation(None, Some(&node.clone()), "validator"));
        assert!(!is_node_continuation(Some(&node), None, "validator"));
    }
}
