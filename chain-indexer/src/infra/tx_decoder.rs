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

use crate::domain::{DecodedTransaction, TransactionDecoder};
use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;

/// A [TransactionDecoder] for payloads produced by the chain's transaction codec, which emits
/// the typed JSON descriptor this indexer consumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransactionDecoder;

#[derive(Debug, Error)]
pub enum JsonTransactionDecoderError {
    #[error("error base64 decoding transaction payload")]
    Base64(#[from] base64::DecodeError),

    #[error("error deserializing decoded transaction")]
    Deserialize(#[from] serde_json::Error),
}

impl TransactionDecoder for JsonTransactionDecoder {
    type Error = JsonTransactionDecoderError;

    fn decode_base64(&self, raw_tx: &str) -> Result<DecodedTransaction, Self::Error> {
        let decoded = STANDARD.decode(raw_tx)?;
        Ok(serde_json::from_slice(&decoded)?)
    }
}
