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

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, ToBigInt};
use std::str::FromStr;
use thiserror::Error;

/// Base units per CRO.
const MAX_COIN_DECIMALS: u64 = 100_000_000;

#[derive(Debug, Error)]
pub enum CoinError {
    #[error("cannot convert string {0} to big integer")]
    InvalidInteger(String),

    #[error("cannot convert string {0} to decimal")]
    InvalidDecimal(String),

    #[error("cannot convert {0} CRO to base units: loss in precision")]
    LossInPrecision(String),
}

/// Convert a decimal CRO amount into integer base units. The conversion must be exact; any
/// fractional remainder after scaling by 10^8 is rejected.
pub fn cro_to_coin(cro: &str) -> Result<BigInt, CoinError> {
    let cro_decimal =
        BigDecimal::from_str(cro).map_err(|_| CoinError::InvalidDecimal(cro.to_string()))?;

    let scaled = cro_decimal * BigDecimal::from(MAX_COIN_DECIMALS);
    if !scaled.is_integer() {
        return Err(CoinError::LossInPrecision(cro.to_string()));
    }

    scaled
        .to_bigint()
        .ok_or_else(|| CoinError::LossInPrecision(cro.to_string()))
}

/// Like [cro_to_coin], but panics. Used at parse time where an inexact amount means corrupt
/// upstream data.
pub fn must_cro_to_coin(cro: &str) -> BigInt {
    match cro_to_coin(cro) {
        Ok(coin) => coin,
        Err(error) => panic!("error converting CRO to base units: {error}"),
    }
}

/// Parse a decimal string, possibly negative, into a big integer.
pub fn parse_bigint(s: &str) -> Result<BigInt, CoinError> {
    BigInt::from_str(s).map_err(|_| CoinError::InvalidInteger(s.to_string()))
}

/// Like [parse_bigint], but panics on malformed input.
pub fn must_parse_bigint(s: &str) -> BigInt {
    match parse_bigint(s) {
        Ok(value) => value,
        Err(error) => panic!("error parsing big integer: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_cro_to_coin() {
        assert_eq!(cro_to_coin("0.00000469").expect("exact"), BigInt::from(469));
        assert_eq!(cro_to_coin("1").expect("exact"), BigInt::from(100_000_000));
        assert_eq!(
            cro_to_coin("12.5").expect("exact"),
            BigInt::from(1_250_000_000_u64)
        );
        assert_eq!(cro_to_coin("0").expect("exact"), BigInt::from(0));
    }

    #[test]
    fn test_cro_to_coin_rejects_inexact() {
        assert_matches!(
            cro_to_coin("0.000000001"),
            Err(CoinError::LossInPrecision(_))
        );
        assert_matches!(cro_to_coin("not-a-number"), Err(CoinError::InvalidDecimal(_)));
    }

    #[test]
    #[should_panic(expected = "loss in precision")]
    fn test_must_cro_to_coin_panics_on_inexact() {
        must_cro_to_coin("0.123456789");
    }

    #[test]
    fn test_parse_bigint() {
        assert_eq!(
            parse_bigint("-100000000145").expect("valid"),
            BigInt::from(-100_000_000_145_i64)
        );
        assert_eq!(parse_bigint("-0").expect("valid"), BigInt::from(0));
        assert_matches!(parse_bigint("12.3"), Err(CoinError::InvalidInteger(_)));
    }
}
