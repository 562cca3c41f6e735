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

pub mod node;
pub mod storage;

mod activity;
mod block;
mod block_data;
mod coin;
mod council_node;
mod height;
mod parser;
mod sliding_window;
mod staking_account;
mod transaction_decoder;

pub use activity::*;
pub use block::*;
pub use block_data::*;
pub use coin::*;
pub use council_node::*;
pub use height::*;
pub use parser::*;
pub use sliding_window::*;
pub use staking_account::*;
pub use transaction_decoder::*;
