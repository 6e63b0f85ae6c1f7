// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! lexicards: a vocabulary flashcard drill with SM-2 spaced repetition.
//!
//! The scheduling core is pure: [`initialize`] creates a card, [`review`]
//! computes its state after a rating, [`due_cards`] selects what to study and
//! [`classify`] counts cards by status. Time is always passed in. Everything
//! else (vocabulary files, the SQLite store, the terminal drill) is built on
//! top of it.

pub mod cli;
pub mod cmd;
pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod selection;
pub mod sm2;
pub mod stats;
pub mod types;
pub mod vocabulary;

#[cfg(test)]
mod helper;

pub use error::{ErrorReport, Fallible, fail};
pub use selection::{due_cards, shuffle};
pub use sm2::review;
pub use stats::{StudyStats, classify};
pub use types::card_id::CardId;
pub use types::card_state::{CardState, initialize};
pub use types::quality::{InvalidQuality, Quality};
pub use types::status::CardStatus;
pub use types::timestamp::{Clock, SystemClock, Timestamp};
