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

use serde::Serialize;

use crate::types::card_id::CardId;
use crate::types::status::CardStatus;
use crate::types::timestamp::Timestamp;

/// The ease factor every card starts with.
pub const INITIAL_EASE: f64 = 2.5;

/// The floor of the ease factor.
pub const MIN_EASE: f64 = 1.3;

/// The review state of one word for one learner.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardState {
    pub card_id: CardId,
    /// SM-2 ease factor, never below `MIN_EASE`.
    pub ease_factor: f64,
    /// Days until the next review, as of the last review.
    pub interval_days: u32,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    pub next_review_at: Timestamp,
    /// `None` if the card has never been reviewed.
    pub last_review_at: Option<Timestamp>,
    pub status: CardStatus,
}

impl CardState {
    /// A card seen for the first time, due immediately.
    pub fn new(card_id: CardId, now: Timestamp) -> Self {
        Self {
            card_id,
            ease_factor: INITIAL_EASE,
            interval_days: 0,
            repetitions: 0,
            next_review_at: now,
            last_review_at: None,
            status: CardStatus::New,
        }
    }

    pub fn is_due(&self, now: Timestamp) -> bool {
        self.next_review_at <= now
    }
}

pub fn initialize(card_id: CardId, now: Timestamp) -> CardState {
    CardState::new(card_id, now)
}
