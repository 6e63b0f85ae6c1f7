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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// Repetitions at which a card counts as mastered.
pub const MASTERED_REPETITIONS: u32 = 5;

/// Where a card stands in the learning process. Always derived from the
/// numeric review state, never stored.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    New,
    Learning,
    Review,
    Mastered,
}

impl CardStatus {
    pub fn derive(
        repetitions: u32,
        interval_days: u32,
        last_review_at: Option<Timestamp>,
    ) -> CardStatus {
        if last_review_at.is_none() {
            CardStatus::New
        } else if interval_days == 0 {
            // A short re-test is pending.
            CardStatus::Learning
        } else {
            CardStatus::from_repetitions(repetitions)
        }
    }

    pub fn from_repetitions(repetitions: u32) -> CardStatus {
        if repetitions >= MASTERED_REPETITIONS {
            CardStatus::Mastered
        } else if repetitions >= 1 {
            CardStatus::Review
        } else {
            CardStatus::Learning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::New => "new",
            CardStatus::Learning => "learning",
            CardStatus::Review => "review",
            CardStatus::Mastered => "mastered",
        }
    }
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
