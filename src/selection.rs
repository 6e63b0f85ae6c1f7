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

use clap::Args;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;
use crate::types::word::Word;

/// Restricts a session to words with one of the given tags and one of the
/// given types. An empty list places no restriction.
#[derive(Args, Clone, PartialEq, Eq, Debug, Default)]
pub struct WordFilter {
    /// Only include words with this tag. Repeat to allow several tags.
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
    /// Only include words of this type, e.g. Noun or Verb. Repeat to allow several types.
    #[arg(long = "type", value_name = "TYPE")]
    pub kinds: Vec<String>,
}

impl WordFilter {
    pub fn matches(&self, word: &Word) -> bool {
        (self.tags.is_empty() || self.tags.contains(&word.tag))
            && (self.kinds.is_empty() || self.kinds.contains(&word.kind))
    }
}

/// The cards due at `now`, soonest first, ties broken by card id.
pub fn due_cards(all: &[CardState], now: Timestamp) -> Vec<CardState> {
    let mut due: Vec<CardState> = all.iter().filter(|c| c.is_due(now)).cloned().collect();
    due.sort_by(|a, b| {
        a.next_review_at
            .cmp(&b.next_review_at)
            .then_with(|| a.card_id.cmp(&b.card_id))
    });
    due
}

/// Shuffle presentation order in place (Fisher-Yates).
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// The generator for a session: fixed when a seed is configured.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
