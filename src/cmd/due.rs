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

use std::io::Write;
use std::io::stdout;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::selection::WordFilter;
use crate::selection::due_cards;
use crate::types::timestamp::Timestamp;

/// List the cards due now, in scheduling order.
pub fn list_due(directory: Option<String>, filter: WordFilter) -> Fallible<()> {
    let now = Timestamp::now();
    let coll = Collection::new(directory, now)?;
    write_due(&coll, &filter, now, &mut stdout().lock())
}

fn write_due<W: Write>(
    coll: &Collection,
    filter: &WordFilter,
    now: Timestamp,
    out: &mut W,
) -> Fallible<()> {
    let words = coll.word_index();
    for card in due_cards(&coll.filtered_cards(filter), now) {
        if let Some(word) = words.get(&card.card_id) {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                card.next_review_at, card.status, word.word, word.translation
            )?;
        }
    }
    Ok(())
}
