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

use crate::collection::Collection;
use crate::db::SessionRecord;
use crate::error::Fallible;
use crate::stats::UserStats;
use crate::types::card_state::CardState;
use crate::types::timestamp::Timestamp;
use crate::types::word::Word;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory, Timestamp::now())?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    cards: Vec<CardExport>,
    sessions: Vec<SessionRecord>,
    learner: UserStats,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    word: Word,
    state: CardState,
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let words = coll.word_index();
    let cards: Vec<CardExport> = coll
        .cards
        .iter()
        .filter_map(|state| {
            words.get(&state.card_id).map(|word| CardExport {
                word: word.clone(),
                state: state.clone(),
            })
        })
        .collect();
    Ok(Export {
        cards,
        sessions: coll.db.sessions()?,
        learner: coll.db.load_stats(coll.config.daily_goal)?,
    })
}
