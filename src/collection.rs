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

use std::collections::HashMap;
use std::collections::HashSet;
use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::db::Database;
use crate::db::Store;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::selection::WordFilter;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::card_state::initialize;
use crate::types::timestamp::Timestamp;
use crate::types::word::Word;
use crate::vocabulary::load_vocabulary;

pub const DATABASE_FILE: &str = "lexicards.db";

/// A directory of vocabulary files together with its review database.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
    /// Vocabulary, in file order.
    pub words: Vec<Word>,
    /// The state of every card whose word is in the vocabulary.
    pub cards: Vec<CardState>,
}

impl Collection {
    /// Open a collection. Words seen for the first time get a fresh card,
    /// due at `now`, which is stored right away.
    pub fn new(directory: Option<String>, now: Timestamp) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let config = Config::load(&directory)?;

        let db_path: PathBuf = directory.join(DATABASE_FILE);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let mut db: Database = Database::new(db_path)?;

        let words = {
            log::debug!("Loading vocabulary...");
            let start = Instant::now();
            let words = load_vocabulary(&directory)?;
            let duration = start.elapsed().as_millis();
            log::debug!("Loaded {} words in {duration}ms.", words.len());
            words
        };

        let stored: Vec<CardState> = db.load()?;
        let cards = sync_cards(&words, stored, now);
        let known: HashSet<CardId> = db.card_ids()?;
        let fresh: Vec<CardState> = cards
            .iter()
            .filter(|card| !known.contains(&card.card_id))
            .cloned()
            .collect();
        if !fresh.is_empty() {
            log::debug!("Adding {} new cards.", fresh.len());
            db.save(&fresh)?;
        }

        Ok(Self {
            directory,
            config,
            db,
            words,
            cards,
        })
    }

    /// Look up words by card id.
    pub fn word_index(&self) -> HashMap<CardId, Word> {
        self.words
            .iter()
            .map(|w| (w.card_id(), w.clone()))
            .collect()
    }

    /// The cards whose word passes `filter`.
    pub fn filtered_cards(&self, filter: &WordFilter) -> Vec<CardState> {
        let words = self.word_index();
        self.cards
            .iter()
            .filter(|card| words.get(&card.card_id).is_some_and(|w| filter.matches(w)))
            .cloned()
            .collect()
    }
}

/// Pair each word with its stored card, initializing the missing ones.
/// Stored cards whose word is gone are left out, but not deleted.
fn sync_cards(words: &[Word], stored: Vec<CardState>, now: Timestamp) -> Vec<CardState> {
    let mut stored: HashMap<CardId, CardState> = stored
        .into_iter()
        .map(|card| (card.card_id.clone(), card))
        .collect();
    let cards: Vec<CardState> = words
        .iter()
        .map(|word| {
            let id = word.card_id();
            stored
                .remove(&id)
                .unwrap_or_else(|| initialize(id, now))
        })
        .collect();
    if !stored.is_empty() {
        log::debug!("{} stored cards have no matching word.", stored.len());
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;
    use crate::sm2::review;
    use crate::types::quality::Quality;
    use crate::types::status::CardStatus;
    use crate::types::timestamp::testing::at;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()), Timestamp::now());
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_open_initializes_cards() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let now = at(2025, 8, 1, 9, 0);
        let coll = Collection::new(Some(dir.path().display().to_string()), now)?;
        assert_eq!(coll.words.len(), 6);
        assert_eq!(coll.cards.len(), 6);
        assert!(coll.cards.iter().all(|c| c.status == CardStatus::New));
        assert!(coll.cards.iter().all(|c| c.next_review_at == now));
        assert_eq!(coll.config.daily_goal, 10);
        assert_eq!(coll.db.card_ids()?.len(), 6);
        Ok(())
    }

    #[test]
    fn test_reopen_keeps_progress() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let path = dir.path().display().to_string();
        let t0 = at(2025, 8, 1, 9, 0);
        let mut coll = Collection::new(Some(path.clone()), t0)?;
        let reviewed = review(&coll.cards[0], Quality::Good, t0);
        coll.db.save(&[reviewed.clone()])?;
        drop(coll);

        let coll = Collection::new(Some(path), t0.plus_days(1))?;
        assert_eq!(coll.cards[0], reviewed);
        // Unreviewed cards keep their original due time.
        assert_eq!(coll.cards[1].next_review_at, t0);
        Ok(())
    }

    #[test]
    fn test_filtered_cards() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let coll = Collection::new(Some(dir.path().display().to_string()), at(2025, 8, 1, 9, 0))?;
        let words = coll.word_index();
        let names = |filter: &WordFilter| -> Vec<String> {
            coll.filtered_cards(filter)
                .iter()
                .map(|c| words[&c.card_id].word.clone())
                .collect()
        };
        assert_eq!(names(&WordFilter::default()).len(), 6);
        let basic = WordFilter {
            tags: vec!["basic".to_string()],
            kinds: vec![],
        };
        assert_eq!(names(&basic), vec!["Haus", "Baum", "laufen"]);
        let verbs = WordFilter {
            tags: vec!["basic".to_string(), "intermediate".to_string()],
            kinds: vec!["Verb".to_string()],
        };
        assert_eq!(names(&verbs), vec!["laufen", "wiederholen"]);
        Ok(())
    }

    #[test]
    fn test_sync_cards() {
        let now = at(2025, 8, 1, 9, 0);
        let word = |w: &str, t: &str| Word {
            word: w.to_string(),
            translation: t.to_string(),
            kind: "Noun".to_string(),
            tag: "t".to_string(),
        };
        let words = vec![word("Haus", "house"), word("Baum", "tree")];
        let earlier = at(2025, 7, 1, 9, 0);
        let baum = review(&initialize(words[1].card_id(), earlier), Quality::Good, earlier);
        let orphan = initialize(CardId::new("orphan"), earlier);
        let cards = sync_cards(&words, vec![orphan, baum.clone()], now);
        assert_eq!(cards, vec![initialize(words[0].card_id(), now), baum]);
    }
}
