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
use std::collections::VecDeque;
use std::io::BufRead;
use std::io::Write;
use std::io::stdin;
use std::io::stdout;

use rand::Rng;

use crate::collection::Collection;
use crate::db::ReviewRecord;
use crate::db::SessionId;
use crate::error::Fallible;
use crate::selection::WordFilter;
use crate::selection::due_cards;
use crate::selection::session_rng;
use crate::selection::shuffle;
use crate::sm2::format_interval;
use crate::sm2::preview;
use crate::sm2::review;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::quality::Quality;
use crate::types::status::CardStatus;
use crate::types::timestamp::Clock;
use crate::types::timestamp::SystemClock;
use crate::types::timestamp::Timestamp;
use crate::types::word::Word;

pub fn drill(
    directory: Option<String>,
    card_limit: Option<usize>,
    seed: Option<u64>,
    filter: WordFilter,
) -> Fallible<()> {
    let clock = SystemClock;
    let mut coll = Collection::new(directory, clock.now())?;
    let mut rng = session_rng(seed.or(coll.config.seed));
    let mut input = stdin().lock();
    let mut output = stdout().lock();
    let options = SessionOptions { card_limit, filter };
    run_session(&mut coll, &clock, &mut rng, &options, &mut input, &mut output)?;
    Ok(())
}

/// What to drill in a session.
#[derive(Default)]
pub struct SessionOptions {
    /// Maximum number of cards to start the session with.
    pub card_limit: Option<usize>,
    pub filter: WordFilter,
}

enum Answer {
    Rated(Quality),
    Quit,
}

/// Drill the due cards of a collection over a line-oriented terminal.
/// Each review is saved as soon as it is made. Returns the reviews.
pub fn run_session<C, R, I, O>(
    coll: &mut Collection,
    clock: &C,
    rng: &mut R,
    options: &SessionOptions,
    input: &mut I,
    output: &mut O,
) -> Fallible<Vec<ReviewRecord>>
where
    C: Clock,
    R: Rng + ?Sized,
    I: BufRead,
    O: Write,
{
    let started_at = clock.now();
    let mut queue: VecDeque<CardId> = initial_queue(coll, started_at, options, rng);
    if queue.is_empty() {
        writeln!(output, "No cards due.")?;
        return Ok(Vec::new());
    }
    log::debug!("Starting session with {} cards.", queue.len());

    let words: HashMap<CardId, Word> = coll.word_index();
    let mut stats = coll.db.load_stats(coll.config.daily_goal)?;
    let seen: HashSet<CardId> = queue.iter().cloned().collect();
    let mut session_id: Option<SessionId> = None;
    let mut reviews: Vec<ReviewRecord> = Vec::new();

    while let Some(card_id) = queue.pop_front() {
        let Some(idx) = coll.cards.iter().position(|c| c.card_id == card_id) else {
            continue;
        };
        let Some(word) = words.get(&card_id) else {
            continue;
        };
        let card = coll.cards[idx].clone();

        writeln!(output)?;
        writeln!(
            output,
            "{} ({}, {}) [{} left]",
            word.word,
            word.kind,
            word.tag,
            queue.len() + 1
        )?;
        write!(output, "Press Enter to reveal, q to quit. ")?;
        output.flush()?;
        match read_line(input)? {
            Some(line) if line != "q" => {}
            _ => break,
        }
        writeln!(output, "{}", word.translation)?;

        let now = clock.now();
        let choices: Vec<String> = preview(&card, now)
            .iter()
            .map(|(quality, next)| format!("{quality} ({})", format_interval(next, now)))
            .collect();
        writeln!(output, "{}", choices.join("  "))?;
        let quality = match read_answer(input, output)? {
            Answer::Rated(quality) => quality,
            Answer::Quit => break,
        };

        let next = review(&card, quality, now);
        log::debug!(
            "{} {} EF={:.2} I={}d reps={} due={}",
            card_id.short(),
            quality,
            next.ease_factor,
            next.interval_days,
            next.repetitions,
            next.next_review_at
        );
        let record = ReviewRecord::new(now, quality, &next);
        stats = stats.record_review(now.local_date());
        let id = match session_id {
            Some(id) => id,
            None => {
                let id = coll.db.begin_session(started_at)?;
                session_id = Some(id);
                id
            }
        };
        coll.db.record_review(id, &next, &record, &stats)?;
        reviews.push(record);
        coll.cards[idx] = next;

        // Cards from this session that have come due again go to the back.
        for due in due_cards(&coll.cards, clock.now()) {
            if seen.contains(&due.card_id) && !queue.contains(&due.card_id) {
                queue.push_back(due.card_id);
            }
        }
    }

    let Some(session_id) = session_id else {
        writeln!(output, "No cards reviewed.")?;
        return Ok(reviews);
    };

    let ended_at = clock.now();
    coll.db.end_session(session_id, ended_at)?;
    log::debug!("Session ended.");

    let progress = stats.today_progress(ended_at.local_date());
    writeln!(output)?;
    writeln!(output, "Reviewed {} cards.", reviews.len())?;
    writeln!(
        output,
        "Today: {}/{} ({}%). Streak: {} days.",
        progress.current, progress.goal, progress.percentage, stats.streak
    )?;
    Ok(reviews)
}

/// The due cards in presentation order, with the per-session caps applied.
fn initial_queue<R: Rng + ?Sized>(
    coll: &Collection,
    now: Timestamp,
    options: &SessionOptions,
    rng: &mut R,
) -> VecDeque<CardId> {
    let mut due: Vec<CardState> = due_cards(&coll.filtered_cards(&options.filter), now);
    if coll.config.shuffle {
        shuffle(&mut due, rng);
    }
    if let Some(cap) = coll.config.new_cards_per_session {
        let mut new_count = 0;
        due.retain(|card| {
            if card.status == CardStatus::New {
                new_count += 1;
                new_count <= cap
            } else {
                true
            }
        });
    }
    if let Some(limit) = options.card_limit {
        due.truncate(limit);
    }
    due.into_iter().map(|card| card.card_id).collect()
}

fn read_line<I: BufRead>(input: &mut I) -> Fallible<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn read_answer<I: BufRead, O: Write>(input: &mut I, output: &mut O) -> Fallible<Answer> {
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let line = match read_line(input)? {
            Some(line) => line,
            None => return Ok(Answer::Quit),
        };
        if line == "q" {
            return Ok(Answer::Quit);
        }
        match line.parse::<Quality>() {
            Ok(quality) => return Ok(Answer::Rated(quality)),
            Err(e) => writeln!(output, "{e}. Answer again, hard, good or easy.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::io::ErrorKind;

    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;
    use crate::types::timestamp::testing::ManualClock;
    use crate::types::timestamp::testing::at;

    fn open(dir: &tempfile::TempDir, now: Timestamp) -> Fallible<Collection> {
        Collection::new(Some(dir.path().display().to_string()), now)
    }

    fn run(
        coll: &mut Collection,
        clock: &ManualClock,
        card_limit: Option<usize>,
        script: &str,
    ) -> Fallible<(Vec<ReviewRecord>, String)> {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output: Vec<u8> = Vec::new();
        let mut rng = session_rng(Some(1));
        let options = SessionOptions {
            card_limit,
            ..SessionOptions::default()
        };
        let reviews = run_session(coll, clock, &mut rng, &options, &mut input, &mut output)?;
        Ok((reviews, String::from_utf8_lossy(&output).into_owned()))
    }

    #[test]
    fn test_session() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::fixed(t0);
        let script = "\ngood\n\nagain\n\nbogus\neasy\nq\n";
        let (reviews, output) = run(&mut coll, &clock, None, script)?;

        let qualities: Vec<Quality> = reviews.iter().map(|r| r.quality).collect();
        assert_eq!(qualities, vec![Quality::Good, Quality::Again, Quality::Easy]);
        assert!(output.contains("invalid quality rating: bogus"));
        assert!(output.contains("again (10m)  hard (10m)  good (1d)  easy (1d)"));
        assert!(output.contains("Reviewed 3 cards."));
        assert!(output.contains("Today: 3/10 (30%)."));

        // Everything is persisted.
        let coll = open(&dir, t0)?;
        let sessions = coll.db.sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].reviews, reviews);
        assert_eq!(coll.db.load_stats(10)?.total_reviews, 3);
        let due_now = due_cards(&coll.cards, t0);
        assert_eq!(due_now.len(), 3);
        Ok(())
    }

    #[test]
    fn test_lapsed_card_returns() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::ticking(t0, 11);
        let (reviews, _) = run(&mut coll, &clock, Some(1), "\nagain\n\ngood\n")?;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].card_id, reviews[1].card_id);
        assert_eq!(reviews[0].quality, Quality::Again);
        assert_eq!(reviews[1].quality, Quality::Good);
        assert_eq!(reviews[1].interval_days, 1);
        Ok(())
    }

    #[test]
    fn test_lapsed_card_not_yet_due_ends_session() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::fixed(t0);
        let (reviews, output) = run(&mut coll, &clock, Some(1), "\nagain\n")?;
        assert_eq!(reviews.len(), 1);
        assert!(output.contains("Reviewed 1 cards."));
        Ok(())
    }

    #[test]
    fn test_nothing_due() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::fixed(t0.plus_minutes(-1));
        let (reviews, output) = run(&mut coll, &clock, None, "")?;
        assert!(reviews.is_empty());
        assert_eq!(output, "No cards due.\n");
        Ok(())
    }

    #[test]
    fn test_quit_before_rating() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::fixed(t0);
        let (reviews, output) = run(&mut coll, &clock, None, "q\n")?;
        assert!(reviews.is_empty());
        assert!(output.contains("No cards reviewed."));
        assert!(coll.db.sessions()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_new_card_cap() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        coll.config.new_cards_per_session = Some(2);
        let mut rng = session_rng(Some(3));
        let queue = initial_queue(&coll, t0, &SessionOptions::default(), &mut rng);
        assert_eq!(queue.len(), 2);
        let options = SessionOptions {
            card_limit: Some(1),
            ..SessionOptions::default()
        };
        let queue = initial_queue(&coll, t0, &options, &mut rng);
        assert_eq!(queue.len(), 1);
        Ok(())
    }

    #[test]
    fn test_filtered_queue() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let coll = open(&dir, t0)?;
        let words = coll.word_index();
        let mut rng = session_rng(Some(5));
        let options = SessionOptions {
            card_limit: None,
            filter: WordFilter {
                tags: vec!["intermediate".to_string()],
                kinds: vec![],
            },
        };
        let queue = initial_queue(&coll, t0, &options, &mut rng);
        assert_eq!(queue.len(), 3);
        assert!(queue.iter().all(|id| words[id].tag == "intermediate"));

        let options = SessionOptions {
            card_limit: None,
            filter: WordFilter {
                tags: vec!["basic".to_string()],
                kinds: vec!["Verb".to_string()],
            },
        };
        let queue = initial_queue(&coll, t0, &options, &mut rng);
        let names: Vec<&str> = queue.iter().map(|id| words[id].word.as_str()).collect();
        assert_eq!(names, vec!["laufen"]);
        Ok(())
    }

    /// A terminal that goes away once the second card is shown.
    struct ClosingTerminal {
        written: String,
    }

    impl Write for ClosingTerminal {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.push_str(&String::from_utf8_lossy(buf));
            if self.written.matches("Press Enter").count() > 1 {
                return Err(std::io::Error::new(ErrorKind::BrokenPipe, "broken pipe"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reviews_survive_interrupted_session() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        let t0 = at(2025, 9, 1, 9, 0);
        let mut coll = open(&dir, t0)?;
        let clock = ManualClock::fixed(t0);
        let mut rng = session_rng(Some(1));
        let mut input = Cursor::new(b"\ngood\n\ngood\n".to_vec());
        let mut output = ClosingTerminal {
            written: String::new(),
        };
        let result = run_session(
            &mut coll,
            &clock,
            &mut rng,
            &SessionOptions::default(),
            &mut input,
            &mut output,
        );
        assert!(result.is_err());
        drop(coll);

        let coll = open(&dir, t0)?;
        let sessions = coll.db.sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].reviews.len(), 1);
        assert_eq!(sessions[0].reviews[0].quality, Quality::Good);
        let stats = coll.db.load_stats(10)?;
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.daily_progress, 1);
        let reviewed: Vec<&CardState> = coll
            .cards
            .iter()
            .filter(|c| c.last_review_at.is_some())
            .collect();
        assert_eq!(reviewed.len(), 1);
        assert_eq!(reviewed[0].card_id, sessions[0].reviews[0].card_id);
        assert_eq!(reviewed[0].interval_days, 1);
        Ok(())
    }
}
