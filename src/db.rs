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

use std::collections::HashSet;

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use serde::Serialize;

use crate::error::Fallible;
use crate::stats::UserStats;
use crate::types::card_id::CardId;
use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::quality::Quality;
use crate::types::status::CardStatus;
use crate::types::timestamp::Timestamp;

/// Durable storage for card states, keyed by card id.
pub trait Store {
    /// Every stored card.
    fn load(&self) -> Fallible<Vec<CardState>>;

    /// Insert or replace the given cards.
    fn save(&mut self, cards: &[CardState]) -> Fallible<()>;
}

pub struct Database {
    conn: Connection,
}

/// One review as logged in a session: the rating and the state it produced.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub card_id: CardId,
    pub reviewed_at: Timestamp,
    pub quality: Quality,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_review_at: Timestamp,
}

impl ReviewRecord {
    pub fn new(reviewed_at: Timestamp, quality: Quality, result: &CardState) -> Self {
        Self {
            card_id: result.card_id.clone(),
            reviewed_at,
            quality,
            ease_factor: result.ease_factor,
            interval_days: result.interval_days,
            repetitions: result.repetitions,
            next_review_at: result.next_review_at,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub reviews: Vec<ReviewRecord>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Return the set of all card ids in the database.
    pub fn card_ids(&self) -> Fallible<HashSet<CardId>> {
        let mut ids = HashSet::new();
        let mut stmt = self.conn.prepare("select card_id from cards;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id: CardId = row.get(0)?;
            ids.insert(id);
        }
        Ok(ids)
    }

    /// Load the learner's stats. `daily_goal` comes from the configuration
    /// and is not stored.
    pub fn load_stats(&self, daily_goal: usize) -> Fallible<UserStats> {
        let sql = "select total_reviews, streak, last_study_date, daily_progress from user_stats where id = 1;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => {
                let total_reviews: u32 = row.get(0)?;
                let streak: u32 = row.get(1)?;
                let last_study_date: Option<Date> = row.get(2)?;
                let daily_progress: u32 = row.get(3)?;
                Ok(UserStats {
                    total_reviews: total_reviews as usize,
                    streak: streak as usize,
                    last_study_date,
                    daily_goal,
                    daily_progress: daily_progress as usize,
                })
            }
            None => Ok(UserStats::new(daily_goal)),
        }
    }

    pub fn save_stats(&mut self, stats: &UserStats) -> Fallible<()> {
        upsert_stats(&self.conn, stats)
    }

    /// Open a study session. Its end time is its start time until
    /// `end_session` is called.
    pub fn begin_session(&mut self, started_at: Timestamp) -> Fallible<SessionId> {
        let tx = self.conn.transaction()?;
        let session_id = insert_session(&tx, started_at, started_at)?;
        tx.commit()?;
        Ok(session_id)
    }

    /// Store a single review: the card's new state, the review log entry
    /// and the learner's stats are committed together.
    pub fn record_review(
        &mut self,
        session_id: SessionId,
        card: &CardState,
        review: &ReviewRecord,
        stats: &UserStats,
    ) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        upsert_card(&tx, card)?;
        insert_review(&tx, session_id, review)?;
        upsert_stats(&tx, stats)?;
        tx.commit()?;
        Ok(())
    }

    pub fn end_session(&mut self, session_id: SessionId, ended_at: Timestamp) -> Fallible<()> {
        let sql = "update sessions set ended_at = ? where session_id = ?;";
        self.conn.execute(sql, (ended_at, session_id))?;
        Ok(())
    }

    /// All sessions, oldest first.
    pub fn sessions(&self) -> Fallible<Vec<SessionRecord>> {
        let mut sessions = Vec::new();
        let mut stmt = self
            .conn
            .prepare("select session_id, started_at, ended_at from sessions order by started_at;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let session_id: SessionId = row.get(0)?;
            sessions.push(SessionRecord {
                started_at: row.get(1)?,
                ended_at: row.get(2)?,
                reviews: self.session_reviews(session_id)?,
            });
        }
        Ok(sessions)
    }

    fn session_reviews(&self, session_id: SessionId) -> Fallible<Vec<ReviewRecord>> {
        let sql = "select card_id, reviewed_at, quality, ease_factor, interval_days, repetitions, next_review_at from reviews where session_id = ? order by review_id;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([session_id])?;
        let mut reviews = Vec::new();
        while let Some(row) = rows.next()? {
            reviews.push(ReviewRecord {
                card_id: row.get(0)?,
                reviewed_at: row.get(1)?,
                quality: row.get(2)?,
                ease_factor: row.get(3)?,
                interval_days: row.get(4)?,
                repetitions: row.get(5)?,
                next_review_at: row.get(6)?,
            });
        }
        Ok(reviews)
    }
}

impl Store for Database {
    fn load(&self) -> Fallible<Vec<CardState>> {
        let sql = "select card_id, ease_factor, interval_days, repetitions, next_review_at, last_review_at from cards order by card_id;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(card_from_row(row)?);
        }
        Ok(cards)
    }

    fn save(&mut self, cards: &[CardState]) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        for card in cards {
            upsert_card(&tx, card)?;
        }
        tx.commit()?;
        log::debug!("Saved {} cards.", cards.len());
        Ok(())
    }
}

fn card_from_row(row: &Row) -> Fallible<CardState> {
    let repetitions: u32 = row.get(3)?;
    let interval_days: u32 = row.get(2)?;
    let last_review_at: Option<Timestamp> = row.get(5)?;
    Ok(CardState {
        card_id: row.get(0)?,
        ease_factor: row.get(1)?,
        interval_days,
        repetitions,
        next_review_at: row.get(4)?,
        last_review_at,
        status: CardStatus::derive(repetitions, interval_days, last_review_at),
    })
}

fn upsert_card(tx: &Transaction, card: &CardState) -> Fallible<()> {
    let sql = "insert into cards (card_id, ease_factor, interval_days, repetitions, next_review_at, last_review_at) values (?, ?, ?, ?, ?, ?)
               on conflict (card_id) do update set
                   ease_factor = excluded.ease_factor,
                   interval_days = excluded.interval_days,
                   repetitions = excluded.repetitions,
                   next_review_at = excluded.next_review_at,
                   last_review_at = excluded.last_review_at;";
    tx.execute(
        sql,
        (
            &card.card_id,
            card.ease_factor,
            card.interval_days,
            card.repetitions,
            card.next_review_at,
            card.last_review_at,
        ),
    )?;
    Ok(())
}

pub type SessionId = i64;

fn upsert_stats(conn: &Connection, stats: &UserStats) -> Fallible<()> {
    let sql = "insert into user_stats (id, total_reviews, streak, last_study_date, daily_progress) values (1, ?, ?, ?, ?)
               on conflict (id) do update set
                   total_reviews = excluded.total_reviews,
                   streak = excluded.streak,
                   last_study_date = excluded.last_study_date,
                   daily_progress = excluded.daily_progress;";
    conn.execute(
        sql,
        (
            stats.total_reviews as i64,
            stats.streak as i64,
            stats.last_study_date,
            stats.daily_progress as i64,
        ),
    )?;
    Ok(())
}

fn insert_session(
    tx: &Transaction,
    started_at: Timestamp,
    ended_at: Timestamp,
) -> Fallible<SessionId> {
    let sql = "insert into sessions (started_at, ended_at) values (?, ?) returning session_id;";
    let session_id: SessionId = tx.query_row(sql, (started_at, ended_at), |row| row.get(0))?;
    Ok(session_id)
}

fn insert_review(tx: &Transaction, session_id: SessionId, review: &ReviewRecord) -> Fallible<()> {
    let sql = "insert into reviews (session_id, card_id, reviewed_at, quality, ease_factor, interval_days, repetitions, next_review_at) values (?, ?, ?, ?, ?, ?, ?, ?);";
    tx.execute(
        sql,
        (
            session_id,
            &review.card_id,
            review.reviewed_at,
            review.quality,
            review.ease_factor,
            review.interval_days,
            review.repetitions,
            review.next_review_at,
        ),
    )?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
