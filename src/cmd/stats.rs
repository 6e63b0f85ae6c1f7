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
use std::io::Write;
use std::io::stdout;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::stats::DailyProgress;
use crate::stats::StudyStats;
use crate::stats::UserStats;
use crate::stats::classify;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    cards: StudyStats,
    learner: UserStats,
    today: DailyProgress,
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let now = Timestamp::now();
    let coll = Collection::new(directory, now)?;
    let stats = collect_stats(&coll, now)?;
    write_stats(&stats, format, &mut stdout().lock())
}

fn collect_stats(coll: &Collection, now: Timestamp) -> Fallible<Stats> {
    let learner = coll.db.load_stats(coll.config.daily_goal)?;
    let today = learner.today_progress(now.local_date());
    Ok(Stats {
        cards: classify(&coll.cards, now),
        learner,
        today,
    })
}

fn write_stats<W: Write>(stats: &Stats, format: StatsFormat, out: &mut W) -> Fallible<()> {
    match format {
        StatsFormat::Text => {
            let c = &stats.cards;
            writeln!(out, "Total:    {}", c.total)?;
            writeln!(out, "New:      {}", c.new)?;
            writeln!(out, "Learning: {}", c.learning)?;
            writeln!(out, "Review:   {} ({} due)", c.review, c.review_due)?;
            writeln!(out, "Mastered: {}", c.mastered)?;
            writeln!(out, "Due now:  {}", c.due)?;
            writeln!(
                out,
                "Today:    {}/{} ({}%)",
                stats.today.current, stats.today.goal, stats.today.percentage
            )?;
            writeln!(out, "Streak:   {} days", stats.learner.streak)?;
            writeln!(out, "Reviews:  {}", stats.learner.total_reviews)?;
        }
        StatsFormat::Json => {
            let json = serde_json::to_string_pretty(stats)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
