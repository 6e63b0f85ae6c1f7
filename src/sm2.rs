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

//! The SM-2 transition function.
//!
//! `Again` and `Hard` put the card back into short-interval learning: it is
//! retested ten minutes later. `Again` also resets the repetition count;
//! `Hard` keeps it. Neither touches the ease factor. `Good` and `Easy`
//! advance the card along the 1 day, 6 days, `interval * ease` schedule and
//! adjust the ease with the SM-2 formula.

use crate::types::card_state::CardState;
use crate::types::card_state::MIN_EASE;
use crate::types::quality::Quality;
use crate::types::status::CardStatus;
use crate::types::timestamp::Timestamp;

/// Delay before a lapsed card is shown again.
pub const RETEST_MINUTES: i64 = 10;

/// The shortest interval a successful review can produce.
const MIN_INTERVAL: u32 = 1;

/// The longest interval, roughly a century.
const MAX_INTERVAL: u32 = 36_500;

/// Compute a card's state after a review. The input is left untouched.
pub fn review(card: &CardState, quality: Quality, now: Timestamp) -> CardState {
    let mut next = card.clone();
    match quality {
        Quality::Again => {
            next.repetitions = 0;
            next.interval_days = 0;
            next.ease_factor = card.ease_factor.max(MIN_EASE);
            next.next_review_at = now.plus_minutes(RETEST_MINUTES);
        }
        Quality::Hard => {
            next.interval_days = 0;
            next.ease_factor = card.ease_factor.max(MIN_EASE);
            next.next_review_at = now.plus_minutes(RETEST_MINUTES);
        }
        Quality::Good | Quality::Easy => {
            next.repetitions = card.repetitions.saturating_add(1);
            next.ease_factor = new_ease(card.ease_factor, quality);
            next.interval_days =
                new_interval(next.repetitions, card.interval_days, next.ease_factor);
            next.next_review_at = now.plus_days(next.interval_days);
        }
    }
    next.last_review_at = Some(now);
    next.status = CardStatus::derive(next.repetitions, next.interval_days, next.last_review_at);
    next
}

/// EF' = EF + (0.1 - (3 - q) * (0.08 + (3 - q) * 0.02)), on the 0..=3 scale.
fn new_ease(ease: f64, quality: Quality) -> f64 {
    let d = f64::from(3 - quality.ordinal());
    (ease + (0.1 - d * (0.08 + d * 0.02))).max(MIN_EASE)
}

fn new_interval(repetitions: u32, interval_days: u32, ease: f64) -> u32 {
    let interval = match repetitions {
        1 => 1,
        2 => 6,
        _ => (f64::from(interval_days) * ease).round() as u32,
    };
    interval.clamp(MIN_INTERVAL, MAX_INTERVAL)
}

/// What each rating would do to the card.
pub fn preview(card: &CardState, now: Timestamp) -> [(Quality, CardState); 4] {
    Quality::ALL.map(|quality| (quality, review(card, quality, now)))
}

/// Render the delay between `now` and the card's next review compactly.
pub fn format_interval(card: &CardState, now: Timestamp) -> String {
    let delta = card.next_review_at.into_inner() - now.into_inner();
    let minutes = delta.num_minutes();
    if minutes < 60 {
        return format!("{}m", minutes.max(0));
    }
    let days = delta.num_days();
    if days < 1 {
        format!("{}h", delta.num_hours())
    } else if days < 7 {
        format!("{days}d")
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
