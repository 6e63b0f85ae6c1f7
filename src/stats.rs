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

use crate::types::card_state::CardState;
use crate::types::date::Date;
use crate::types::status::CardStatus;
use crate::types::timestamp::Timestamp;

/// Reviews per day the learner aims for, unless configured.
pub const DEFAULT_DAILY_GOAL: usize = 20;

/// Counts of cards by status.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    pub new: usize,
    pub learning: usize,
    /// Cards in review, due or not.
    pub review: usize,
    /// Cards in review that are due now.
    pub review_due: usize,
    pub mastered: usize,
    pub total: usize,
    /// Cards of any status that are due now.
    pub due: usize,
}

pub fn classify(all: &[CardState], now: Timestamp) -> StudyStats {
    let mut stats = StudyStats {
        total: all.len(),
        ..StudyStats::default()
    };
    for card in all {
        let due = card.is_due(now);
        match card.status {
            CardStatus::New => stats.new += 1,
            CardStatus::Learning => stats.learning += 1,
            CardStatus::Review => {
                stats.review += 1;
                if due {
                    stats.review_due += 1;
                }
            }
            CardStatus::Mastered => stats.mastered += 1,
        }
        if due {
            stats.due += 1;
        }
    }
    stats
}

/// Learner-wide bookkeeping across sessions.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_reviews: usize,
    /// Consecutive days with at least one review.
    pub streak: usize,
    pub last_study_date: Option<Date>,
    pub daily_goal: usize,
    /// Reviews done on `last_study_date`.
    pub daily_progress: usize,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct DailyProgress {
    pub current: usize,
    pub goal: usize,
    pub percentage: usize,
}

impl UserStats {
    pub fn new(daily_goal: usize) -> Self {
        Self {
            total_reviews: 0,
            streak: 0,
            last_study_date: None,
            daily_goal,
            daily_progress: 0,
        }
    }

    /// Account for one review done on `today`.
    pub fn record_review(&self, today: Date) -> UserStats {
        let mut next = self.clone();
        next.total_reviews += 1;
        if self.last_study_date == Some(today) {
            next.daily_progress += 1;
        } else {
            next.streak = match self.last_study_date {
                Some(last) if Some(last) == today.yesterday() => self.streak + 1,
                _ => 1,
            };
            next.daily_progress = 1;
            next.last_study_date = Some(today);
        }
        next
    }

    pub fn today_progress(&self, today: Date) -> DailyProgress {
        let current = if self.last_study_date == Some(today) {
            self.daily_progress
        } else {
            0
        };
        let percentage = if self.daily_goal == 0 {
            0
        } else {
            let pct = (current as f64 / self.daily_goal as f64 * 100.0).round() as usize;
            pct.min(100)
        };
        DailyProgress {
            current,
            goal: self.daily_goal,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm2::review;
    use crate::types::card_id::CardId;
    use crate::types::card_state::initialize;
    use crate::types::date::ymd;
    use crate::types::quality::Quality;
    use crate::types::timestamp::testing::at;

    fn collection() -> Vec<CardState> {
        let t0 = at(2025, 2, 1, 9, 0);
        let fresh = initialize(CardId::new("new"), t0);
        let lapsed = review(&initialize(CardId::new("lapsed"), t0), Quality::Again, t0);
        let review_due = review(&initialize(CardId::new("due"), t0), Quality::Good, t0);
        let review_later = review(&review_due, Quality::Good, t0.plus_days(1));
        let mut mastered = review_later.clone();
        for _ in 0..3 {
            mastered = review(&mastered, Quality::Easy, mastered.next_review_at);
        }
        vec![fresh, lapsed, review_due, review_later, mastered]
    }

    #[test]
    fn test_classify() {
        let now = at(2025, 2, 2, 10, 0);
        let stats = classify(&collection(), now);
        assert_eq!(
            stats,
            StudyStats {
                new: 1,
                learning: 1,
                review: 2,
                review_due: 1,
                mastered: 1,
                total: 5,
                due: 3,
            }
        );
    }

    #[test]
    fn test_classify_partitions() {
        let cards = collection();
        let stats = classify(&cards, at(2030, 1, 1, 0, 0));
        assert_eq!(
            stats.new + stats.learning + stats.review + stats.mastered,
            stats.total
        );
        assert_eq!(stats.review_due, stats.review);
    }

    #[test]
    fn test_classify_does_not_mutate() {
        let cards = collection();
        let copy = cards.clone();
        let _ = classify(&cards, at(2025, 2, 2, 10, 0));
        assert_eq!(cards, copy);
    }

    #[test]
    fn test_first_review_starts_streak() {
        let stats = UserStats::new(20).record_review(ymd(2025, 3, 10));
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.daily_progress, 1);
        assert_eq!(stats.last_study_date, Some(ymd(2025, 3, 10)));
    }

    #[test]
    fn test_same_day_counts_progress() {
        let stats = UserStats::new(20)
            .record_review(ymd(2025, 3, 10))
            .record_review(ymd(2025, 3, 10))
            .record_review(ymd(2025, 3, 10));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.daily_progress, 3);
        assert_eq!(stats.total_reviews, 3);
    }

    #[test]
    fn test_consecutive_days_extend_streak() {
        let stats = UserStats::new(20)
            .record_review(ymd(2025, 2, 28))
            .record_review(ymd(2025, 3, 1))
            .record_review(ymd(2025, 3, 2));
        assert_eq!(stats.streak, 3);
        assert_eq!(stats.daily_progress, 1);
    }

    #[test]
    fn test_gap_resets_streak() {
        let stats = UserStats::new(20)
            .record_review(ymd(2025, 3, 1))
            .record_review(ymd(2025, 3, 2))
            .record_review(ymd(2025, 3, 5));
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.total_reviews, 3);
    }

    #[test]
    fn test_today_progress() {
        let today = ymd(2025, 3, 10);
        let mut stats = UserStats::new(20);
        for _ in 0..5 {
            stats = stats.record_review(today);
        }
        assert_eq!(
            stats.today_progress(today),
            DailyProgress {
                current: 5,
                goal: 20,
                percentage: 25,
            }
        );
        assert_eq!(stats.today_progress(ymd(2025, 3, 11)).current, 0);
        for _ in 0..30 {
            stats = stats.record_review(today);
        }
        assert_eq!(stats.today_progress(today).percentage, 100);
        assert_eq!(UserStats::new(0).today_progress(today).percentage, 0);
    }
}
