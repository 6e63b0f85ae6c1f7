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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

/// How well the learner recalled a card. Exactly four levels: the ease
/// adjustment in `sm2` is calibrated for this scale.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Again, Quality::Hard, Quality::Good, Quality::Easy];

    /// Position on the 0..=3 ordinal scale.
    pub fn ordinal(self) -> u8 {
        match self {
            Quality::Again => 0,
            Quality::Hard => 1,
            Quality::Good => 2,
            Quality::Easy => 3,
        }
    }

    /// Parse the 0..=3 ordinal encoding.
    pub fn from_ordinal(value: u8) -> Result<Self, InvalidQuality> {
        match value {
            0 => Ok(Quality::Again),
            1 => Ok(Quality::Hard),
            2 => Ok(Quality::Good),
            3 => Ok(Quality::Easy),
            _ => Err(InvalidQuality::new(value.to_string())),
        }
    }

    /// Parse the 1/3/4/5 categorical encoding used by SM-2 style buttons.
    pub fn from_categorical(value: u8) -> Result<Self, InvalidQuality> {
        match value {
            1 => Ok(Quality::Again),
            3 => Ok(Quality::Hard),
            4 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            _ => Err(InvalidQuality::new(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Again => "again",
            Quality::Hard => "hard",
            Quality::Good => "good",
            Quality::Easy => "easy",
        }
    }

    /// A lapse keeps the card in short-interval learning.
    pub fn is_lapse(self) -> bool {
        self < Quality::Good
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Quality {
    type Err = InvalidQuality;

    /// Accepts the level names, or their first letter, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "a" => Ok(Quality::Again),
            "hard" | "h" => Ok(Quality::Hard),
            "good" | "g" => Ok(Quality::Good),
            "easy" | "e" => Ok(Quality::Easy),
            _ => Err(InvalidQuality::new(s.trim())),
        }
    }
}

impl ToSql for Quality {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Quality {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        string
            .parse::<Quality>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A rating outside the four quality levels. Raised at input boundaries;
/// ratings are never clamped into range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidQuality {
    input: String,
}

impl InvalidQuality {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl Display for InvalidQuality {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "invalid quality rating: {}", self.input)
    }
}

impl Error for InvalidQuality {}
