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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::stats::DEFAULT_DAILY_GOAL;

pub const CONFIG_FILE: &str = "config.toml";

/// Collection settings, read from `config.toml` in the collection directory.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reviews per day the learner aims for.
    pub daily_goal: usize,
    /// Whether to shuffle the due queue before a session.
    pub shuffle: bool,
    /// Fixes the shuffle order.
    pub seed: Option<u64>,
    /// Upper bound on never-reviewed cards introduced per session.
    pub new_cards_per_session: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            shuffle: true,
            seed: None,
            new_cards_per_session: None,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Fallible<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load the config of a collection, falling back to the defaults when the
    /// file is absent.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if path.exists() {
            log::debug!("Loading configuration from {}.", path.display());
            Self::parse(&read_to_string(path)?)
        } else {
            Ok(Self::default())
        }
    }
}
