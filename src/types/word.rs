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

use crate::types::card_id::CardId;

/// A vocabulary entry. Its card is keyed by the word and translation only,
/// so retagging a word keeps its review history.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub word: String,
    pub translation: String,
    /// Part of speech.
    pub kind: String,
    pub tag: String,
}

impl Word {
    pub fn card_id(&self) -> CardId {
        CardId::for_word(&self.word, &self.translation)
    }
}
