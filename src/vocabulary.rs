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
use std::fs::read_to_string;
use std::path::Path;

use csv::ReaderBuilder;
use csv::Trim;
use walkdir::WalkDir;

use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::word::Word;

const DEFAULT_KIND: &str = "Noun";
const DEFAULT_TAG: &str = "Imported";

/// Parse a vocabulary file: a header row, then `word,translation,type,tag`
/// rows. Fields are separated by commas, or by semicolons if the header
/// uses them. Rows without a word or translation are skipped.
pub fn parse_vocabulary(text: &str) -> Fallible<Vec<Word>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(text))
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut words = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let (word, translation) = (field(0), field(1));
        if word.is_empty() || translation.is_empty() {
            // Blank lines parse as a single empty field; only warn about
            // rows that had content.
            if record.iter().any(|f| !f.is_empty()) {
                log::warn!("Skipping incomplete vocabulary row {}.", idx + 2);
            }
            continue;
        }
        let kind = Some(field(2))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_KIND.to_string());
        let tag = Some(field(3))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG.to_string());
        words.push(Word {
            word,
            translation,
            kind,
            tag,
        });
    }
    Ok(words)
}

fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Load every `.csv` file under `directory`, in path order. Repeated
/// word/translation pairs keep their first occurrence.
pub fn load_vocabulary(directory: &Path) -> Fallible<Vec<Word>> {
    let mut words = Vec::new();
    let mut seen: HashSet<CardId> = HashSet::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            let text = read_to_string(path)?;
            let parsed = parse_vocabulary(&text)?;
            log::debug!("Loaded {} words from {}.", parsed.len(), path.display());
            for word in parsed {
                if seen.insert(word.card_id()) {
                    words.push(word);
                } else {
                    log::debug!("Ignoring duplicate word: {}", word.word);
                }
            }
        }
    }
    Ok(words)
}
