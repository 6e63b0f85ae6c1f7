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

use std::fs::copy;
use std::path::PathBuf;

use tempfile::TempDir;
use tempfile::tempdir;

use crate::collection::DATABASE_FILE;
use crate::error::Fallible;

/// Copy the fixture collection under `./test` into a fresh temporary
/// directory, leaving out any database. The directory is removed when the
/// returned handle is dropped.
pub fn create_tmp_copy_of_test_directory() -> Fallible<TempDir> {
    let source: PathBuf = PathBuf::from("./test").canonicalize()?;
    let target: TempDir = tempdir()?;
    for entry in source.read_dir()? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(file_name) = path.file_name() {
                if file_name != DATABASE_FILE {
                    copy(&path, target.path().join(file_name))?;
                }
            }
        }
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tmp_copy_of_test_directory() -> Fallible<()> {
        let dir = create_tmp_copy_of_test_directory()?;
        assert!(dir.path().join("basic-words.csv").exists());
        assert!(dir.path().join("config.toml").exists());
        assert!(!dir.path().join(DATABASE_FILE).exists());
        Ok(())
    }
}
