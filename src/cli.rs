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

use clap::Parser;

use crate::cmd::check::check_collection;
use crate::cmd::drill::drill;
use crate::cmd::due::list_due;
use crate::cmd::export::export_collection;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::error::fail;
use crate::selection::WordFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill the cards due now.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Maximum number of cards to drill in a session. By default, all cards due now are drilled.
        #[arg(long)]
        card_limit: Option<usize>,
        /// Seed for the shuffle order. Overrides the configured seed.
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        filter: WordFilter,
    },
    /// List the cards due now.
    Due {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[command(flatten)]
        filter: WordFilter,
    },
    /// Print collection statistics.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Check the integrity of a collection.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Export the collection as JSON.
    Export {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            card_limit,
            seed,
            filter,
        } => {
            if card_limit == Some(0) {
                return fail("card limit must be greater than zero.");
            }
            drill(directory, card_limit, seed, filter)
        }
        Command::Due { directory, filter } => list_due(directory, filter),
        Command::Stats { directory, format } => print_stats(directory, format),
        Command::Check { directory } => check_collection(directory),
        Command::Export { directory } => export_collection(directory),
    }
}
