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

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::ingest::ingest_path;
use crate::cmd::plan::plan_document;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::server::server::start_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the study API.
    Serve {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Port to listen on, overriding the config file.
        #[arg(long)]
        port: Option<u16>,
        /// Open the browser once the server is up.
        #[arg(long)]
        open: bool,
    },
    /// Ingest a document, or every Markdown and text file under a directory.
    Ingest {
        /// A `.md` or `.txt` file, or a directory to search.
        path: PathBuf,
        /// Optional path to the data directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Build, store and print a revision plan for a document.
    Plan {
        /// The document's id, as printed by `ingest`.
        document_id: String,
        /// Exam date, as `YYYY-MM-DD`.
        #[arg(long)]
        exam_date: Option<String>,
        /// Restrict the plan to this topic. May be repeated.
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// Optional path to the data directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Print performance statistics for a document.
    Stats {
        /// The document's id, as printed by `ingest`.
        document_id: String,
        /// Optional path to the data directory.
        #[arg(long)]
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            directory,
            port,
            open,
        } => start_server(directory, port, open).await,
        Command::Ingest { path, directory } => {
            for (file, document_id) in ingest_path(&path, directory)? {
                println!("{document_id}  {}", file.display());
            }
            Ok(())
        }
        Command::Plan {
            document_id,
            exam_date,
            topics,
            directory,
        } => plan_document(&document_id, exam_date, topics, directory).await,
        Command::Stats {
            document_id,
            directory,
        } => print_stats(&document_id, directory),
    }
}
