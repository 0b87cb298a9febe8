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

use crate::collection::Collection;
use crate::db::PerformanceStats;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::document_id::DocumentId;

pub fn print_stats(document_id: &str, directory: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let stats = document_stats(&collection, document_id)?;
    let stats_json = serde_json::to_string_pretty(&stats)?;
    println!("{}", stats_json);
    Ok(())
}

fn document_stats(collection: &Collection, document_id: &str) -> Fallible<PerformanceStats> {
    let document_id = DocumentId::from_hex(document_id)?;
    if collection.db.get_document_text(document_id)?.is_none() {
        return fail("document not found.");
    }
    collection.db.performance_stats(document_id)
}
