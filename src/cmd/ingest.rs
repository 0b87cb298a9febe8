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

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::collection::Collection;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;
use crate::extract::SUPPORTED_EXTENSIONS;
use crate::extract::extract_text;
use crate::types::document_id::DocumentId;

/// Ingest a file, or every supported file under a directory. Files under a
/// directory that fail to extract are skipped with a warning.
pub fn ingest_path(path: &Path, directory: Option<String>) -> Fallible<Vec<(PathBuf, DocumentId)>> {
    if !path.exists() {
        return fail(format!("{} does not exist.", path.display()));
    }
    let collection = Collection::new(directory)?;
    if path.is_file() {
        let document_id = ingest_file(&collection.db, path)?;
        return Ok(vec![(path.to_path_buf(), document_id)]);
    }
    let mut ingested = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        let file = entry.path();
        if !file.is_file() || !is_supported(file) {
            continue;
        }
        match ingest_file(&collection.db, file) {
            Ok(document_id) => ingested.push((file.to_path_buf(), document_id)),
            Err(e) => log::warn!("Skipping {}: {e}", file.display()),
        }
    }
    log::info!("Ingested {} documents.", ingested.len());
    Ok(ingested)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn ingest_file(db: &Database, path: &Path) -> Fallible<DocumentId> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;
    let text = extract_text(&filename, &bytes)?;
    db.add_document(&filename, &text)
}
