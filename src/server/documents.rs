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

use axum::Json;
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;

use crate::db::DocumentSummary;
use crate::extract::extract_text;
use crate::server::error::ApiError;
use crate::server::error::ApiResult;
use crate::server::state::ServerState;
use crate::types::document_id::DocumentId;

const SNIPPET_CHARS: usize = 200;

#[derive(Serialize)]
pub struct Health {
    message: &'static str,
}

pub async fn root() -> Json<Health> {
    Json(Health {
        message: "Study assistant backend is running.",
    })
}

#[derive(Deserialize)]
pub struct UploadQuery {
    filename: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    context_id: DocumentId,
    filename: String,
    text_length: usize,
    snippet: String,
}

pub async fn upload(
    State(state): State<ServerState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<UploadResponse> {
    log::info!("Received upload: {} ({} bytes)", query.filename, body.len());
    let text = extract_text(&query.filename, &body)
        .map_err(|e| ApiError::BadRequest(e.message().to_string()))?;
    let context_id = state.db.add_document(&query.filename, &text)?;
    let mut snippet: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().nth(SNIPPET_CHARS).is_some() {
        snippet.push_str("...");
    }
    Ok(Json(UploadResponse {
        context_id,
        filename: query.filename,
        text_length: text.chars().count(),
        snippet,
    }))
}

pub async fn list_documents(State(state): State<ServerState>) -> ApiResult<Vec<DocumentSummary>> {
    Ok(Json(state.db.list_documents()?))
}
