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
use axum::extract::State;
use serde::Deserialize;
use serde::Serialize;

use crate::db::Flashcard;
use crate::server::error::ApiError;
use crate::server::error::ApiResult;
use crate::server::error::load_document;
use crate::server::error::parse_id;
use crate::server::state::ServerState;
use crate::types::document_id::DocumentId;
use crate::types::performance::MetricKind;
use crate::types::performance::PerformanceRecord;

#[derive(Deserialize)]
pub struct FlashcardsRequest {
    context_id: String,
}

#[derive(Serialize)]
pub struct FlashcardsResponse {
    context_id: DocumentId,
    flashcards: Vec<Flashcard>,
}

pub async fn generate_flashcards(
    State(state): State<ServerState>,
    Json(request): Json<FlashcardsRequest>,
) -> ApiResult<FlashcardsResponse> {
    let (context_id, text) = load_document(&state, &request.context_id)?;
    let pairs = state.gateway.generate_flashcards(&text).await;
    let flashcards = state.db.add_flashcards(context_id, &pairs)?;
    Ok(Json(FlashcardsResponse {
        context_id,
        flashcards,
    }))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    flashcard_id: String,
    correct: bool,
}

/// Record one review. Cards that belong to a topic also feed that topic's
/// performance.
pub async fn review_flashcard(
    State(state): State<ServerState>,
    Json(request): Json<ReviewRequest>,
) -> ApiResult<Flashcard> {
    let flashcard_id = parse_id(&request.flashcard_id)?;
    let score = if request.correct { 1.0 } else { 0.0 };
    let card = state
        .db
        .record_flashcard_review(flashcard_id, score)?
        .ok_or(ApiError::NotFound("Flashcard not found."))?;
    if let Some(topic) = &card.topic {
        let record = PerformanceRecord::new(topic, score, MetricKind::Flashcard);
        state.db.add_performance_record(card.context_id, &record)?;
    }
    Ok(Json(card))
}
