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

use crate::db::QuizResult;
use crate::gateway::Answer;
use crate::server::error::ApiError;
use crate::server::error::ApiResult;
use crate::server::error::load_document;
use crate::server::state::ServerState;
use crate::study::difficulty::DifficultyLevel;
use crate::study::difficulty::next_difficulty;
use crate::study::tracker::Accuracy;
use crate::study::tracker::PerformanceTracker;
use crate::types::document_id::DocumentId;
use crate::types::performance::MetricKind;
use crate::types::performance::PerformanceRecord;
use crate::types::quiz::QaPair;
use crate::types::quiz::QuizOutcome;
use crate::types::timestamp::Timestamp;

const MAX_QUESTIONS: usize = 20;

fn default_num_questions() -> usize {
    5
}

#[derive(Deserialize)]
pub struct GenerateQuizRequest {
    context_id: String,
    #[serde(default)]
    difficulty: DifficultyLevel,
    #[serde(default = "default_num_questions")]
    num_questions: usize,
}

#[derive(Serialize)]
pub struct GenerateQuizResponse {
    context_id: DocumentId,
    difficulty: DifficultyLevel,
    questions: Vec<QaPair>,
}

pub async fn generate_quiz(
    State(state): State<ServerState>,
    Json(request): Json<GenerateQuizRequest>,
) -> ApiResult<GenerateQuizResponse> {
    if !(1..=MAX_QUESTIONS).contains(&request.num_questions) {
        return Err(ApiError::BadRequest(format!(
            "num_questions must be between 1 and {MAX_QUESTIONS}."
        )));
    }
    let (context_id, text) = load_document(&state, &request.context_id)?;
    let questions = state
        .gateway
        .generate_quiz(&text, request.difficulty, request.num_questions)
        .await;
    Ok(Json(GenerateQuizResponse {
        context_id,
        difficulty: request.difficulty,
        questions,
    }))
}

#[derive(Deserialize)]
pub struct GradeQuizRequest {
    context_id: String,
    quiz: Vec<QaPair>,
    #[serde(default)]
    user_answers: Vec<String>,
    /// The level the quiz was generated at.
    #[serde(default)]
    difficulty: DifficultyLevel,
    topic: Option<String>,
}

#[derive(Serialize)]
pub struct GradeQuizResponse {
    results: Vec<QuizOutcome>,
    correct: usize,
    total: usize,
    /// Fraction correct. `None` for an empty quiz.
    score: Option<f64>,
    next_difficulty: DifficultyLevel,
}

/// Grade a quiz and pick the difficulty of the next one.
pub async fn grade_quiz(
    State(state): State<ServerState>,
    Json(request): Json<GradeQuizRequest>,
) -> ApiResult<GradeQuizResponse> {
    let (context_id, _) = load_document(&state, &request.context_id)?;
    let results = state
        .gateway
        .grade_quiz(&request.quiz, &request.user_answers)
        .await;

    let mut tracker = PerformanceTracker::new();
    tracker.record_outcomes(&results);
    let accuracy = tracker.aggregate_and_reset();
    let next = next_difficulty(request.difficulty, accuracy);

    let score = match accuracy {
        Accuracy::NoData => None,
        Accuracy::Ratio(score) => Some(score),
    };
    let topic = request
        .topic
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty());
    if let Some(score) = score {
        state.db.add_quiz_result(&QuizResult {
            document_id: context_id,
            topic: topic.clone(),
            difficulty: request.difficulty,
            score,
            total_questions: results.len(),
            taken_at: Timestamp::now(),
        })?;
        if let Some(topic) = topic {
            let record = PerformanceRecord::new(topic, score, MetricKind::Quiz);
            state.db.add_performance_record(context_id, &record)?;
        }
    }

    let correct = results.iter().filter(|r| r.is_correct).count();
    Ok(Json(GradeQuizResponse {
        total: results.len(),
        correct,
        score,
        next_difficulty: next,
        results,
    }))
}

#[derive(Deserialize)]
pub struct DoubtRequest {
    context_id: String,
    question: String,
}

pub async fn ask_doubt(
    State(state): State<ServerState>,
    Json(request): Json<DoubtRequest>,
) -> ApiResult<Answer> {
    let (_, text) = load_document(&state, &request.context_id)?;
    let answer = state.gateway.answer_question(&request.question, &text).await;
    Ok(Json(answer))
}
