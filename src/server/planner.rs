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
use axum::extract::Path;
use axum::extract::State;
use axum::response::Html;
use serde::Deserialize;
use serde::Serialize;

use crate::db::PerformanceStats;
use crate::db::PlanId;
use crate::db::StoredPlan;
use crate::planning::CreatedPlan;
use crate::planning::PlanRequest;
use crate::planning::create_plan;
use crate::server::error::ApiError;
use crate::server::error::ApiResult;
use crate::server::error::load_document;
use crate::server::error::parse_id;
use crate::server::state::ServerState;
use crate::server::template::plan_page;
use crate::types::date::Date;
use crate::types::document_id::DocumentId;
use crate::types::topic::Topic;

#[derive(Deserialize)]
pub struct TopicsRequest {
    context_id: String,
}

#[derive(Serialize)]
pub struct TopicsResponse {
    context_id: DocumentId,
    topics: Vec<Topic>,
}

pub async fn extract_topics(
    State(state): State<ServerState>,
    Json(request): Json<TopicsRequest>,
) -> ApiResult<TopicsResponse> {
    let (context_id, text) = load_document(&state, &request.context_id)?;
    let topics = state.gateway.extract_topics(&text).await;
    Ok(Json(TopicsResponse { context_id, topics }))
}

#[derive(Deserialize)]
pub struct CreatePlanRequest {
    context_id: String,
    exam_date: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(request): Json<CreatePlanRequest>,
) -> ApiResult<CreatedPlan> {
    let document_id = parse_id(&request.context_id)?;
    let plan_request = PlanRequest {
        document_id,
        exam_date: request.exam_date.as_deref(),
        topics: &request.topics,
        today: Date::today(),
    };
    let created = create_plan(&state.db, &state.gateway, &state.planner, plan_request)
        .await?
        .ok_or(ApiError::NotFound("Document not found."))?;
    Ok(Json(created))
}

fn find_plan(state: &ServerState, plan_id: PlanId) -> Result<StoredPlan, ApiError> {
    state
        .db
        .get_plan(plan_id)?
        .ok_or(ApiError::NotFound("Plan not found."))
}

pub async fn get_plan(
    State(state): State<ServerState>,
    Path(plan_id): Path<PlanId>,
) -> ApiResult<StoredPlan> {
    Ok(Json(find_plan(&state, plan_id)?))
}

pub async fn view_plan(
    State(state): State<ServerState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Html<String>, ApiError> {
    let stored = find_plan(&state, plan_id)?;
    Ok(Html(plan_page(&stored).into_string()))
}

pub async fn performance(
    State(state): State<ServerState>,
    Path(context_id): Path<String>,
) -> ApiResult<PerformanceStats> {
    let (document_id, _) = load_document(&state, &context_id)?;
    Ok(Json(state.db.performance_stats(document_id)?))
}
