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

use std::sync::Arc;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::gateway::Gateway;
use crate::gateway::openai::OpenAiOracle;
use crate::planning::CreatedPlan;
use crate::planning::PlanRequest;
use crate::planning::create_plan;
use crate::types::date::Date;
use crate::types::document_id::DocumentId;

pub async fn plan_document(
    document_id: &str,
    exam_date: Option<String>,
    topics: Vec<String>,
    directory: Option<String>,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let oracle = Arc::new(OpenAiOracle::from_env(&collection.config.oracle)?);
    let gateway = Gateway::new(oracle, &collection.config.oracle);
    let created = build(&collection, &gateway, document_id, exam_date, &topics).await?;
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

async fn build(
    collection: &Collection,
    gateway: &Gateway,
    document_id: &str,
    exam_date: Option<String>,
    topics: &[String],
) -> Fallible<CreatedPlan> {
    let request = PlanRequest {
        document_id: DocumentId::from_hex(document_id)?,
        exam_date: exam_date.as_deref(),
        topics,
        today: Date::today(),
    };
    let planner = &collection.config.planner;
    match create_plan(&collection.db, gateway, planner, request).await? {
        Some(created) => Ok(created),
        None => fail("document not found."),
    }
}
