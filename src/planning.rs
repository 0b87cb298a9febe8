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

//! Plan creation: ties the scheduler to stored performance, the oracle and
//! the database.

use serde::Serialize;

use crate::config::PlannerConfig;
use crate::db::Database;
use crate::db::PlanId;
use crate::error::Fallible;
use crate::gateway::Gateway;
use crate::study::PlanAdvisory;
use crate::study::scheduler::RevisionScheduler;
use crate::study::topic_performance::aggregate_by_topic;
use crate::types::date::Date;
use crate::types::document_id::DocumentId;
use crate::types::plan::RevisionPlan;
use crate::types::topic::Topic;

/// Weight of a requested topic the oracle did not find in the document.
const REQUESTED_TOPIC_WEIGHT: f64 = 5.0;

pub struct PlanRequest<'a> {
    pub document_id: DocumentId,
    /// `YYYY-MM-DD` or RFC 3339.
    pub exam_date: Option<&'a str>,
    /// Restrict the plan to these topics.
    pub topics: &'a [String],
    pub today: Date,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreatedPlan {
    pub plan_id: PlanId,
    pub context_id: DocumentId,
    pub degenerate: bool,
    #[serde(flatten)]
    pub plan: RevisionPlan,
}

/// Build, narrate and store a plan for a document. Returns `None` if the
/// document does not exist.
pub async fn create_plan(
    db: &Database,
    gateway: &Gateway,
    config: &PlannerConfig,
    request: PlanRequest<'_>,
) -> Fallible<Option<CreatedPlan>> {
    let Some(text) = db.get_document_text(request.document_id)? else {
        return Ok(None);
    };
    let (exam_date, horizon) = exam_window(config, request.today, request.exam_date);
    log::info!(
        "Creating a {horizon}-day plan for {}, exam on {exam_date}.",
        request.document_id
    );

    let extracted = gateway.extract_topics(&text).await;
    let topics = resolve_topics(extracted, request.topics);
    let records = db.performance_records(request.document_id)?;
    let performance = aggregate_by_topic(&records)?;

    let scheduler = RevisionScheduler::new(config.schedule.clone());
    let schedule = scheduler.build_plan(&topics, &performance, horizon, request.today)?;
    let mut plan = schedule.plan;
    plan.exam_date = exam_date;
    let degenerate = schedule.advisory == Some(PlanAdvisory::DegeneratePlan);
    if degenerate {
        log::warn!(
            "No topics available for {}; the plan is all rest days.",
            request.document_id
        );
    } else {
        plan.summary = gateway.narrate_plan(&plan, &text).await;
    }

    let plan_id = db.save_plan(request.document_id, &plan)?;
    Ok(Some(CreatedPlan {
        plan_id,
        context_id: request.document_id,
        degenerate,
        plan,
    }))
}

/// The exam date, and the number of days to plan for: the days from `today`
/// to the exam, clamped to `[1, max_horizon_days]`. An absent or unparsable
/// exam date means the default offset. The exam date itself is kept as
/// given even when the horizon is clamped.
pub fn exam_window(config: &PlannerConfig, today: Date, exam_date: Option<&str>) -> (Date, i64) {
    let exam = match exam_date.map(|s| (s, Date::parse(s))) {
        Some((_, Some(date))) => date,
        Some((s, None)) => {
            log::warn!("Unparsable exam date '{s}', using the default.");
            today.plus_days(u64::from(config.default_exam_offset_days))
        }
        None => today.plus_days(u64::from(config.default_exam_offset_days)),
    };
    let max = i64::from(config.max_horizon_days.max(1));
    (exam, today.days_until(exam).clamp(1, max))
}

/// With no requested names, the extracted topics. Otherwise one topic per
/// requested name: the extracted one with that name if there is one, or a
/// new topic of middling weight.
pub fn resolve_topics(extracted: Vec<Topic>, requested: &[String]) -> Vec<Topic> {
    let requested: Vec<&str> = requested
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    if requested.is_empty() {
        return extracted;
    }
    let mut topics: Vec<Topic> = Vec::with_capacity(requested.len());
    for name in requested {
        if topics.iter().any(|t| t.name.eq_ignore_ascii_case(name)) {
            continue;
        }
        let topic = extracted
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| Topic::new(name, REQUESTED_TOPIC_WEIGHT, ""));
        topics.push(topic);
    }
    topics
}
