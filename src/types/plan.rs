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

use serde::Deserialize;
use serde::Serialize;

use crate::types::date::Date;

/// How much attention a day, or a topic within a day, deserves.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Low,
    Medium,
    High,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Low => "low",
            Focus::Medium => "medium",
            Focus::High => "high",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKind {
    Study,
    /// Light reinforcement of topics already studied.
    Review,
    /// No topics at all.
    Rest,
}

/// Time given to one topic on one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicAllocation {
    pub topic: String,
    pub minutes: u32,
    pub focus: Focus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevisionDayPlan {
    /// 1-based, contiguous.
    pub day: u32,
    pub date: Date,
    pub topics: Vec<String>,
    pub duration_minutes: u32,
    pub focus: Focus,
    pub kind: DayKind,
    pub allocations: Vec<TopicAllocation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevisionPlan {
    pub days: Vec<RevisionDayPlan>,
    pub summary: String,
    pub exam_date: Date,
    pub horizon_days: u32,
}
