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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::timestamp::Timestamp;

/// Where a performance measurement came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Quiz,
    Flashcard,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Quiz => "quiz",
            MetricKind::Flashcard => "flashcard",
        }
    }
}

impl TryFrom<String> for MetricKind {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "quiz" => Ok(MetricKind::Quiz),
            "flashcard" => Ok(MetricKind::Flashcard),
            _ => fail(format!("Invalid metric kind: {}", value)),
        }
    }
}

impl ToSql for MetricKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MetricKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        MetricKind::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A single measurement of how well a topic is known. Immutable once
/// written.
#[derive(Clone, Debug)]
pub struct PerformanceRecord {
    pub topic: String,
    /// In `[0, 1]`.
    pub score: f64,
    pub metric_kind: MetricKind,
    pub recorded_at: Timestamp,
}

impl PerformanceRecord {
    pub fn new(topic: impl Into<String>, score: f64, metric_kind: MetricKind) -> Self {
        Self {
            topic: topic.into(),
            score,
            metric_kind,
            recorded_at: Timestamp::now(),
        }
    }
}
