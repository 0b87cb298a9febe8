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

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::study::tracker::Accuracy;

/// Accuracy strictly above this escalates.
const ESCALATE_ABOVE: f64 = 0.8;

/// Accuracy strictly below this de-escalates.
const DEESCALATE_BELOW: f64 = 0.5;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub enum DifficultyLevel {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Medium => "Medium",
            DifficultyLevel::Hard => "Hard",
        }
    }

    fn harder(self) -> Self {
        match self {
            DifficultyLevel::Easy => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Hard => DifficultyLevel::Hard,
        }
    }

    fn easier(self) -> Self {
        match self {
            DifficultyLevel::Hard => DifficultyLevel::Medium,
            DifficultyLevel::Medium | DifficultyLevel::Easy => DifficultyLevel::Easy,
        }
    }

    /// What kind of questions the oracle should ask at this level.
    pub fn describe(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "simple definitions or \"what is\" questions",
            DifficultyLevel::Medium => "questions asking to explain a concept or a process",
            DifficultyLevel::Hard => {
                "questions asking for analysis, comparison, or why something works"
            }
        }
    }
}

/// Decide the next quiz difficulty from the accuracy of the last batch.
///
/// With no data the session starts over at `Easy`. Above 0.8 the level
/// goes up one step, below 0.5 it goes down one step, and anywhere in
/// `[0.5, 0.8]` it stays put. The level never skips and saturates at both
/// ends.
pub fn next_difficulty(current: DifficultyLevel, accuracy: Accuracy) -> DifficultyLevel {
    let score = match accuracy {
        Accuracy::NoData => {
            log::info!("No accuracy data, starting fresh.");
            return DifficultyLevel::Easy;
        }
        Accuracy::Ratio(score) => score,
    };
    log::info!("Quiz complete. Score: {:.0}%", score * 100.0);
    if score > ESCALATE_ABOVE {
        let next = current.harder();
        log::info!("Increasing difficulty: {current} -> {next}.");
        next
    } else if score < DEESCALATE_BELOW {
        let next = current.easier();
        log::info!("Decreasing difficulty: {current} -> {next}.");
        next
    } else {
        log::info!("Staying at {current}.");
        current
    }
}

impl Display for DifficultyLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for DifficultyLevel {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match DifficultyLevel::ALL.into_iter().find(|l| l.as_str() == value) {
            Some(level) => Ok(level),
            None => fail(format!("Invalid difficulty: {}", value)),
        }
    }
}

impl ToSql for DifficultyLevel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DifficultyLevel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        DifficultyLevel::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
