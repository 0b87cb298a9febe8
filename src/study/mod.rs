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

//! The pure, synchronous study logic: accuracy tracking, adaptive quiz
//! difficulty, per-topic performance, and revision scheduling. Nothing in
//! here performs I/O.

pub mod difficulty;
pub mod scheduler;
pub mod topic_performance;
pub mod tracker;

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq)]
pub enum StudyError {
    /// A score outside `[0, 1]`.
    InvalidScore { topic: String, score: f64 },
    /// A planning horizon of less than one day.
    InvalidHorizon(i64),
}

impl Display for StudyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StudyError::InvalidScore { topic, score } => {
                write!(f, "invalid score for topic '{topic}': {score} (must be in [0, 1])")
            }
            StudyError::InvalidHorizon(days) => {
                write!(f, "invalid horizon: {days} days (must be at least 1)")
            }
        }
    }
}

impl Error for StudyError {}

/// Non-fatal conditions the scheduler reports alongside a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAdvisory {
    /// There were no topics to schedule. The plan is structurally valid but
    /// every day is empty.
    DegeneratePlan,
}

pub(crate) fn check_score(topic: &str, score: f64) -> Result<(), StudyError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(StudyError::InvalidScore {
            topic: topic.to_string(),
            score,
        })
    }
}
