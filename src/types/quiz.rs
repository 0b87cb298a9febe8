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

/// A question and its reference answer. Used for both quiz questions and
/// flashcards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub q: String,
    pub a: String,
    /// The topic the pair belongs to, when the oracle supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl QaPair {
    #[cfg(test)]
    pub fn new(q: impl Into<String>, a: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            a: a.into(),
            topic: None,
        }
    }
}

/// The oracle's verdict on a single answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeVerdict {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: String,
}

/// A graded question. Never mutated after grading.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuizOutcome {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub feedback: String,
}
