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

/// Lowest importance a topic can be assigned.
pub const MIN_WEIGHT: f64 = 1.0;

/// Highest importance a topic can be assigned.
pub const MAX_WEIGHT: f64 = 10.0;

/// A topic extracted from a document, with its nominal importance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    /// In `[1, 10]`.
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

impl Topic {
    pub fn new(name: impl Into<String>, weight: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
        }
    }

    pub fn has_valid_weight(&self) -> bool {
        (MIN_WEIGHT..=MAX_WEIGHT).contains(&self.weight)
    }
}
