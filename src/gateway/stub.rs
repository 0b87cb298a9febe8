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

//! A canned oracle for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Fallible;
use crate::error::fail;
use crate::gateway::Oracle;
use crate::gateway::Prompt;
use crate::gateway::PromptKind;

/// Answers each kind of prompt with a fixed reply. Kinds without a reply
/// fail, like an unreachable service would.
#[derive(Default)]
pub struct StubOracle {
    replies: HashMap<PromptKind, String>,
    seen: Mutex<Vec<Prompt>>,
}

impl StubOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, kind: PromptKind, raw: &str) -> Self {
        self.replies.insert(kind, raw.to_string());
        self
    }

    /// Prompts received so far, oldest first.
    pub fn seen(&self) -> Vec<Prompt> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for StubOracle {
    async fn complete(&self, prompt: &Prompt) -> Fallible<String> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(prompt.clone());
        }
        match self.replies.get(&prompt.kind) {
            Some(raw) => Ok(raw.clone()),
            None => fail(format!("no stub reply for {}", prompt.kind.as_str())),
        }
    }
}
