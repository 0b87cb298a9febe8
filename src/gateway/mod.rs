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

//! The content-generation gateway.
//!
//! Text generation sits behind the [`Oracle`] port: it takes a [`Prompt`]
//! and returns the raw reply. The [`Gateway`] builds prompts, decodes the
//! reply into an [`OracleReply`], and falls back to a defined empty or error
//! result whenever the oracle fails or its output cannot be parsed.

pub mod openai;
mod prompts;
#[cfg(test)]
pub mod stub;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::config::OracleConfig;
use crate::error::Fallible;
use crate::study::difficulty::DifficultyLevel;
use crate::types::plan::RevisionPlan;
use crate::types::quiz::GradeVerdict;
use crate::types::quiz::QaPair;
use crate::types::quiz::QuizOutcome;
use crate::types::topic::Topic;

const GRADING_ERROR_FEEDBACK: &str = "Error grading this question.";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PromptKind {
    ExtractTopics,
    GenerateFlashcards,
    GenerateQuiz,
    GradeQuiz,
    AnswerQuestion,
    SummarizePlan,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::ExtractTopics => "extract_topics",
            PromptKind::GenerateFlashcards => "generate_flashcards",
            PromptKind::GenerateQuiz => "generate_quiz",
            PromptKind::GradeQuiz => "grade_quiz",
            PromptKind::AnswerQuestion => "answer_question",
            PromptKind::SummarizePlan => "summarize_plan",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Prompt {
    pub kind: PromptKind,
    pub system: String,
    pub user: String,
}

/// A text-generation service. Returns the raw text of its reply, which is
/// expected to be a single JSON object.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Fallible<String>;
}

/// A decoded oracle reply, tagged by what was asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum OracleReply {
    Topics(Vec<Topic>),
    Flashcards(Vec<QaPair>),
    Questions(Vec<QaPair>),
    Verdicts(Vec<GradeVerdict>),
    Answer(Answer),
    Summary(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(default)]
    pub reference: String,
}

impl Answer {
    fn error(message: &str) -> Self {
        Self {
            answer: message.to_string(),
            reference: String::new(),
        }
    }
}

#[derive(Deserialize)]
struct TopicsReply {
    topics: Vec<Topic>,
}

#[derive(Deserialize)]
struct FlashcardsReply {
    flashcards: Vec<QaPair>,
}

#[derive(Deserialize)]
struct QuestionsReply {
    questions: Vec<QaPair>,
}

#[derive(Deserialize)]
struct VerdictsReply {
    results: Vec<GradeVerdict>,
}

#[derive(Deserialize)]
struct SummaryReply {
    summary: String,
}

/// Decode a raw reply according to the kind of prompt that produced it.
pub fn decode(kind: PromptKind, raw: &str) -> Fallible<OracleReply> {
    let reply = match kind {
        PromptKind::ExtractTopics => {
            OracleReply::Topics(serde_json::from_str::<TopicsReply>(raw)?.topics)
        }
        PromptKind::GenerateFlashcards => {
            OracleReply::Flashcards(serde_json::from_str::<FlashcardsReply>(raw)?.flashcards)
        }
        PromptKind::GenerateQuiz => {
            OracleReply::Questions(serde_json::from_str::<QuestionsReply>(raw)?.questions)
        }
        PromptKind::GradeQuiz => {
            OracleReply::Verdicts(serde_json::from_str::<VerdictsReply>(raw)?.results)
        }
        PromptKind::AnswerQuestion => OracleReply::Answer(serde_json::from_str::<Answer>(raw)?),
        PromptKind::SummarizePlan => {
            OracleReply::Summary(serde_json::from_str::<SummaryReply>(raw)?.summary)
        }
    };
    Ok(reply)
}

#[derive(Clone)]
pub struct Gateway {
    oracle: Arc<dyn Oracle>,
    max_context_chars: usize,
    planner_context_chars: usize,
}

impl Gateway {
    pub fn new(oracle: Arc<dyn Oracle>, config: &OracleConfig) -> Self {
        Self {
            oracle,
            max_context_chars: config.max_context_chars,
            planner_context_chars: config.planner_context_chars,
        }
    }

    /// Send a prompt and decode the reply. Failures are logged and come back
    /// as `None`.
    async fn ask(&self, prompt: Prompt) -> Option<OracleReply> {
        log::debug!("Sending {} request to the oracle.", prompt.kind.as_str());
        let raw = match self.oracle.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Oracle request {} failed: {e}", prompt.kind.as_str());
                return None;
            }
        };
        match decode(prompt.kind, &raw) {
            Ok(reply) => Some(reply),
            Err(e) => {
                log::warn!(
                    "Malformed oracle reply to {}: {e}. Raw reply: {raw}",
                    prompt.kind.as_str()
                );
                None
            }
        }
    }

    /// Topics in the text, with their importance. Topics weighted outside
    /// `[1, 10]` are dropped.
    pub async fn extract_topics(&self, text: &str) -> Vec<Topic> {
        let context = truncate(text, self.planner_context_chars);
        match self.ask(prompts::extract_topics(context)).await {
            Some(OracleReply::Topics(topics)) => {
                let total = topics.len();
                let valid: Vec<Topic> = topics
                    .into_iter()
                    .filter(|topic| {
                        let keep = topic.has_valid_weight() && !topic.name.trim().is_empty();
                        if !keep {
                            log::warn!(
                                "Dropping topic '{}' with weight {}.",
                                topic.name,
                                topic.weight
                            );
                        }
                        keep
                    })
                    .collect();
                log::info!("Extracted {} of {total} topics.", valid.len());
                valid
            }
            _ => Vec::new(),
        }
    }

    pub async fn generate_flashcards(&self, text: &str) -> Vec<QaPair> {
        if text.trim().is_empty() {
            log::warn!("No text provided to generate flashcards.");
            return Vec::new();
        }
        let context = truncate(text, self.max_context_chars);
        match self.ask(prompts::generate_flashcards(context)).await {
            Some(OracleReply::Flashcards(cards)) => {
                if cards.is_empty() {
                    log::warn!("Oracle reply contained no flashcards.");
                } else {
                    log::info!("Generated {} flashcards.", cards.len());
                }
                cards
            }
            _ => Vec::new(),
        }
    }

    pub async fn generate_quiz(
        &self,
        text: &str,
        difficulty: DifficultyLevel,
        num_questions: usize,
    ) -> Vec<QaPair> {
        log::info!("Generating a {difficulty} quiz with {num_questions} questions...");
        let context = truncate(text, self.max_context_chars);
        let prompt = prompts::generate_quiz(context, difficulty, num_questions);
        match self.ask(prompt).await {
            Some(OracleReply::Questions(questions)) => {
                if questions.is_empty() {
                    log::warn!("Oracle reply contained no questions.");
                }
                questions
            }
            _ => Vec::new(),
        }
    }

    /// Grade every question in one request. The result has exactly one
    /// outcome per question, in question order. Questions the oracle did not
    /// grade count as incorrect.
    pub async fn grade_quiz(&self, quiz: &[QaPair], answers: &[String]) -> Vec<QuizOutcome> {
        log::info!("Grading quiz in a single batch...");
        let items: Vec<GradingItem> = quiz
            .iter()
            .enumerate()
            .map(|(i, pair)| GradingItem {
                question: &pair.q,
                correct_answer: &pair.a,
                user_answer: answers.get(i).map(String::as_str).unwrap_or(""),
            })
            .collect();
        let verdicts = if items.is_empty() {
            Vec::new()
        } else {
            match serde_json::to_string_pretty(&items) {
                Ok(json) => match self.ask(prompts::grade_quiz(&json)).await {
                    Some(OracleReply::Verdicts(verdicts)) => verdicts,
                    _ => Vec::new(),
                },
                Err(e) => {
                    log::error!("Failed to encode quiz for grading: {e}");
                    Vec::new()
                }
            }
        };
        if verdicts.len() != items.len() {
            log::warn!(
                "Oracle graded {} of {} questions.",
                verdicts.len(),
                items.len()
            );
        }
        let mut verdicts = verdicts.into_iter();
        items
            .into_iter()
            .map(|item| {
                let verdict = verdicts.next().unwrap_or_else(|| GradeVerdict {
                    is_correct: false,
                    feedback: GRADING_ERROR_FEEDBACK.to_string(),
                });
                QuizOutcome {
                    question: item.question.to_string(),
                    correct_answer: item.correct_answer.to_string(),
                    user_answer: item.user_answer.to_string(),
                    is_correct: verdict.is_correct,
                    feedback: verdict.feedback,
                }
            })
            .collect()
    }

    /// Answer a question using only the given text.
    pub async fn answer_question(&self, question: &str, text: &str) -> Answer {
        if text.trim().is_empty() {
            log::warn!("No context provided.");
            return Answer::error("Error: No document context was provided.");
        }
        if question.trim().is_empty() {
            return Answer::error("Error: No question was asked.");
        }
        let preview: String = question.chars().take(50).collect();
        log::info!("Asking contextual question: {preview}...");
        let context = truncate(text, self.max_context_chars);
        match self.ask(prompts::answer_question(question, context)).await {
            Some(OracleReply::Answer(answer)) => answer,
            _ => Answer::error("Error: Failed to get a valid response from AI."),
        }
    }

    /// A short human-readable explanation of the plan's strategy. Empty when
    /// the oracle cannot provide one.
    pub async fn narrate_plan(&self, plan: &RevisionPlan, text: &str) -> String {
        let schedule = match serde_json::to_string(&plan.days) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode plan for narration: {e}");
                return String::new();
            }
        };
        let context = truncate(text, self.planner_context_chars);
        let prompt = prompts::summarize_plan(context, &schedule, plan.horizon_days);
        match self.ask(prompt).await {
            Some(OracleReply::Summary(summary)) => summary,
            _ => String::new(),
        }
    }
}

#[derive(Serialize)]
struct GradingItem<'a> {
    question: &'a str,
    correct_answer: &'a str,
    user_answer: &'a str,
}

/// The first `max_chars` characters of `text`.
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}
