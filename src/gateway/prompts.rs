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

use crate::gateway::Prompt;
use crate::gateway::PromptKind;
use crate::study::difficulty::DifficultyLevel;

const TUTOR: &str = "You are a careful study assistant. You reply with a single JSON object \
and nothing else.";

pub fn extract_topics(context: &str) -> Prompt {
    let user = format!(
        "List the main topics covered by the study material below. For each topic \
give a short name, a one-sentence description, and an importance weight from 1 \
(peripheral) to 10 (central to the material).\n\n\
Reply with JSON of the form:\n\
{{\"topics\": [{{\"name\": \"...\", \"weight\": 7, \"description\": \"...\"}}]}}\n\n\
Material:\n---\n{context}\n---"
    );
    Prompt {
        kind: PromptKind::ExtractTopics,
        system: TUTOR.to_string(),
        user,
    }
}

pub fn generate_flashcards(context: &str) -> Prompt {
    let user = format!(
        "Write flashcards for the key facts and concepts in the study material below. \
Each card has a short question and a concise answer taken from the material.\n\n\
Reply with JSON of the form:\n\
{{\"flashcards\": [{{\"q\": \"...\", \"a\": \"...\"}}]}}\n\n\
Material:\n---\n{context}\n---"
    );
    Prompt {
        kind: PromptKind::GenerateFlashcards,
        system: TUTOR.to_string(),
        user,
    }
}

pub fn generate_quiz(context: &str, difficulty: DifficultyLevel, num_questions: usize) -> Prompt {
    let user = format!(
        "Write exactly {num_questions} {difficulty} quiz questions about the study \
material below. At this level, ask {}. Each question has a model answer taken from \
the material.\n\n\
Reply with JSON of the form:\n\
{{\"questions\": [{{\"q\": \"...\", \"a\": \"...\"}}]}}\n\n\
Material:\n---\n{context}\n---",
        difficulty.describe()
    );
    Prompt {
        kind: PromptKind::GenerateQuiz,
        system: TUTOR.to_string(),
        user,
    }
}

pub fn grade_quiz(items: &str) -> Prompt {
    let user = format!(
        "Grade each student answer against the model answer. Accept answers that are \
correct in substance even if worded differently. Give one short sentence of feedback \
per question. Keep the results in the same order as the questions.\n\n\
Reply with JSON of the form:\n\
{{\"results\": [{{\"is_correct\": true, \"feedback\": \"...\"}}]}}\n\n\
Questions:\n{items}"
    );
    Prompt {
        kind: PromptKind::GradeQuiz,
        system: TUTOR.to_string(),
        user,
    }
}

pub fn answer_question(question: &str, context: &str) -> Prompt {
    let user = format!(
        "Answer the question using only the study material below. If the material \
does not contain the answer, say so. Quote the passage you relied on as the \
reference, or leave it empty.\n\n\
Reply with JSON of the form:\n\
{{\"answer\": \"...\", \"reference\": \"...\"}}\n\n\
Question: {question}\n\n\
Material:\n---\n{context}\n---"
    );
    Prompt {
        kind: PromptKind::AnswerQuestion,
        system: TUTOR.to_string(),
        user,
    }
}

pub fn summarize_plan(context: &str, schedule: &str, horizon_days: u32) -> Prompt {
    let user = format!(
        "A student has {horizon_days} days before their exam and will follow the \
revision schedule below. In two or three sentences, explain the strategy behind it \
to the student.\n\n\
Reply with JSON of the form:\n\
{{\"summary\": \"...\"}}\n\n\
Schedule:\n{schedule}\n\n\
Material:\n---\n{context}\n---"
    );
    Prompt {
        kind: PromptKind::SummarizePlan,
        system: TUTOR.to_string(),
        user,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_prompt_mentions_level() {
        let prompt = generate_quiz("Photosynthesis.", DifficultyLevel::Hard, 3);
        assert_eq!(prompt.kind, PromptKind::GenerateQuiz);
        assert!(prompt.user.contains("exactly 3 Hard quiz questions"));
        assert!(prompt.user.contains(DifficultyLevel::Hard.describe()));
        assert!(prompt.user.contains("Photosynthesis."));
    }

    #[test]
    fn test_prompts_ask_for_json() {
        let prompts = [
            extract_topics("x"),
            generate_flashcards("x"),
            generate_quiz("x", DifficultyLevel::Easy, 1),
            grade_quiz("[]"),
            answer_question("why?", "x"),
            summarize_plan("x", "[]", 7),
        ];
        for prompt in prompts {
            assert!(prompt.system.contains("JSON"));
            assert!(prompt.user.contains("Reply with JSON"));
        }
    }
}
