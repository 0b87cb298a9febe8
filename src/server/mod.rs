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

mod documents;
mod error;
mod flashcards;
mod planner;
mod quiz;
pub mod server;
pub mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use reqwest::Client;
    use reqwest::StatusCode;
    use serde_json::Value;
    use serde_json::json;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::collection::Collection;
    use crate::config::OracleConfig;
    use crate::config::PlannerConfig;
    use crate::error::Fallible;
    use crate::gateway::Gateway;
    use crate::gateway::PromptKind;
    use crate::gateway::stub::StubOracle;
    use crate::helper::create_tmp_directory;
    use crate::server::server::serve;
    use crate::server::server::start_server;
    use crate::server::state::ServerState;
    use crate::types::date::Date;

    const NOTES: &str = "# Cells\n\nCells divide by mitosis.\n";

    fn stub_oracle() -> StubOracle {
        StubOracle::new()
            .reply(
                PromptKind::ExtractTopics,
                r#"{"topics": [
                    {"name": "Cells", "weight": 8, "description": "Units of life"},
                    {"name": "Mitosis", "weight": 6, "description": "Division"}
                ]}"#,
            )
            .reply(
                PromptKind::GenerateFlashcards,
                r#"{"flashcards": [
                    {"q": "What divides?", "a": "Cells.", "topic": "Cells"},
                    {"q": "How?", "a": "By mitosis."}
                ]}"#,
            )
            .reply(
                PromptKind::GenerateQuiz,
                r#"{"questions": [
                    {"q": "What divides?", "a": "Cells."},
                    {"q": "How do cells divide?", "a": "By mitosis."}
                ]}"#,
            )
            .reply(
                PromptKind::GradeQuiz,
                r#"{"results": [
                    {"is_correct": true, "feedback": "Right."},
                    {"is_correct": true, "feedback": "Right."}
                ]}"#,
            )
            .reply(
                PromptKind::AnswerQuestion,
                r#"{"answer": "By mitosis.", "reference": "Cells divide by mitosis."}"#,
            )
            .reply(
                PromptKind::SummarizePlan,
                r#"{"summary": "Mitosis first, cells are already mastered."}"#,
            )
    }

    /// Start a server on a free port and wait for it to accept connections.
    async fn start() -> Fallible<String> {
        let directory = create_tmp_directory()?;
        let collection = Collection::new(Some(directory.display().to_string()))?;
        let state = ServerState {
            db: collection.db,
            gateway: Gateway::new(Arc::new(stub_oracle()), &OracleConfig::default()),
            planner: PlannerConfig::default(),
        };
        let port = portpicker::pick_unused_port().unwrap();
        let bind = format!("127.0.0.1:{port}");
        let addr = bind.clone();
        spawn(async move { serve(state, &addr).await });
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok(format!("http://{bind}"))
    }

    async fn post(client: &Client, url: String, body: Value) -> Fallible<(StatusCode, Value)> {
        let response = client.post(url).json(&body).send().await?;
        let status = response.status();
        let body = response.json::<Value>().await?;
        Ok((status, body))
    }

    #[tokio::test]
    async fn test_start_server_on_non_existent_directory() -> Fallible<()> {
        let result = start_server(Some("./derpherp".to_string()), None, false).await;
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let base = start().await?;
        let client = Client::new();

        // Health check.
        let response = client.get(format!("{base}/")).send().await?;
        assert!(response.status().is_success());
        let body = response.json::<Value>().await?;
        assert_eq!(body["message"], "Study assistant backend is running.");

        // Upload a document.
        let response = client
            .post(format!("{base}/upload?filename=notes.md"))
            .body(NOTES)
            .send()
            .await?;
        assert!(response.status().is_success());
        let body = response.json::<Value>().await?;
        assert_eq!(body["filename"], "notes.md");
        assert_eq!(body["snippet"], "Cells\nCells divide by mitosis.");
        let context_id = body["context_id"].as_str().unwrap().to_string();

        // Unsupported formats are rejected.
        let response = client
            .post(format!("{base}/upload?filename=slides.pdf"))
            .body("%PDF")
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>().await?;
        assert_eq!(body["detail"], "Unsupported file type: pdf. Supported: md, txt");

        // List documents.
        let response = client.get(format!("{base}/documents")).send().await?;
        let body = response.json::<Value>().await?;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["context_id"], context_id.as_str());

        // Generate flashcards, then review the one with a topic.
        let (status, body) = post(
            &client,
            format!("{base}/flashcards"),
            json!({"context_id": context_id}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        let cards = body["flashcards"].as_array().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0]["topic"], "Cells");
        let flashcard_id = cards[0]["flashcard_id"].as_str().unwrap().to_string();
        let (status, body) = post(
            &client,
            format!("{base}/flashcards/review"),
            json!({"flashcard_id": flashcard_id, "correct": true}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["review_count"], 1);
        assert_eq!(body["mastery_level"], 1.0);

        // Generate a quiz.
        let (status, body) = post(
            &client,
            format!("{base}/quiz/generate"),
            json!({"context_id": context_id, "difficulty": "Medium", "num_questions": 2}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["difficulty"], "Medium");
        let questions = body["questions"].clone();
        assert_eq!(questions.as_array().unwrap().len(), 2);

        let (status, body) = post(
            &client,
            format!("{base}/quiz/generate"),
            json!({"context_id": context_id, "num_questions": 0}),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("num_questions"));

        // Grade it: a perfect score at Medium moves up to Hard.
        let (status, body) = post(
            &client,
            format!("{base}/quiz/grade"),
            json!({
                "context_id": context_id,
                "quiz": questions,
                "user_answers": ["Cells.", "Mitosis."],
                "difficulty": "Medium",
                "topic": "Cells"
            }),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][1]["user_answer"], "Mitosis.");
        assert_eq!(body["correct"], 2);
        assert_eq!(body["score"], 1.0);
        assert_eq!(body["next_difficulty"], "Hard");

        // Ask a question.
        let (status, body) = post(
            &client,
            format!("{base}/doubt"),
            json!({"context_id": context_id, "question": "How do cells divide?"}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "By mitosis.");

        // Extract topics.
        let (status, body) = post(
            &client,
            format!("{base}/planner/topics"),
            json!({"context_id": context_id}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topics"][0]["name"], "Cells");

        // Create a plan for an exam ten days out.
        let exam_date = Date::today().plus_days(10).to_string();
        let (status, body) = post(
            &client,
            format!("{base}/planner/create"),
            json!({"context_id": context_id, "exam_date": exam_date}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["horizon_days"], 10);
        assert_eq!(body["days"].as_array().unwrap().len(), 10);
        assert_eq!(body["degenerate"], false);
        assert_eq!(body["summary"], "Mitosis first, cells are already mastered.");
        assert_eq!(body["days"][0]["topics"][0], "Mitosis");
        let plan_id = body["plan_id"].as_i64().unwrap();

        // Fetch it back.
        let response = client.get(format!("{base}/planner/{plan_id}")).send().await?;
        assert!(response.status().is_success());
        let stored = response.json::<Value>().await?;
        assert_eq!(stored["plan_id"], plan_id);
        assert_eq!(stored["days"], body["days"]);

        // And as a page.
        let response = client
            .get(format!("{base}/planner/{plan_id}/view"))
            .send()
            .await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        assert!(html.contains("Revision plan"));
        assert!(html.contains("Mitosis"));

        // Performance statistics.
        let response = client
            .get(format!("{base}/performance/{context_id}"))
            .send()
            .await?;
        let body = response.json::<Value>().await?;
        assert_eq!(body["total_quizzes"], 1);
        assert_eq!(body["average_quiz_score"], 1.0);
        assert_eq!(body["total_flashcards"], 2);
        assert_eq!(body["mastered_flashcards"], 1);
        assert_eq!(body["topic_performance"]["Cells"], 1.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_errors() -> Fallible<()> {
        let base = start().await?;
        let client = Client::new();
        let unknown = crate::types::document_id::DocumentId::of_text("unknown").to_hex();

        let (status, body) = post(
            &client,
            format!("{base}/doubt"),
            json!({"context_id": unknown, "question": "Why?"}),
        )
        .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Document not found.");

        let (status, _) = post(
            &client,
            format!("{base}/planner/create"),
            json!({"context_id": "not-an-id"}),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = post(
            &client,
            format!("{base}/flashcards/review"),
            json!({"flashcard_id": unknown, "correct": true}),
        )
        .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Flashcard not found.");

        let response = client.get(format!("{base}/planner/999")).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.json::<Value>().await?;
        assert_eq!(body["detail"], "Plan not found.");

        let response = client.get(format!("{base}/herp-derp")).send().await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
