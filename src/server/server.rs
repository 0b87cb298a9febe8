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

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::gateway::Gateway;
use crate::gateway::openai::OpenAiOracle;
use crate::server::documents;
use crate::server::error::ApiError;
use crate::server::flashcards;
use crate::server::planner;
use crate::server::quiz;
use crate::server::state::ServerState;

pub async fn start_server(
    directory: Option<String>,
    port: Option<u16>,
    open_browser: bool,
) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    log::debug!("Serving data from {}.", collection.directory.display());
    let config = collection.config;
    let oracle = Arc::new(OpenAiOracle::from_env(&config.oracle)?);
    let state = ServerState {
        db: collection.db,
        gateway: Gateway::new(oracle, &config.oracle),
        planner: config.planner,
    };
    let port = port.unwrap_or(config.server.port);
    let bind = format!("{}:{port}", config.server.bind);

    if open_browser {
        // Start a separate task to open the browser.
        let url = format!("http://{bind}/");
        let probe = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&probe).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            if let Err(e) = open::that(&url) {
                log::warn!("Failed to open {url}: {e}");
            }
        });
    }

    serve(state, &bind).await
}

/// Serve the API on `bind` until the process is stopped.
pub async fn serve(state: ServerState, bind: &str) -> Fallible<()> {
    let app = router(state);
    log::info!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(documents::root));
    let app = app.route("/upload", post(documents::upload));
    let app = app.route("/documents", get(documents::list_documents));
    let app = app.route("/flashcards", post(flashcards::generate_flashcards));
    let app = app.route("/flashcards/review", post(flashcards::review_flashcard));
    let app = app.route("/quiz/generate", post(quiz::generate_quiz));
    let app = app.route("/quiz/grade", post(quiz::grade_quiz));
    let app = app.route("/doubt", post(quiz::ask_doubt));
    let app = app.route("/planner/topics", post(planner::extract_topics));
    let app = app.route("/planner/create", post(planner::create));
    let app = app.route("/planner/{plan_id}", get(planner::get_plan));
    let app = app.route("/planner/{plan_id}/view", get(planner::view_plan));
    let app = app.route("/performance/{context_id}", get(planner::performance));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound("Not Found")
}
