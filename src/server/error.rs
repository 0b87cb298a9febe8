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

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::server::state::ServerState;
use crate::types::document_id::ContentId;
use crate::types::document_id::DocumentId;

/// An error as seen by an HTTP client: a status code and a `detail` message.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(String),
    Internal(ErrorReport),
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, *detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail.as_str()),
            ApiError::Internal(e) => {
                log::error!("Request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, e.message())
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<ErrorReport> for ApiError {
    fn from(value: ErrorReport) -> Self {
        ApiError::Internal(value)
    }
}

pub fn parse_id(s: &str) -> Result<ContentId, ApiError> {
    ContentId::from_hex(s.trim()).map_err(|e| ApiError::BadRequest(e.message().to_string()))
}

/// Parse a document id and load the document's text.
pub fn load_document(
    state: &ServerState,
    context_id: &str,
) -> Result<(DocumentId, String), ApiError> {
    let document_id = parse_id(context_id)?;
    match state.db.get_document_text(document_id)? {
        Some(text) => Ok((document_id, text)),
        None => Err(ApiError::NotFound("Document not found.")),
    }
}
