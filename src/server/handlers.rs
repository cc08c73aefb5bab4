use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::errors::ChatError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "started_at": state.started_at.to_rfc3339(),
    }))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ChatError> {
    let session_id = state.create_session();
    tracing::info!(session_id = %session_id, "session created");
    Ok(Json(json!({ "session": { "id": session_id } })))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ChatError> {
    let mut result: Vec<Value> = Vec::new();
    for (id, session) in state.sessions_snapshot() {
        let session = session.lock().await;
        result.push(json!({
            "id": id,
            "created_at": session.created_at.to_rfc3339(),
            "turn_count": session.orchestrator.memory().len(),
        }));
    }
    Ok(Json(json!({ "sessions": result })))
}

pub async fn get_session_messages(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatError> {
    let session = state
        .session(&session_id)
        .ok_or_else(|| ChatError::NotFound(format!("session not found: {}", session_id)))?;

    let session = session.lock().await;
    let messages: Vec<Value> = session
        .orchestrator
        .memory()
        .entries()
        .into_iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect();

    Ok(Json(json!({ "messages": messages })))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ChatError> {
    if !state.remove_session(&session_id) {
        return Err(ChatError::NotFound(format!("session not found: {}", session_id)));
    }
    Ok(Json(json!({ "success": true })))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let outcome = state.submit_question(&session_id, &payload.question).await?;

    let sources: Vec<Value> = outcome
        .sources
        .iter()
        .map(|scored| {
            json!({
                "source": scored.chunk.source,
                "chunk_index": scored.chunk.index,
                "score": scored.score,
            })
        })
        .collect();

    Ok(Json(json!({
        "answer": outcome.answer,
        "standalone_question": outcome.standalone_question,
        "condenser_fallback": outcome.condenser_fallback,
        "sources": sources,
    })))
}
