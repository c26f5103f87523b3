use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::types::StatusReply;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::state::ServerState;

#[derive(Serialize, Deserialize, Debug)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
}

/// `POST /kv/set`: credential is the raw `Authorization` header value.
pub async fn set_value(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<StatusReply<&'static str>>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // UTF-8, not just visible ASCII, so non-ASCII passwords can match
    let credential = headers
        .get(AUTHORIZATION)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .unwrap_or_default();

    state.kv.set(payload.key, payload.value, credential).await?;
    Ok(Json(StatusReply { status: "success" }))
}

/// `GET /kv/get/:key`: the raw value as text.
pub async fn get_value(State(state): State<ServerState>, Path(key): Path<String>) -> Result<Response, ApiError> {
    match state.kv.get(&key).await {
        Some(value) => Ok((StatusCode::OK, value).into_response()),
        None => Err(ApiError::KeyNotFound),
    }
}

pub async fn get_keys(State(state): State<ServerState>) -> Json<Vec<String>> {
    Json(state.kv.list_keys().await)
}

/// `GET /kv/is-valid/:password`: `{"status": true}` only on an exact match.
pub async fn is_valid(State(state): State<ServerState>, Path(password): Path<String>) -> Json<StatusReply<bool>> {
    Json(StatusReply { status: state.kv.check_credential(&password) })
}
