//! Handlers for per-request messaging. Clients poll; there is no push.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tails_core::{message::Message, store::TailsStore};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Query},
};

#[derive(Debug, Deserialize)]
pub struct ThreadParams {
  pub request_id: i64,
}

/// `GET /messages?request_id=<id>`: oldest first.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Query(params): Query<ThreadParams>,
) -> Result<axum::Json<Vec<Message>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let messages = state
    .store
    .list_messages(caller.id, params.request_id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
  pub request_id: i64,
  pub content:    String,
}

/// `POST /messages`
pub async fn send<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Json(body): Json<SendBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let message = state
    .store
    .send_message(caller.id, body.request_id, body.content)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(message)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
  pub unread: u64,
}

/// `GET /messages/unread`
pub async fn unread<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<UnreadCount>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let unread = state
    .store
    .unread_count(caller.id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(UnreadCount { unread }))
}
