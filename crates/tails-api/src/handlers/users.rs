//! Handlers for the caller's adopter profile.

use axum::extract::State;
use serde::Serialize;
use tails_core::{
  store::TailsStore,
  user::{ProfileInput, UserProfile},
};

use crate::{AppState, auth::AuthUser, error::ApiError, extract::Json};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
  /// `null` until the user saves a profile.
  pub profile: Option<UserProfile>,
}

/// `GET /users/me/profile`
pub async fn get_profile<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<ProfileResponse>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let profile = state
    .store
    .get_profile(caller.id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(ProfileResponse { profile }))
}

/// `PUT /users/me/profile`: replaces the whole profile.
pub async fn put_profile<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Json(input): Json<ProfileInput>,
) -> Result<axum::Json<UserProfile>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let profile = state
    .store
    .upsert_profile(caller.id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(profile))
}
