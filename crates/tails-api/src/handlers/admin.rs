//! Admin console: dashboard counts, account flags, reference metadata.
//! Every handler takes an [`AdminUser`].

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tails_core::{admin::DashboardCounts, store::TailsStore, user::User};

use crate::{
  AppState,
  auth::AdminUser,
  error::ApiError,
  extract::{Json, Path},
};

/// `GET /admin/dashboard`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<axum::Json<DashboardCounts>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let counts = state.store.dashboard_counts().await.map_err(ApiError::store)?;
  Ok(axum::Json(counts))
}

/// `GET /admin/users`
pub async fn list_users<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<axum::Json<Vec<User>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let users = state.store.list_users().await.map_err(ApiError::store)?;
  Ok(axum::Json(users))
}

#[derive(Debug, Deserialize)]
pub struct AdminFlagBody {
  pub is_admin: bool,
}

/// `PATCH /admin/users/{id}`: `{"is_admin": bool}`
pub async fn set_admin<S>(
  State(state): State<AppState<S>>,
  admin: AdminUser,
  Path(user_id): Path<i64>,
  Json(body): Json<AdminFlagBody>,
) -> Result<axum::Json<User>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  if user_id == admin.id && !body.is_admin {
    return Err(ApiError::bad_request("admins cannot revoke their own admin flag"));
  }
  let user = state
    .store
    .set_admin(user_id, body.is_admin)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(user))
}

#[derive(Debug, Deserialize)]
pub struct TypeBody {
  pub name: String,
}

/// `POST /admin/types`
pub async fn create_type<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Json(body): Json<TypeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let created = state
    .store
    .create_type(body.name)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(created)))
}

/// `DELETE /admin/types/{id}`
pub async fn delete_type<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  state.store.delete_type(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BreedBody {
  pub type_id: i64,
  pub name:    String,
}

/// `POST /admin/breeds`
pub async fn create_breed<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Json(body): Json<BreedBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let created = state
    .store
    .create_breed(body.type_id, body.name)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(created)))
}

/// `DELETE /admin/breeds/{id}`
pub async fn delete_breed<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  state.store.delete_breed(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
