//! Handlers for the adoption application workflow.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/adoption/apply` | `{adoptable_id, message}` → 201 |
//! | `GET`    | `/adoption/my-applications` | Applications the caller submitted |
//! | `GET`    | `/adoption/incoming` | Applications on the caller's listings |
//! | `GET`    | `/adoption/{id}` | Adopter or caretaker only |
//! | `DELETE` | `/adoption/{id}` | Adopter withdraws a pending application |
//! | `PATCH`  | `/adoption/status/{id}` | `{status}`, caretaker only |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tails_core::{
  adoption::{
    AdoptionRequest, ApplicationSummary, IncomingApplication, RequestStatus,
  },
  store::TailsStore,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Path},
};

#[derive(Debug, Deserialize)]
pub struct ApplyBody {
  pub adoptable_id: i64,
  #[serde(default)]
  pub message:      String,
}

/// `POST /adoption/apply`
pub async fn apply<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Json(body): Json<ApplyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let request = state
    .store
    .apply(caller.id, body.adoptable_id, body.message)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(request)))
}

/// `GET /adoption/my-applications`
pub async fn mine<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<Vec<ApplicationSummary>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let applications = state
    .store
    .applications_by_adopter(caller.id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(applications))
}

/// `GET /adoption/incoming`
pub async fn incoming<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<Vec<IncomingApplication>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let applications = state
    .store
    .incoming_applications(caller.id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(applications))
}

/// `GET /adoption/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
) -> Result<axum::Json<AdoptionRequest>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let request = state
    .store
    .get_application(caller.id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(request))
}

/// `DELETE /adoption/{id}`
pub async fn withdraw<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  state
    .store
    .withdraw_application(caller.id, id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: RequestStatus,
}

/// `PATCH /adoption/status/{id}`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
  Json(body): Json<StatusBody>,
) -> Result<axum::Json<AdoptionRequest>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let request = state
    .store
    .set_request_status(caller.id, id, body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(request))
}
