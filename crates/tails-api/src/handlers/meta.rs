//! Public reference metadata: pet types and breeds.

use axum::extract::State;
use tails_core::{
  meta::{PetBreed, PetType},
  store::TailsStore,
};

use crate::{AppState, error::ApiError, extract::Path};

/// `GET /types`
pub async fn list_types<S>(
  State(state): State<AppState<S>>,
) -> Result<axum::Json<Vec<PetType>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let types = state.store.list_types().await.map_err(ApiError::store)?;
  Ok(axum::Json(types))
}

/// `GET /types/{id}/breeds`
pub async fn list_breeds<S>(
  State(state): State<AppState<S>>,
  Path(type_id): Path<i64>,
) -> Result<axum::Json<Vec<PetBreed>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let breeds = state
    .store
    .list_breeds(Some(type_id))
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(breeds))
}
