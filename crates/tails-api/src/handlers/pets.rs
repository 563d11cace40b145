//! Handlers for owned pets and their health records. Every route is
//! restricted to the pet's owner.

use axum::{
  extract::{Multipart, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use serde::Deserialize;
use tails_core::{
  pet::{
    HealthStat, MedicalFile, NewHealthStat, NewMedicalFile, NewPet, Pet,
    PetUpdate, StatMetric,
  },
  store::TailsStore,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Path, Query},
  handlers::MultipartForm,
  uploads::UploadKind,
};

// ─── Pets ────────────────────────────────────────────────────────────────────

/// `POST /pets`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Json(input): Json<NewPet>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let pet = state
    .store
    .create_pet(caller.id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(pet)))
}

/// `GET /pets`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<Vec<Pet>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let pets = state.store.list_pets(caller.id).await.map_err(ApiError::store)?;
  Ok(axum::Json(pets))
}

/// `GET /pets/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
) -> Result<axum::Json<Pet>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let pet = state.store.get_pet(caller.id, id).await.map_err(ApiError::store)?;
  Ok(axum::Json(pet))
}

/// `PUT /pets/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
  Json(update): Json<PetUpdate>,
) -> Result<axum::Json<Pet>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let pet = state
    .store
    .update_pet(caller.id, id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(pet))
}

/// `DELETE /pets/{id}`: medical files are removed in the background.
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let files = state
    .store
    .delete_pet(caller.id, id)
    .await
    .map_err(ApiError::store)?;
  state.uploads.remove(UploadKind::Medical, files);
  Ok(StatusCode::NO_CONTENT)
}

// ─── Medical files ───────────────────────────────────────────────────────────

/// `POST /pets/{id}/medical`: multipart: one `file` part, optional
/// `description` text part.
pub async fn upload_medical<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(pet_id): Path<i64>,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  // Fail before touching the disk if the caller cannot see this pet.
  state
    .store
    .get_pet(caller.id, pet_id)
    .await
    .map_err(ApiError::store)?;

  let form = MultipartForm::read(multipart).await?;
  let file = form
    .files_named("file")
    .next()
    .ok_or_else(|| ApiError::bad_request("missing `file` part"))?;
  let description = form
    .text("description")
    .map(str::trim)
    .filter(|d| !d.is_empty())
    .map(str::to_owned);

  let filename = state
    .uploads
    .save(UploadKind::Medical, &file.content_type, &file.bytes)
    .await?;
  let record = NewMedicalFile {
    filename:      filename.clone(),
    original_name: file.original_name.clone(),
    content_type:  file.content_type.to_ascii_lowercase(),
    description,
  };

  match state.store.add_medical_file(caller.id, pet_id, record).await {
    Ok(saved) => Ok((StatusCode::CREATED, axum::Json(saved))),
    Err(e) => {
      state.uploads.remove(UploadKind::Medical, vec![filename]);
      Err(ApiError::store(e))
    }
  }
}

/// `GET /pets/{id}/medical`
pub async fn list_medical<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(pet_id): Path<i64>,
) -> Result<axum::Json<Vec<MedicalFile>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let files = state
    .store
    .list_medical_files(caller.id, pet_id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(files))
}

/// `GET /pets/{id}/medical/{file_id}`: the stored file as an attachment.
pub async fn download_medical<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path((pet_id, file_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let record = state
    .store
    .list_medical_files(caller.id, pet_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .find(|f| f.id == file_id)
    .ok_or_else(|| ApiError::NotFound(format!("medical file {file_id} not found")))?;

  let bytes = tokio::fs::read(state.uploads.path(UploadKind::Medical, &record.filename))
    .await
    .map_err(|e| match e.kind() {
      std::io::ErrorKind::NotFound => {
        ApiError::NotFound(format!("medical file {file_id} is missing from storage"))
      }
      _ => ApiError::internal(e),
    })?;

  let safe_name: String = record
    .original_name
    .chars()
    .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
    .collect();
  Ok((
    [
      (header::CONTENT_TYPE, record.content_type),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{safe_name}\"")),
    ],
    bytes,
  ))
}

/// `DELETE /pets/{id}/medical/{file_id}`
pub async fn delete_medical<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path((pet_id, file_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let filename = state
    .store
    .delete_medical_file(caller.id, pet_id, file_id)
    .await
    .map_err(ApiError::store)?;
  state.uploads.remove(UploadKind::Medical, vec![filename]);
  Ok(StatusCode::NO_CONTENT)
}

// ─── Health stats ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatParams {
  pub metric: Option<StatMetric>,
}

/// `POST /pets/{id}/stats`
pub async fn add_stat<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(pet_id): Path<i64>,
  Json(input): Json<NewHealthStat>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let stat = state
    .store
    .add_stat(caller.id, pet_id, input)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, axum::Json(stat)))
}

/// `GET /pets/{id}/stats[?metric=<metric>]`
pub async fn list_stats<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(pet_id): Path<i64>,
  Query(params): Query<StatParams>,
) -> Result<axum::Json<Vec<HealthStat>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let stats = state
    .store
    .list_stats(caller.id, pet_id, params.metric)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(stats))
}

/// `DELETE /pets/{id}/stats/{stat_id}`
pub async fn delete_stat<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path((pet_id, stat_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  state
    .store
    .delete_stat(caller.id, pet_id, stat_id)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
