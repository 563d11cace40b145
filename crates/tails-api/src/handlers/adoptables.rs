//! Handlers for `/adoptables` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/adoptables` | Search; see [`SearchParams`] |
//! | `POST`   | `/adoptables` | Multipart: `data` (JSON) + up to 5 `images` |
//! | `GET`    | `/adoptables/mine` | The caller's listings |
//! | `GET`    | `/adoptables/{id}` | 404 if not found |
//! | `PUT`    | `/adoptables/{id}` | Partial JSON update, caretaker only |
//! | `DELETE` | `/adoptables/{id}` | Caretaker only; images removed in the background |
//! | `POST`   | `/adoptables/{id}/images` | Multipart `images`, caretaker only |

use axum::{
  extract::{Multipart, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tails_core::{
  listing::{
    Adoptable, AdoptableUpdate, Gender, ListingQuery, ListingStatus, MAX_IMAGES,
    NewAdoptable, Page,
  },
  store::TailsStore,
};

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{Json, Path, Query},
  handlers::{FilePart, MultipartForm},
  uploads::UploadKind,
};

// ─── Search ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub search:     Option<String>,
  pub type_id:    Option<i64>,
  pub gender:     Option<Gender>,
  pub min_age:    Option<u32>,
  pub max_age:    Option<u32>,
  pub vaccinated: Option<bool>,
  pub status:     Option<ListingStatus>,
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
}

impl From<SearchParams> for ListingQuery {
  fn from(p: SearchParams) -> Self {
    ListingQuery {
      search:     p.search,
      type_id:    p.type_id,
      gender:     p.gender,
      min_age:    p.min_age,
      max_age:    p.max_age,
      vaccinated: p.vaccinated,
      status:     p.status,
      page:       p.page,
      limit:      p.limit,
    }
  }
}

/// `GET /adoptables[?search=&type_id=&gender=&min_age=&max_age=&vaccinated=&status=&page=&limit=]`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<axum::Json<Page<Adoptable>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let query = ListingQuery::from(params);
  let page = state
    .store
    .search_adoptables(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(page))
}

/// `GET /adoptables/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<axum::Json<Adoptable>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let listing = state
    .store
    .get_adoptable(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("adoptable {id} not found")))?;
  Ok(axum::Json(listing))
}

/// `GET /adoptables/mine`
pub async fn mine<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<Vec<Adoptable>>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let listings = state
    .store
    .list_adoptables_by_caretaker(caller.id)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(listings))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Write every image to disk. On failure the files already written are
/// removed before the error is returned.
async fn save_images<'a, S>(
  state: &AppState<S>,
  files: impl Iterator<Item = &'a FilePart>,
) -> Result<Vec<String>, ApiError>
where
  S: TailsStore,
{
  let mut saved = Vec::new();
  for file in files {
    match state.uploads.save(UploadKind::Adoptable, &file.content_type, &file.bytes).await {
      Ok(name) => saved.push(name),
      Err(e) => {
        state.uploads.remove(UploadKind::Adoptable, saved);
        return Err(e);
      }
    }
  }
  Ok(saved)
}

/// `POST /adoptables`: multipart.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  multipart: Multipart,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let form = MultipartForm::read(multipart).await?;
  let data = form
    .text("data")
    .ok_or_else(|| ApiError::bad_request("missing `data` part"))?;
  let input: NewAdoptable = serde_json::from_str(data)
    .map_err(|e| ApiError::bad_request(format!("invalid listing data: {e}")))?;

  if form.files_named("images").count() > MAX_IMAGES {
    return Err(ApiError::bad_request(format!("at most {MAX_IMAGES} images are allowed")));
  }
  let images = save_images(&state, form.files_named("images")).await?;

  match state
    .store
    .create_adoptable(caller.id, input, images.clone())
    .await
  {
    Ok(listing) => {
      tracing::info!(adoptable_id = listing.id, caretaker_id = caller.id, "listing created");
      Ok((StatusCode::CREATED, axum::Json(listing)))
    }
    Err(e) => {
      state.uploads.remove(UploadKind::Adoptable, images);
      Err(ApiError::store(e))
    }
  }
}

/// `PUT /adoptables/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
  Json(update): Json<AdoptableUpdate>,
) -> Result<axum::Json<Adoptable>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let listing = state
    .store
    .update_adoptable(caller.id, id, update)
    .await
    .map_err(ApiError::store)?;
  Ok(axum::Json(listing))
}

/// `POST /adoptables/{id}/images`: multipart.
pub async fn add_images<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
  multipart: Multipart,
) -> Result<axum::Json<Adoptable>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let form = MultipartForm::read(multipart).await?;
  let count = form.files_named("images").count();
  if count == 0 {
    return Err(ApiError::bad_request("no `images` parts were uploaded"));
  }
  if count > MAX_IMAGES {
    return Err(ApiError::bad_request(format!("at most {MAX_IMAGES} images are allowed")));
  }
  let images = save_images(&state, form.files_named("images")).await?;

  match state
    .store
    .add_adoptable_images(caller.id, id, images.clone())
    .await
  {
    Ok(listing) => Ok(axum::Json(listing)),
    Err(e) => {
      state.uploads.remove(UploadKind::Adoptable, images);
      Err(ApiError::store(e))
    }
  }
}

/// `DELETE /adoptables/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let images = state
    .store
    .delete_adoptable(caller.id, id)
    .await
    .map_err(ApiError::store)?;
  state.uploads.remove(UploadKind::Adoptable, images);
  tracing::info!(adoptable_id = id, "listing deleted");
  Ok(StatusCode::NO_CONTENT)
}
