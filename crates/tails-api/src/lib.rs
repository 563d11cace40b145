//! JSON REST API for Happy Tails.
//!
//! Exposes an axum [`Router`] backed by any [`TailsStore`]. The store handle,
//! token keys and upload directory are created once at startup and threaded
//! through [`AppState`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod oauth;
pub mod uploads;

pub use error::ApiError;

use std::{io, path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  http::{HeaderValue, Method, header},
  routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tails_core::{listing::MAX_IMAGES, store::TailsStore};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use auth::TokenKeys;
use handlers::{adoptables, adoption, admin, meta, messages, pets, users};
use oauth::GoogleConfig;
use uploads::{UploadKind, UploadStore};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `tails.toml` and
/// `TAILS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  pub upload_dir:       PathBuf,
  pub jwt_secret:       String,
  pub token_ttl_days:   u64,
  /// Per-file limit for uploads.
  pub max_upload_bytes: usize,
  /// Allowed CORS origins; empty allows any origin.
  #[serde(default)]
  pub cors_origins:     Vec<String>,
  /// Google sign-in is disabled when absent.
  #[serde(default)]
  pub google:           Option<GoogleConfig>,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: TailsStore> {
  pub store:   Arc<S>,
  pub config:  Arc<ServerConfig>,
  pub tokens:  Arc<TokenKeys>,
  pub uploads: Arc<UploadStore>,
  pub http:    reqwest::Client,
}

impl<S: TailsStore> AppState<S> {
  /// Build the state, creating the upload directories if needed.
  pub async fn new(store: S, config: ServerConfig) -> io::Result<Self> {
    let ttl = Duration::from_secs(config.token_ttl_days.saturating_mul(24 * 60 * 60));
    let tokens = TokenKeys::new(config.jwt_secret.as_bytes(), ttl);
    let uploads = UploadStore::open(&config.upload_dir, config.max_upload_bytes).await?;
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(io::Error::other)?;

    Ok(Self {
      store: Arc::new(store),
      config: Arc::new(config),
      tokens: Arc::new(tokens),
      uploads: Arc::new(uploads),
      http,
    })
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full API router, including static listing images under
/// `/uploads/adoptables`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TailsStore + Clone + 'static,
{
  // A multipart body may carry a full set of images plus the JSON part.
  let body_limit = state.uploads.max_file_bytes().saturating_mul(MAX_IMAGES + 1);
  let images_dir = state.uploads.root().join(UploadKind::Adoptable.dir());
  let cors = cors_layer(&state.config.cors_origins);

  Router::new()
    .route("/health", get(health))
    // Auth
    .route("/auth/register", post(handlers::auth::register::<S>))
    .route("/auth/login", post(handlers::auth::login::<S>))
    .route("/auth/me", get(handlers::auth::me::<S>))
    .route("/auth/google", get(handlers::auth::google_start::<S>))
    .route("/auth/google/callback", get(handlers::auth::google_callback::<S>))
    // Profile
    .route(
      "/users/me/profile",
      get(users::get_profile::<S>).put(users::put_profile::<S>),
    )
    // Reference metadata
    .route("/types", get(meta::list_types::<S>))
    .route("/types/{id}/breeds", get(meta::list_breeds::<S>))
    // Listings
    .route("/adoptables", get(adoptables::search::<S>).post(adoptables::create::<S>))
    .route("/adoptables/mine", get(adoptables::mine::<S>))
    .route(
      "/adoptables/{id}",
      get(adoptables::get_one::<S>)
        .put(adoptables::update::<S>)
        .delete(adoptables::remove::<S>),
    )
    .route("/adoptables/{id}/images", post(adoptables::add_images::<S>))
    // Adoption workflow
    .route("/adoption/apply", post(adoption::apply::<S>))
    .route("/adoption/my-applications", get(adoption::mine::<S>))
    .route("/adoption/incoming", get(adoption::incoming::<S>))
    .route("/adoption/status/{id}", patch(adoption::set_status::<S>))
    .route(
      "/adoption/{id}",
      get(adoption::get_one::<S>).delete(adoption::withdraw::<S>),
    )
    // Messages
    .route("/messages", get(messages::list::<S>).post(messages::send::<S>))
    .route("/messages/unread", get(messages::unread::<S>))
    // Owned pets
    .route("/pets", get(pets::list::<S>).post(pets::create::<S>))
    .route(
      "/pets/{id}",
      get(pets::get_one::<S>).put(pets::update::<S>).delete(pets::remove::<S>),
    )
    .route(
      "/pets/{id}/medical",
      get(pets::list_medical::<S>).post(pets::upload_medical::<S>),
    )
    .route(
      "/pets/{id}/medical/{file_id}",
      get(pets::download_medical::<S>).delete(pets::delete_medical::<S>),
    )
    .route("/pets/{id}/stats", get(pets::list_stats::<S>).post(pets::add_stat::<S>))
    .route("/pets/{id}/stats/{stat_id}", delete(pets::delete_stat::<S>))
    // Admin
    .route("/admin/dashboard", get(admin::dashboard::<S>))
    .route("/admin/users", get(admin::list_users::<S>))
    .route("/admin/users/{id}", patch(admin::set_admin::<S>))
    .route("/admin/types", post(admin::create_type::<S>))
    .route("/admin/types/{id}", delete(admin::delete_type::<S>))
    .route("/admin/breeds", post(admin::create_breed::<S>))
    .route("/admin/breeds/{id}", delete(admin::delete_breed::<S>))
    // Static listing images
    .nest_service("/uploads/adoptables", ServeDir::new(images_dir))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

fn cors_layer(origins: &[String]) -> CorsLayer {
  if origins.is_empty() {
    return CorsLayer::permissive();
  }
  let origins: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|origin| match origin.parse() {
      Ok(value) => Some(value),
      Err(_) => {
        tracing::warn!(%origin, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();
  CorsLayer::new()
    .allow_origin(origins)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::PATCH,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests;
