//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | `{email, password, name}` → 201 `{token, user}` |
//! | `POST` | `/auth/login` | `{email, password}` → `{token, user}` |
//! | `GET`  | `/auth/me` | The caller's account |
//! | `GET`  | `/auth/google` | 303 to Google; 404 when not configured |
//! | `GET`  | `/auth/google/callback` | `?code=&state=` → `{token, user}` |

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tails_core::{
  store::TailsStore,
  user::{Identity, NewUser, User, normalize_email},
};

use crate::{
  AppState,
  auth::{AuthUser, MIN_PASSWORD_LEN, hash_password, verify_password},
  error::ApiError,
  extract::{Json, Query},
  oauth::{self, GoogleConfig},
};

const BAD_CREDENTIALS: &str = "invalid email or password";

#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  User,
}

fn session<S: TailsStore>(state: &AppState<S>, user: User) -> Result<AuthResponse, ApiError> {
  let token = state.tokens.issue(user.id)?;
  Ok(AuthResponse { token, user })
}

// ─── Password accounts ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:    String,
  pub password: String,
  pub name:     String,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  if body.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::bad_request(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  // Validate before paying for the hash.
  let probe = NewUser::new(&body.email, &body.name, Identity::Password(String::new()))?;
  let input = NewUser { identity: Identity::Password(hash_password(&body.password)?), ..probe };

  let user = state.store.create_user(input).await.map_err(ApiError::store)?;
  tracing::info!(user_id = user.id, "account registered");
  Ok((StatusCode::CREATED, axum::Json(session(&state, user)?)))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
///
/// Unknown email, Google-only account and wrong password all produce the
/// same 401.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<axum::Json<AuthResponse>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let email = normalize_email(&body.email).map_err(|_| ApiError::unauthorized(BAD_CREDENTIALS))?;
  let creds = state
    .store
    .credentials_by_email(email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

  let verified = creds
    .password_hash
    .as_deref()
    .is_some_and(|phc| verify_password(&body.password, phc));
  if !verified {
    return Err(ApiError::unauthorized(BAD_CREDENTIALS));
  }

  let user = state
    .store
    .get_user(creds.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;
  Ok(axum::Json(session(&state, user)?))
}

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  caller: AuthUser,
) -> Result<axum::Json<User>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(caller.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
  Ok(axum::Json(user))
}

// ─── Google ──────────────────────────────────────────────────────────────────

fn google_config<S: TailsStore>(state: &AppState<S>) -> Result<&GoogleConfig, ApiError> {
  state
    .config
    .google
    .as_ref()
    .ok_or_else(|| ApiError::NotFound("google sign-in is not configured".into()))
}

/// `GET /auth/google`
pub async fn google_start<S>(State(state): State<AppState<S>>) -> Result<Redirect, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let config = google_config(&state)?;
  let url = oauth::authorize_url(config, &state.tokens.issue_oauth_state()?)?;
  Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
  pub code:  Option<String>,
  pub state: Option<String>,
  pub error: Option<String>,
}

/// `GET /auth/google/callback?code=&state=`
pub async fn google_callback<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<CallbackParams>,
) -> Result<axum::Json<AuthResponse>, ApiError>
where
  S: TailsStore + Clone + 'static,
{
  let config = google_config(&state)?;
  if let Some(error) = params.error {
    return Err(ApiError::unauthorized(format!("google sign-in was cancelled: {error}")));
  }
  let signed = params.state.as_deref().unwrap_or_default();
  if !state.tokens.verify_oauth_state(signed) {
    return Err(ApiError::unauthorized("invalid or expired sign-in state"));
  }
  let code = params
    .code
    .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

  let identity = oauth::exchange_code(&state.http, config, &code).await?;
  let email = normalize_email(&identity.email)?;
  let user = state
    .store
    .find_or_create_google_user(identity.sub, email, identity.name)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user_id = user.id, "google sign-in");
  Ok(axum::Json(session(&state, user)?))
}
