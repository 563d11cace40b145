//! Bearer-token authentication: JWT issuing and validation, argon2 password
//! hashing, and the [`AuthUser`] / [`AdminUser`] extractors.

use std::time::Duration;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  get_current_timestamp,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use tails_core::store::TailsStore;

use crate::{AppState, error::ApiError};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

const OAUTH_STATE_SUBJECT: &str = "google-oauth-state";
const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);

// ─── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  /// The user id, as a decimal string.
  pub sub: String,
  pub iat: u64,
  pub exp: u64,
}

/// HS256 signing and verification keys derived from the shared secret.
pub struct TokenKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl TokenKeys {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  fn sign(&self, sub: String, ttl: Duration) -> Result<String, ApiError> {
    let iat = get_current_timestamp();
    let claims = Claims { sub, iat, exp: iat + ttl.as_secs() };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(ApiError::internal)
  }

  fn claims(&self, token: &str) -> Option<Claims> {
    decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
      .ok()
      .map(|data| data.claims)
  }

  /// Issue a session token for `user_id`.
  pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
    self.sign(user_id.to_string(), self.ttl)
  }

  /// The user id carried by a valid, unexpired session token.
  pub fn verify(&self, token: &str) -> Option<i64> {
    self.claims(token)?.sub.parse().ok()
  }

  /// A short-lived signed value for the OAuth `state` parameter.
  pub fn issue_oauth_state(&self) -> Result<String, ApiError> {
    self.sign(OAUTH_STATE_SUBJECT.to_owned(), OAUTH_STATE_TTL)
  }

  pub fn verify_oauth_state(&self, state: &str) -> bool {
    self
      .claims(state)
      .is_some_and(|c| c.sub == OAUTH_STATE_SUBJECT)
  }
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}").into()))
}

/// `false` for a wrong password and for a malformed stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// An authenticated caller. Rejects with 401 when the bearer token is
/// missing, malformed or expired.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
  pub id: i64,
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: TailsStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
    let id = state
      .tokens
      .verify(token)
      .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;
    Ok(AuthUser { id })
  }
}

/// An authenticated caller whose account currently carries the admin flag.
///
/// The flag is read from the store on every request, so revoking admin
/// takes effect immediately.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
  pub id: i64,
}

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: TailsStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let AuthUser { id } = AuthUser::from_request_parts(parts, state).await?;
    let user = state
      .store
      .get_user(id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;
    if !user.is_admin {
      return Err(ApiError::Forbidden("admin access required".into()));
    }
    Ok(AdminUser { id })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn keys() -> TokenKeys { TokenKeys::new(b"test-secret", Duration::from_secs(3600)) }

  #[test]
  fn token_round_trips_user_id() {
    let keys = keys();
    let token = keys.issue(42).unwrap();
    assert_eq!(keys.verify(&token), Some(42));
  }

  #[test]
  fn token_signed_with_other_secret_is_rejected() {
    let other = TokenKeys::new(b"another-secret", Duration::from_secs(3600));
    let token = other.issue(42).unwrap();
    assert_eq!(keys().verify(&token), None);
  }

  #[test]
  fn expired_token_is_rejected() {
    let keys = keys();
    let claims = Claims { sub: "7".into(), iat: 0, exp: 1 };
    let stale = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).unwrap();
    assert_eq!(keys.verify(&stale), None);
  }

  #[test]
  fn oauth_state_is_not_a_session_token() {
    let keys = keys();
    let state = keys.issue_oauth_state().unwrap();
    assert!(keys.verify_oauth_state(&state));
    assert_eq!(keys.verify(&state), None);

    let session = keys.issue(1).unwrap();
    assert!(!keys.verify_oauth_state(&session));
  }

  #[test]
  fn password_hash_verifies() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("wrong horse", &hash));
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn bearer_prefix_is_required() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
    assert_eq!(bearer_token(&headers), None);
    headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
    assert_eq!(bearer_token(&headers), Some("abc.def"));
  }
}
