//! Google OAuth 2.0 authorization-code flow.
//!
//! `GET /auth/google` redirects to Google's consent screen with a signed,
//! short-lived `state`; the callback checks that `state`, exchanges the code
//! for an access token, and reads the OpenID userinfo document.

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::ApiError;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// OAuth client registration, from the `[google]` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
  pub client_id:     String,
  pub client_secret: String,
  /// Must match a redirect URI registered with Google, and route to
  /// `/auth/google/callback`.
  pub redirect_url:  String,
}

/// The verified Google account behind a completed login.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
  pub sub:   String,
  pub email: String,
  pub name:  String,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
  sub:            String,
  email:          Option<String>,
  #[serde(default)]
  email_verified: bool,
  name:           Option<String>,
}

/// The consent-screen URL to redirect the browser to.
pub fn authorize_url(config: &GoogleConfig, state: &str) -> Result<Url, ApiError> {
  Url::parse_with_params(AUTHORIZE_URL, &[
    ("client_id", config.client_id.as_str()),
    ("redirect_uri", config.redirect_url.as_str()),
    ("response_type", "code"),
    ("scope", "openid email profile"),
    ("state", state),
  ])
  .map_err(ApiError::internal)
}

/// Trade an authorization code for the caller's Google identity.
pub async fn exchange_code(
  client: &Client,
  config: &GoogleConfig,
  code: &str,
) -> Result<GoogleIdentity, ApiError> {
  let resp = client
    .post(TOKEN_URL)
    .form(&[
      ("code", code),
      ("client_id", config.client_id.as_str()),
      ("client_secret", config.client_secret.as_str()),
      ("redirect_uri", config.redirect_url.as_str()),
      ("grant_type", "authorization_code"),
    ])
    .send()
    .await
    .map_err(ApiError::internal)?;

  if !resp.status().is_success() {
    tracing::warn!(status = %resp.status(), "google token exchange rejected");
    return Err(ApiError::unauthorized("google sign-in failed"));
  }
  let token: TokenResponse = resp.json().await.map_err(ApiError::internal)?;

  let info: UserInfo = client
    .get(USERINFO_URL)
    .bearer_auth(&token.access_token)
    .send()
    .await
    .and_then(|r| r.error_for_status())
    .map_err(ApiError::internal)?
    .json()
    .await
    .map_err(ApiError::internal)?;

  let email = match info.email {
    Some(email) if info.email_verified => email,
    _ => return Err(ApiError::unauthorized("google account has no verified email")),
  };
  let name = info
    .name
    .filter(|n| !n.trim().is_empty())
    .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_owned());

  Ok(GoogleIdentity { sub: info.sub, email, name })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn authorize_url_carries_client_and_state() {
    let config = GoogleConfig {
      client_id:     "client-123".into(),
      client_secret: "secret".into(),
      redirect_url:  "http://localhost:8080/auth/google/callback".into(),
    };
    let url = authorize_url(&config, "signed-state").unwrap();
    let pairs: Vec<(String, String)> = url
      .query_pairs()
      .map(|(k, v)| (k.into_owned(), v.into_owned()))
      .collect();

    assert_eq!(url.host_str(), Some("accounts.google.com"));
    assert!(pairs.contains(&("client_id".into(), "client-123".into())));
    assert!(pairs.contains(&("state".into(), "signed-state".into())));
    assert!(pairs.contains(&(
      "redirect_uri".into(),
      "http://localhost:8080/auth/google/callback".into()
    )));
  }
}
