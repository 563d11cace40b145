//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error renders as `{"msg": "<text>"}` with the matching status code.

use std::error::Error as StdError;

use axum::{
  Json,
  extract::{
    multipart::MultipartError,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
  pub fn bad_request(msg: impl Into<String>) -> Self { Self::BadRequest(msg.into()) }

  pub fn unauthorized(msg: impl Into<String>) -> Self { Self::Unauthorized(msg.into()) }

  pub fn internal(err: impl StdError + Send + Sync + 'static) -> Self {
    Self::Internal(Box::new(err))
  }

  /// Convert a store error, recovering the domain error kind if one sits
  /// anywhere in its `source()` chain.
  pub fn store<E>(err: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    let mut current: Option<&(dyn StdError + 'static)> = Some(&err);
    while let Some(e) = current {
      if let Some(core) = e.downcast_ref::<tails_core::Error>() {
        return Self::from_core(core);
      }
      current = e.source();
    }
    Self::internal(err)
  }

  fn from_core(err: &tails_core::Error) -> Self {
    use tails_core::Error as E;
    let msg = err.to_string();
    match err {
      E::NotFound(_) => Self::NotFound(msg),
      E::Forbidden(_) => Self::Forbidden(msg),
      E::Conflict(_) => Self::Conflict(msg),
      E::Validation(_)
      | E::AlreadyApplied
      | E::OwnListing
      | E::NotAvailable
      | E::InvalidTransition { .. } => Self::BadRequest(msg),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::Forbidden(_) => StatusCode::FORBIDDEN,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<tails_core::Error> for ApiError {
  fn from(err: tails_core::Error) -> Self { Self::from_core(&err) }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<MultipartError> for ApiError {
  fn from(err: MultipartError) -> Self { Self::BadRequest(err.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        "internal server error".to_owned()
      }
      other => other.to_string(),
    };
    (status, Json(json!({ "msg": message }))).into_response()
  }
}
