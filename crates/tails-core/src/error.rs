//! Error types for `tails-core`.
//!
//! Every variant describes a rule the caller broke. Storage backends wrap
//! this type and the API layer maps it back to a status code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} not found")]
  NotFound(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Conflict(String),

  #[error("already applied")]
  AlreadyApplied,

  #[error("cannot apply for your own pet")]
  OwnListing,

  #[error("pet is not available for adoption")]
  NotAvailable,

  #[error("cannot change status from {from} to {to}")]
  InvalidTransition { from: String, to: String },
}

impl Error {
  pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }

  pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }

  pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
