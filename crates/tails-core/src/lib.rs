//! Core types and trait definitions for the Happy Tails adoption service.
//!
//! This crate has no HTTP or database dependencies. Storage backends
//! implement [`store::TailsStore`]; the API layer is generic over it.

pub mod admin;
pub mod adoption;
pub mod error;
pub mod listing;
pub mod message;
pub mod meta;
pub mod pet;
pub mod store;
pub mod user;

pub use error::{Error, Result};
