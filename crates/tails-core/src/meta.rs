//! Reference metadata: pet types and the breeds within each type.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetType {
  pub id:   i64,
  pub name: String,
}

/// A breed belongs to exactly one [`PetType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetBreed {
  pub id:      i64,
  pub type_id: i64,
  pub name:    String,
}

/// Trim a type or breed name and reject blanks.
pub fn clean_name(raw: &str) -> Result<String> {
  let name = raw.trim();
  if name.is_empty() || name.len() > 60 {
    return Err(Error::validation("name must be 1-60 characters"));
  }
  Ok(name.to_owned())
}
