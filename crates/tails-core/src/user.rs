//! Users, their credentials, and the adopter profile reviewed by caretakers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{Error, Result};

// ─── Account ─────────────────────────────────────────────────────────────────

/// A registered account. Any user can act as caretaker, adopter, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:            i64,
  pub email:         String,
  pub name:          String,
  pub is_admin:      bool,
  /// Whether a local password is set (false for Google-only accounts).
  pub has_password:  bool,
  pub google_linked: bool,
  pub created_at:    DateTime<Utc>,
}

/// What the login path needs; never serialised to clients.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user_id:       i64,
  /// PHC string, `None` for accounts created through Google.
  pub password_hash: Option<String>,
  pub is_admin:      bool,
}

/// How a new account proves who it is.
#[derive(Debug, Clone)]
pub enum Identity {
  /// PHC string produced by the API layer's password hasher.
  Password(String),
  /// Google's stable `sub` claim.
  Google(String),
}

/// Input to [`crate::store::TailsStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:    String,
  pub name:     String,
  pub identity: Identity,
}

impl NewUser {
  pub fn new(email: &str, name: &str, identity: Identity) -> Result<Self> {
    let email = normalize_email(email)?;
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::validation("name is required"));
    }
    Ok(Self { email, name: name.to_owned(), identity })
  }
}

/// Trim and lower-case an email address, rejecting obviously malformed ones.
pub fn normalize_email(raw: &str) -> Result<String> {
  let email = raw.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
      Ok(email)
    }
    _ => Err(Error::validation("a valid email is required")),
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HousingType {
  House,
  Apartment,
  Condo,
  Farm,
  Other,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExperienceLevel {
  FirstTime,
  Moderate,
  Experienced,
}

/// Background an adopter shares so caretakers can review applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:        i64,
  pub occupation:     Option<String>,
  pub housing_type:   Option<HousingType>,
  pub has_yard:       bool,
  pub experience:     Option<ExperienceLevel>,
  pub household_size: Option<u32>,
  /// Free text describing animals already in the household.
  pub other_pets:     Option<String>,
  pub about:          Option<String>,
  pub updated_at:     DateTime<Utc>,
}

/// Input to [`crate::store::TailsStore::upsert_profile`]; replaces every field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
  pub occupation:     Option<String>,
  pub housing_type:   Option<HousingType>,
  #[serde(default)]
  pub has_yard:       bool,
  pub experience:     Option<ExperienceLevel>,
  pub household_size: Option<u32>,
  pub other_pets:     Option<String>,
  pub about:          Option<String>,
}

impl ProfileInput {
  pub fn validate(&self) -> Result<()> {
    if self.household_size == Some(0) {
      return Err(Error::validation("household_size must be at least 1"));
    }
    if self.about.as_deref().is_some_and(|a| a.len() > 4000) {
      return Err(Error::validation("about is too long"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_is_normalised() {
    assert_eq!(
      normalize_email("  Jo@Example.COM ").unwrap(),
      "jo@example.com"
    );
  }

  #[test]
  fn malformed_emails_are_rejected() {
    for bad in ["", "jo", "@example.com", "jo@localhost"] {
      assert!(normalize_email(bad).is_err(), "{bad:?} accepted");
    }
  }

  #[test]
  fn new_user_requires_name() {
    let err = NewUser::new("jo@example.com", "   ", Identity::Google("x".into()));
    assert!(matches!(err, Err(Error::Validation(_))));
  }

  #[test]
  fn housing_type_text_form() {
    assert_eq!(HousingType::Apartment.as_ref(), "apartment");
    assert_eq!(
      "first_time".parse::<ExperienceLevel>().unwrap(),
      ExperienceLevel::FirstTime
    );
  }
}
