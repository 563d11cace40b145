//! Pets a user already owns, with their medical documents and health stats.
//!
//! Every record here is private to the owning user.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{Error, Result, listing::Gender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
  pub id:         i64,
  pub owner_id:   i64,
  pub name:       String,
  pub type_id:    i64,
  pub breed_id:   Option<i64>,
  pub gender:     Option<Gender>,
  pub dob:        Option<NaiveDate>,
  pub notes:      Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPet {
  pub name:     String,
  pub type_id:  i64,
  pub breed_id: Option<i64>,
  pub gender:   Option<Gender>,
  pub dob:      Option<NaiveDate>,
  pub notes:    Option<String>,
}

impl NewPet {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::validation("name is required"));
    }
    Ok(())
  }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetUpdate {
  pub name:     Option<String>,
  pub type_id:  Option<i64>,
  pub breed_id: Option<i64>,
  pub gender:   Option<Gender>,
  pub dob:      Option<NaiveDate>,
  pub notes:    Option<String>,
}

impl PetUpdate {
  pub fn validate(&self) -> Result<()> {
    if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::validation("name cannot be blank"));
    }
    Ok(())
  }
}

// ─── Medical files ───────────────────────────────────────────────────────────

/// A document (vet report, vaccination card, ...) stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalFile {
  pub id:            i64,
  pub pet_id:        i64,
  /// Stored name, relative to the medical upload directory.
  pub filename:      String,
  pub original_name: String,
  pub content_type:  String,
  pub description:   Option<String>,
  pub uploaded_at:   DateTime<Utc>,
}

/// Metadata for a file the API layer has already written to disk.
#[derive(Debug, Clone)]
pub struct NewMedicalFile {
  pub filename:      String,
  pub original_name: String,
  pub content_type:  String,
  pub description:   Option<String>,
}

// ─── Health stats ────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatMetric {
  /// Kilograms.
  Weight,
  /// Centimetres at the shoulder.
  Height,
  /// Degrees Celsius.
  Temperature,
  /// Beats per minute.
  HeartRate,
}

/// One point in a pet's health time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStat {
  pub id:          i64,
  pub pet_id:      i64,
  pub metric:      StatMetric,
  pub value:       f64,
  pub recorded_on: NaiveDate,
  pub note:        Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHealthStat {
  pub metric:      StatMetric,
  pub value:       f64,
  pub recorded_on: NaiveDate,
  pub note:        Option<String>,
}

impl NewHealthStat {
  pub fn validate(&self, today: NaiveDate) -> Result<()> {
    if !self.value.is_finite() || self.value <= 0.0 {
      return Err(Error::validation("value must be a positive number"));
    }
    if self.recorded_on > today {
      return Err(Error::validation("recorded_on cannot be in the future"));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stat(value: f64, recorded_on: NaiveDate) -> NewHealthStat {
    NewHealthStat { metric: StatMetric::Weight, value, recorded_on, note: None }
  }

  #[test]
  fn stat_values_must_be_positive_and_finite() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    assert!(stat(12.5, today).validate(today).is_ok());
    assert!(stat(0.0, today).validate(today).is_err());
    assert!(stat(f64::NAN, today).validate(today).is_err());
    assert!(stat(1.0, today.succ_opt().unwrap()).validate(today).is_err());
  }

  #[test]
  fn metric_names() {
    assert_eq!(StatMetric::HeartRate.as_ref(), "heart_rate");
    assert_eq!("weight".parse::<StatMetric>().unwrap(), StatMetric::Weight);
  }
}
