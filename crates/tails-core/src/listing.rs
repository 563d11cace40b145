//! Adoptable listings (pets a caretaker has put up for adoption) and the
//! query type used to browse them.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{Error, Result};

/// Maximum number of images attached to one listing.
pub const MAX_IMAGES: usize = 5;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Gender {
  Male,
  Female,
}

/// Yes / no / not known, used for sterilisation, deworming and house
/// training.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriState {
  Yes,
  No,
  #[default]
  Unknown,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Vaccination {
  Full,
  Partial,
  Unvaccinated,
  #[default]
  Unknown,
}

/// Where a listing is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListingStatus {
  #[default]
  Available,
  Adopted,
  /// An application was approved; the adoption is being finalised.
  Hold,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub street:      Option<String>,
  pub city:        String,
  pub region:      Option<String>,
  pub postal_code: Option<String>,
  pub country:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adoptable {
  pub id:            i64,
  pub caretaker_id:  i64,
  pub name:          String,
  pub gender:        Gender,
  pub dob:           NaiveDate,
  pub weight_kg:     Option<f64>,
  pub sterilized:    TriState,
  pub vaccinated:    Vaccination,
  pub dewormed:      TriState,
  pub house_trained: TriState,
  pub description:   Option<String>,
  pub status:        ListingStatus,
  pub address:       Address,
  pub type_id:       i64,
  pub type_name:     String,
  pub breed_id:      Option<i64>,
  pub breed_name:    Option<String>,
  /// Stored filenames in upload order; the first is the cover image.
  pub images:        Vec<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Input to [`crate::store::TailsStore::create_adoptable`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdoptable {
  pub name:          String,
  pub gender:        Gender,
  pub dob:           NaiveDate,
  pub weight_kg:     Option<f64>,
  #[serde(default)]
  pub sterilized:    TriState,
  #[serde(default)]
  pub vaccinated:    Vaccination,
  #[serde(default)]
  pub dewormed:      TriState,
  #[serde(default)]
  pub house_trained: TriState,
  pub description:   Option<String>,
  pub address:       Address,
  pub type_id:       i64,
  pub breed_id:      Option<i64>,
}

impl NewAdoptable {
  pub fn validate(&self, today: NaiveDate) -> Result<()> {
    validate_name(&self.name)?;
    validate_dob(self.dob, today)?;
    validate_weight(self.weight_kg)?;
    if self.address.city.trim().is_empty() {
      return Err(Error::validation("address.city is required"));
    }
    Ok(())
  }
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdoptableUpdate {
  pub name:          Option<String>,
  pub gender:        Option<Gender>,
  pub dob:           Option<NaiveDate>,
  pub weight_kg:     Option<f64>,
  pub sterilized:    Option<TriState>,
  pub vaccinated:    Option<Vaccination>,
  pub dewormed:      Option<TriState>,
  pub house_trained: Option<TriState>,
  pub description:   Option<String>,
  pub status:        Option<ListingStatus>,
  pub address:       Option<Address>,
  pub type_id:       Option<i64>,
  pub breed_id:      Option<i64>,
}

impl AdoptableUpdate {
  pub fn validate(&self, today: NaiveDate) -> Result<()> {
    if let Some(name) = &self.name {
      validate_name(name)?;
    }
    if let Some(dob) = self.dob {
      validate_dob(dob, today)?;
    }
    validate_weight(self.weight_kg)?;
    if self
      .address
      .as_ref()
      .is_some_and(|a| a.city.trim().is_empty())
    {
      return Err(Error::validation("address.city is required"));
    }
    Ok(())
  }
}

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::validation("name is required"));
  }
  if name.len() > 100 {
    return Err(Error::validation("name is too long"));
  }
  Ok(())
}

fn validate_dob(dob: NaiveDate, today: NaiveDate) -> Result<()> {
  if dob > today {
    return Err(Error::validation("dob cannot be in the future"));
  }
  Ok(())
}

fn validate_weight(weight: Option<f64>) -> Result<()> {
  match weight {
    Some(w) if !w.is_finite() || w <= 0.0 => {
      Err(Error::validation("weight_kg must be a positive number"))
    }
    _ => Ok(()),
  }
}

// ─── Search ──────────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 50;

/// Parameters for [`crate::store::TailsStore::search_adoptables`].
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
  /// Matched with LIKE against pet name, breed name and type name.
  pub search:     Option<String>,
  pub type_id:    Option<i64>,
  pub gender:     Option<Gender>,
  /// Minimum age in whole years.
  pub min_age:    Option<u32>,
  /// Maximum age in whole years.
  pub max_age:    Option<u32>,
  /// `true` matches fully vaccinated pets only.
  pub vaccinated: Option<bool>,
  pub status:     Option<ListingStatus>,
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
}

impl ListingQuery {
  /// One-based page number.
  pub fn page(&self) -> u32 { self.page.unwrap_or(1).max(1) }

  pub fn limit(&self) -> u32 {
    self
      .limit
      .unwrap_or(DEFAULT_PAGE_SIZE)
      .clamp(1, MAX_PAGE_SIZE)
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page() - 1) * u64::from(self.limit())
  }

  /// Translate the age range into date-of-birth bounds as of `today`.
  ///
  /// Returns `(latest_dob, earliest_dob_exclusive)`: a pet is at least
  /// `min_age` years old iff `dob <= latest_dob`, and at most `max_age`
  /// years old iff `dob > earliest_dob_exclusive`.
  pub fn dob_bounds(
    &self,
    today: NaiveDate,
  ) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let years_before = |years: u32| {
      today
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
    };
    let latest = self.min_age.map(years_before);
    let earliest = self.max_age.map(|max| years_before(max.saturating_add(1)));
    (latest, earliest)
  }
}

/// One page of results plus enough metadata to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total:       u64,
  pub page:        u32,
  pub limit:       u32,
  pub total_pages: u64,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
    let total_pages = total.div_ceil(u64::from(limit.max(1)));
    Self { items, total, page, limit, total_pages }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn age_in_years(dob: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(dob).unwrap_or(0)
  }

  #[test]
  fn paging_defaults_and_clamps() {
    let q = ListingQuery::default();
    assert_eq!((q.page(), q.limit(), q.offset()), (1, 12, 0));

    let q = ListingQuery { page: Some(0), limit: Some(500), ..Default::default() };
    assert_eq!((q.page(), q.limit()), (1, MAX_PAGE_SIZE));

    let q = ListingQuery { page: Some(3), limit: Some(10), ..Default::default() };
    assert_eq!(q.offset(), 20);
  }

  #[test]
  fn dob_bounds_match_whole_year_ages() {
    let today = date(2024, 6, 15);
    let q = ListingQuery {
      min_age: Some(1),
      max_age: Some(3),
      ..Default::default()
    };
    let (latest, earliest) = q.dob_bounds(today);
    assert_eq!(latest, Some(date(2023, 6, 15)));
    assert_eq!(earliest, Some(date(2020, 6, 15)));

    // Born exactly four years ago: age 4, excluded by `dob > earliest`.
    assert_eq!(age_in_years(date(2020, 6, 15), today), 4);
    // One day later: still 3.
    assert_eq!(age_in_years(date(2020, 6, 16), today), 3);
  }

  #[test]
  fn page_counts_round_up() {
    let page: Page<u8> = Page::new(vec![], 25, 1, 12);
    assert_eq!(page.total_pages, 3);
    let empty: Page<u8> = Page::new(vec![], 0, 1, 12);
    assert_eq!(empty.total_pages, 0);
  }

  #[test]
  fn future_dob_is_rejected() {
    let today = date(2024, 1, 1);
    let update = AdoptableUpdate {
      dob: Some(date(2024, 1, 2)),
      ..Default::default()
    };
    assert!(update.validate(today).is_err());
  }

  #[test]
  fn status_text_form() {
    assert_eq!(ListingStatus::Hold.as_ref(), "hold");
    assert_eq!(
      serde_json::to_value(ListingStatus::Available).unwrap(),
      serde_json::json!("available")
    );
  }
}
