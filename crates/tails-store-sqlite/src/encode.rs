//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`,
//! and enums as their snake_case names (via `strum`).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use tails_core::{
  adoption::AdoptionRequest,
  listing::{Address, Adoptable},
  message::Message,
  pet::{HealthStat, MedicalFile, Pet},
  user::{User, UserProfile},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

/// Decode a snake_case enum column.
pub fn decode_enum<T: FromStr>(s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unexpected enum value {s:?}")))
}

pub fn decode_opt_enum<T: FromStr>(s: Option<String>) -> Result<Option<T>> {
  s.as_deref().map(decode_enum).transpose()
}

/// Escape `%`, `_` and `\` so user input matches literally inside
/// `LIKE ? ESCAPE '\'`, then wrap it for a substring match.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, email, name, is_admin,
  password_hash IS NOT NULL, google_sub IS NOT NULL, created_at";

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub email:         String,
  pub name:          String,
  pub is_admin:      bool,
  pub has_password:  bool,
  pub google_linked: bool,
  pub created_at:    String,
}

impl RawUser {
  /// Map a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      email:         row.get(1)?,
      name:          row.get(2)?,
      is_admin:      row.get(3)?,
      has_password:  row.get(4)?,
      google_linked: row.get(5)?,
      created_at:    row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      email:         self.email,
      name:          self.name,
      is_admin:      self.is_admin,
      has_password:  self.has_password,
      google_linked: self.google_linked,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const PROFILE_COLUMNS: &str = "user_id, occupation, housing_type,
  has_yard, experience, household_size, other_pets, about, updated_at";

pub struct RawProfile {
  pub user_id:        i64,
  pub occupation:     Option<String>,
  pub housing_type:   Option<String>,
  pub has_yard:       bool,
  pub experience:     Option<String>,
  pub household_size: Option<u32>,
  pub other_pets:     Option<String>,
  pub about:          Option<String>,
  pub updated_at:     String,
}

impl RawProfile {
  /// Map a row selected with [`PROFILE_COLUMNS`], starting at `base`.
  pub fn from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:        row.get(base)?,
      occupation:     row.get(base + 1)?,
      housing_type:   row.get(base + 2)?,
      has_yard:       row.get(base + 3)?,
      experience:     row.get(base + 4)?,
      household_size: row.get(base + 5)?,
      other_pets:     row.get(base + 6)?,
      about:          row.get(base + 7)?,
      updated_at:     row.get(base + 8)?,
    })
  }

  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id:        self.user_id,
      occupation:     self.occupation,
      housing_type:   decode_opt_enum(self.housing_type)?,
      has_yard:       self.has_yard,
      experience:     decode_opt_enum(self.experience)?,
      household_size: self.household_size,
      other_pets:     self.other_pets,
      about:          self.about,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// Joins shared by every listing read; filters are appended by callers.
pub const ADOPTABLE_FROM: &str = "
  FROM adoptables a
  JOIN addresses  ad ON ad.id = a.address_id
  JOIN pet_types  t  ON t.id  = a.type_id
  LEFT JOIN pet_breeds b ON b.id = a.breed_id";

pub const ADOPTABLE_COLUMNS: &str = "a.id, a.caretaker_id, a.name, a.gender,
  a.dob, a.weight_kg, a.sterilized, a.vaccinated, a.dewormed,
  a.house_trained, a.description, a.status,
  ad.street, ad.city, ad.region, ad.postal_code, ad.country,
  a.type_id, t.name, a.breed_id, b.name, a.created_at, a.updated_at";

pub struct RawAdoptable {
  pub id:            i64,
  pub caretaker_id:  i64,
  pub name:          String,
  pub gender:        String,
  pub dob:           String,
  pub weight_kg:     Option<f64>,
  pub sterilized:    String,
  pub vaccinated:    String,
  pub dewormed:      String,
  pub house_trained: String,
  pub description:   Option<String>,
  pub status:        String,
  pub address:       Address,
  pub type_id:       i64,
  pub type_name:     String,
  pub breed_id:      Option<i64>,
  pub breed_name:    Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawAdoptable {
  /// Map a row selected with [`ADOPTABLE_COLUMNS`].
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      caretaker_id:  row.get(1)?,
      name:          row.get(2)?,
      gender:        row.get(3)?,
      dob:           row.get(4)?,
      weight_kg:     row.get(5)?,
      sterilized:    row.get(6)?,
      vaccinated:    row.get(7)?,
      dewormed:      row.get(8)?,
      house_trained: row.get(9)?,
      description:   row.get(10)?,
      status:        row.get(11)?,
      address:       Address {
        street:      row.get(12)?,
        city:        row.get(13)?,
        region:      row.get(14)?,
        postal_code: row.get(15)?,
        country:     row.get(16)?,
      },
      type_id:       row.get(17)?,
      type_name:     row.get(18)?,
      breed_id:      row.get(19)?,
      breed_name:    row.get(20)?,
      created_at:    row.get(21)?,
      updated_at:    row.get(22)?,
    })
  }

  pub fn into_adoptable(self, images: Vec<String>) -> Result<Adoptable> {
    Ok(Adoptable {
      id:            self.id,
      caretaker_id:  self.caretaker_id,
      name:          self.name,
      gender:        decode_enum(&self.gender)?,
      dob:           decode_date(&self.dob)?,
      weight_kg:     self.weight_kg,
      sterilized:    decode_enum(&self.sterilized)?,
      vaccinated:    decode_enum(&self.vaccinated)?,
      dewormed:      decode_enum(&self.dewormed)?,
      house_trained: decode_enum(&self.house_trained)?,
      description:   self.description,
      status:        decode_enum(&self.status)?,
      address:       self.address,
      type_id:       self.type_id,
      type_name:     self.type_name,
      breed_id:      self.breed_id,
      breed_name:    self.breed_name,
      images,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Adoption requests ───────────────────────────────────────────────────────

pub const REQUEST_COLUMNS: &str =
  "r.id, r.adopter_id, r.adoptable_id, r.message, r.status, r.created_at, r.updated_at";

pub struct RawRequest {
  pub id:           i64,
  pub adopter_id:   i64,
  pub adoptable_id: i64,
  pub message:      String,
  pub status:       String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawRequest {
  /// Map a row selected with [`REQUEST_COLUMNS`] (aliased `r`).
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      adopter_id:   row.get(1)?,
      adoptable_id: row.get(2)?,
      message:      row.get(3)?,
      status:       row.get(4)?,
      created_at:   row.get(5)?,
      updated_at:   row.get(6)?,
    })
  }

  pub fn into_request(self) -> Result<AdoptionRequest> {
    Ok(AdoptionRequest {
      id:           self.id,
      adopter_id:   self.adopter_id,
      adoptable_id: self.adoptable_id,
      message:      self.message,
      status:       decode_enum(&self.status)?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Messages ────────────────────────────────────────────────────────────────

pub const MESSAGE_COLUMNS: &str =
  "id, request_id, sender_id, content, sent_at, is_read";

pub struct RawMessage {
  pub id:         i64,
  pub request_id: i64,
  pub sender_id:  i64,
  pub content:    String,
  pub sent_at:    String,
  pub is_read:    bool,
}

impl RawMessage {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      request_id: row.get(1)?,
      sender_id:  row.get(2)?,
      content:    row.get(3)?,
      sent_at:    row.get(4)?,
      is_read:    row.get(5)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      id:         self.id,
      request_id: self.request_id,
      sender_id:  self.sender_id,
      content:    self.content,
      sent_at:    decode_dt(&self.sent_at)?,
      is_read:    self.is_read,
    })
  }
}

// ─── Owned pets ──────────────────────────────────────────────────────────────

pub const PET_COLUMNS: &str =
  "id, owner_id, name, type_id, breed_id, gender, dob, notes, created_at";

pub struct RawPet {
  pub id:         i64,
  pub owner_id:   i64,
  pub name:       String,
  pub type_id:    i64,
  pub breed_id:   Option<i64>,
  pub gender:     Option<String>,
  pub dob:        Option<String>,
  pub notes:      Option<String>,
  pub created_at: String,
}

impl RawPet {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      owner_id:   row.get(1)?,
      name:       row.get(2)?,
      type_id:    row.get(3)?,
      breed_id:   row.get(4)?,
      gender:     row.get(5)?,
      dob:        row.get(6)?,
      notes:      row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_pet(self) -> Result<Pet> {
    Ok(Pet {
      id:         self.id,
      owner_id:   self.owner_id,
      name:       self.name,
      type_id:    self.type_id,
      breed_id:   self.breed_id,
      gender:     decode_opt_enum(self.gender)?,
      dob:        self.dob.as_deref().map(decode_date).transpose()?,
      notes:      self.notes,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const MEDICAL_COLUMNS: &str =
  "id, pet_id, filename, original_name, content_type, description, uploaded_at";

pub struct RawMedicalFile {
  pub id:            i64,
  pub pet_id:        i64,
  pub filename:      String,
  pub original_name: String,
  pub content_type:  String,
  pub description:   Option<String>,
  pub uploaded_at:   String,
}

impl RawMedicalFile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      pet_id:        row.get(1)?,
      filename:      row.get(2)?,
      original_name: row.get(3)?,
      content_type:  row.get(4)?,
      description:   row.get(5)?,
      uploaded_at:   row.get(6)?,
    })
  }

  pub fn into_file(self) -> Result<MedicalFile> {
    Ok(MedicalFile {
      id:            self.id,
      pet_id:        self.pet_id,
      filename:      self.filename,
      original_name: self.original_name,
      content_type:  self.content_type,
      description:   self.description,
      uploaded_at:   decode_dt(&self.uploaded_at)?,
    })
  }
}

pub const STAT_COLUMNS: &str = "id, pet_id, metric, value, recorded_on, note";

pub struct RawStat {
  pub id:          i64,
  pub pet_id:      i64,
  pub metric:      String,
  pub value:       f64,
  pub recorded_on: String,
  pub note:        Option<String>,
}

impl RawStat {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      pet_id:      row.get(1)?,
      metric:      row.get(2)?,
      value:       row.get(3)?,
      recorded_on: row.get(4)?,
      note:        row.get(5)?,
    })
  }

  pub fn into_stat(self) -> Result<HealthStat> {
    Ok(HealthStat {
      id:          self.id,
      pet_id:      self.pet_id,
      metric:      decode_enum(&self.metric)?,
      value:       self.value,
      recorded_on: decode_date(&self.recorded_on)?,
      note:        self.note,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("lab"), "%lab%");
    assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
  }

  #[test]
  fn dates_use_iso_format() {
    let d = NaiveDate::from_ymd_opt(2021, 2, 3).unwrap();
    assert_eq!(encode_date(d), "2021-02-03");
    assert_eq!(decode_date("2021-02-03").unwrap(), d);
    assert!(decode_date("03/02/2021").is_err());
  }
}
