//! Adoptable listings, their addresses and images.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter, types::Value};
use tails_core::{
  Error as CoreError,
  listing::{
    Address, Adoptable, AdoptableUpdate, ListingQuery, MAX_IMAGES, NewAdoptable,
    Page, Vaccination,
  },
};

use crate::{
  Result,
  encode::{
    ADOPTABLE_COLUMNS, ADOPTABLE_FROM, RawAdoptable, encode_date, encode_dt,
    like_pattern,
  },
  meta::check_type_and_breed,
};

// ─── Reads ───────────────────────────────────────────────────────────────────

fn images(conn: &Connection, adoptable_id: i64) -> Result<Vec<String>> {
  let mut stmt = conn.prepare_cached(
    "SELECT filename FROM adoptable_images
     WHERE adoptable_id = ?1 ORDER BY position, id",
  )?;
  let rows = stmt
    .query_map(params![adoptable_id], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(rows)
}

/// Attach images to raw rows and decode them.
fn hydrate(conn: &Connection, raws: Vec<RawAdoptable>) -> Result<Vec<Adoptable>> {
  raws
    .into_iter()
    .map(|raw| {
      let imgs = images(conn, raw.id)?;
      raw.into_adoptable(imgs)
    })
    .collect()
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Adoptable>> {
  let raw = conn
    .query_row(
      &format!("SELECT {ADOPTABLE_COLUMNS} {ADOPTABLE_FROM} WHERE a.id = ?1"),
      params![id],
      RawAdoptable::from_row,
    )
    .optional()?;
  Ok(hydrate(conn, raw.into_iter().collect())?.pop())
}

fn require(conn: &Connection, id: i64) -> Result<Adoptable> {
  get(conn, id)?.ok_or_else(|| CoreError::not_found(format!("adoptable {id}")).into())
}

/// Fetch the listing and confirm `caretaker_id` owns it.
fn require_owned(conn: &Connection, caretaker_id: i64, id: i64) -> Result<Adoptable> {
  let listing = require(conn, id)?;
  if listing.caretaker_id != caretaker_id {
    return Err(CoreError::forbidden("you do not own this listing").into());
  }
  Ok(listing)
}

pub fn by_caretaker(conn: &Connection, caretaker_id: i64) -> Result<Vec<Adoptable>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ADOPTABLE_COLUMNS} {ADOPTABLE_FROM}
     WHERE a.caretaker_id = ?1 ORDER BY a.id DESC"
  ))?;
  let raws = stmt
    .query_map(params![caretaker_id], RawAdoptable::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  hydrate(conn, raws)
}

/// Filtered search. Clauses are appended only for the filters that are set;
/// the LIMIT/OFFSET parameters are bound last.
pub fn search(conn: &Connection, query: &ListingQuery) -> Result<Page<Adoptable>> {
  let mut conds: Vec<&'static str> = vec![];
  let mut args: Vec<Value> = vec![];

  if let Some(text) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
    let pattern = like_pattern(text);
    conds.push(
      "(a.name LIKE ? ESCAPE '\\' OR b.name LIKE ? ESCAPE '\\' OR t.name LIKE ? ESCAPE '\\')",
    );
    args.extend(std::iter::repeat_n(Value::Text(pattern), 3));
  }
  if let Some(type_id) = query.type_id {
    conds.push("a.type_id = ?");
    args.push(Value::Integer(type_id));
  }
  if let Some(gender) = query.gender {
    conds.push("a.gender = ?");
    args.push(Value::Text(gender.as_ref().to_owned()));
  }

  let (latest_dob, earliest_dob) = query.dob_bounds(Utc::now().date_naive());
  if let Some(latest) = latest_dob {
    conds.push("a.dob <= ?");
    args.push(Value::Text(encode_date(latest)));
  }
  if let Some(earliest) = earliest_dob {
    conds.push("a.dob > ?");
    args.push(Value::Text(encode_date(earliest)));
  }

  match query.vaccinated {
    Some(true) => conds.push("a.vaccinated = ?"),
    Some(false) => conds.push("a.vaccinated != ?"),
    None => {}
  }
  if query.vaccinated.is_some() {
    args.push(Value::Text(Vaccination::Full.as_ref().to_owned()));
  }

  if let Some(status) = query.status {
    conds.push("a.status = ?");
    args.push(Value::Text(status.as_ref().to_owned()));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  let total: i64 = conn.query_row(
    &format!("SELECT COUNT(*) {ADOPTABLE_FROM} {where_clause}"),
    params_from_iter(args.iter()),
    |r| r.get(0),
  )?;

  let (page, limit) = (query.page(), query.limit());
  args.push(Value::Integer(i64::from(limit)));
  args.push(Value::Integer(i64::try_from(query.offset()).unwrap_or(i64::MAX)));

  let mut stmt = conn.prepare(&format!(
    "SELECT {ADOPTABLE_COLUMNS} {ADOPTABLE_FROM} {where_clause}
     ORDER BY a.id DESC
     LIMIT ? OFFSET ?"
  ))?;
  let raws = stmt
    .query_map(params_from_iter(args.iter()), RawAdoptable::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let items = hydrate(conn, raws)?;
  Ok(Page::new(items, total.max(0) as u64, page, limit))
}

// ─── Writes ──────────────────────────────────────────────────────────────────

fn insert_address(conn: &Connection, address: &Address) -> Result<i64> {
  conn.execute(
    "INSERT INTO addresses (street, city, region, postal_code, country)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      address.street,
      address.city.trim(),
      address.region,
      address.postal_code,
      address.country
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

fn append_images(conn: &Connection, adoptable_id: i64, filenames: &[String]) -> Result<()> {
  let start: i64 = conn.query_row(
    "SELECT COALESCE(MAX(position) + 1, 0) FROM adoptable_images WHERE adoptable_id = ?1",
    params![adoptable_id],
    |r| r.get(0),
  )?;
  let mut stmt = conn.prepare_cached(
    "INSERT INTO adoptable_images (adoptable_id, filename, position) VALUES (?1, ?2, ?3)",
  )?;
  for (offset, name) in filenames.iter().enumerate() {
    stmt.execute(params![adoptable_id, name, start + offset as i64])?;
  }
  Ok(())
}

fn too_many_images() -> crate::Error {
  CoreError::validation(format!("a listing can have at most {MAX_IMAGES} images")).into()
}

pub fn create(
  conn: &mut Connection,
  caretaker_id: i64,
  input: NewAdoptable,
  image_names: Vec<String>,
) -> Result<Adoptable> {
  input.validate(Utc::now().date_naive())?;
  if image_names.len() > MAX_IMAGES {
    return Err(too_many_images());
  }

  let tx = conn.transaction()?;
  check_type_and_breed(&tx, input.type_id, input.breed_id)?;
  let address_id = insert_address(&tx, &input.address)?;
  let now = encode_dt(Utc::now());

  tx.execute(
    "INSERT INTO adoptables (
       caretaker_id, name, gender, dob, weight_kg,
       sterilized, vaccinated, dewormed, house_trained,
       description, address_id, type_id, breed_id, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    params![
      caretaker_id,
      input.name.trim(),
      input.gender.as_ref(),
      encode_date(input.dob),
      input.weight_kg,
      input.sterilized.as_ref(),
      input.vaccinated.as_ref(),
      input.dewormed.as_ref(),
      input.house_trained.as_ref(),
      input.description,
      address_id,
      input.type_id,
      input.breed_id,
      now,
    ],
  )?;
  let id = tx.last_insert_rowid();
  append_images(&tx, id, &image_names)?;

  let listing = require(&tx, id)?;
  tx.commit()?;
  Ok(listing)
}

pub fn update(
  conn: &mut Connection,
  caretaker_id: i64,
  id: i64,
  update: AdoptableUpdate,
) -> Result<Adoptable> {
  update.validate(Utc::now().date_naive())?;

  let tx = conn.transaction()?;
  let current = require_owned(&tx, caretaker_id, id)?;

  let type_id = update.type_id.unwrap_or(current.type_id);
  let breed_id = match (update.type_id, update.breed_id) {
    (_, Some(b)) => Some(b),
    // Changing type without naming a breed drops the old breed.
    (Some(t), None) if t != current.type_id => None,
    _ => current.breed_id,
  };
  check_type_and_breed(&tx, type_id, breed_id)?;

  if let Some(address) = &update.address {
    tx.execute(
      "UPDATE addresses SET street = ?1, city = ?2, region = ?3, postal_code = ?4, country = ?5
       WHERE id = (SELECT address_id FROM adoptables WHERE id = ?6)",
      params![
        address.street,
        address.city.trim(),
        address.region,
        address.postal_code,
        address.country,
        id
      ],
    )?;
  }

  tx.execute(
    "UPDATE adoptables SET
       name = ?1, gender = ?2, dob = ?3, weight_kg = ?4,
       sterilized = ?5, vaccinated = ?6, dewormed = ?7, house_trained = ?8,
       description = ?9, status = ?10, type_id = ?11, breed_id = ?12,
       updated_at = ?13
     WHERE id = ?14 AND caretaker_id = ?15",
    params![
      update.name.as_deref().map(str::trim).unwrap_or(&current.name),
      update.gender.unwrap_or(current.gender).as_ref(),
      encode_date(update.dob.unwrap_or(current.dob)),
      update.weight_kg.or(current.weight_kg),
      update.sterilized.unwrap_or(current.sterilized).as_ref(),
      update.vaccinated.unwrap_or(current.vaccinated).as_ref(),
      update.dewormed.unwrap_or(current.dewormed).as_ref(),
      update.house_trained.unwrap_or(current.house_trained).as_ref(),
      update.description.or(current.description),
      update.status.unwrap_or(current.status).as_ref(),
      type_id,
      breed_id,
      encode_dt(Utc::now()),
      id,
      caretaker_id,
    ],
  )?;

  let listing = require(&tx, id)?;
  tx.commit()?;
  Ok(listing)
}

pub fn add_images(
  conn: &mut Connection,
  caretaker_id: i64,
  id: i64,
  image_names: Vec<String>,
) -> Result<Adoptable> {
  let tx = conn.transaction()?;
  let current = require_owned(&tx, caretaker_id, id)?;
  if current.images.len() + image_names.len() > MAX_IMAGES {
    return Err(too_many_images());
  }
  append_images(&tx, id, &image_names)?;
  tx.execute(
    "UPDATE adoptables SET updated_at = ?1 WHERE id = ?2",
    params![encode_dt(Utc::now()), id],
  )?;
  let listing = require(&tx, id)?;
  tx.commit()?;
  Ok(listing)
}

/// Remove a listing and everything hanging off it. Returns image filenames.
pub fn delete(conn: &mut Connection, caretaker_id: i64, id: i64) -> Result<Vec<String>> {
  let tx = conn.transaction()?;
  let listing = require_owned(&tx, caretaker_id, id)?;
  let address_id: i64 = tx.query_row(
    "SELECT address_id FROM adoptables WHERE id = ?1",
    params![id],
    |r| r.get(0),
  )?;

  // Requests, messages and images cascade.
  tx.execute("DELETE FROM adoptables WHERE id = ?1", params![id])?;
  tx.execute("DELETE FROM addresses WHERE id = ?1", params![address_id])?;
  tx.commit()?;
  Ok(listing.images)
}
