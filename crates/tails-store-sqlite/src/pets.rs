//! Owned pets, medical files and health stats. Every operation is scoped to
//! the owning user.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tails_core::{
  Error as CoreError,
  pet::{
    HealthStat, MedicalFile, NewHealthStat, NewMedicalFile, NewPet, Pet,
    PetUpdate, StatMetric,
  },
};

use crate::{
  Result,
  encode::{
    MEDICAL_COLUMNS, PET_COLUMNS, RawMedicalFile, RawPet, RawStat, STAT_COLUMNS,
    encode_date, encode_dt,
  },
  meta::check_type_and_breed,
};

fn get(conn: &Connection, id: i64) -> Result<Option<Pet>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1"),
      params![id],
      RawPet::from_row,
    )
    .optional()?;
  raw.map(RawPet::into_pet).transpose()
}

/// Fetch a pet and confirm `owner_id` owns it.
pub fn require_owned(conn: &Connection, owner_id: i64, id: i64) -> Result<Pet> {
  let pet = get(conn, id)?
    .ok_or_else(|| CoreError::not_found(format!("pet {id}")))?;
  if pet.owner_id != owner_id {
    return Err(CoreError::forbidden("you do not own this pet").into());
  }
  Ok(pet)
}

// ─── Pets ────────────────────────────────────────────────────────────────────

pub fn create(conn: &mut Connection, owner_id: i64, input: NewPet) -> Result<Pet> {
  input.validate()?;
  let tx = conn.transaction()?;
  check_type_and_breed(&tx, input.type_id, input.breed_id)?;
  tx.execute(
    "INSERT INTO pets (owner_id, name, type_id, breed_id, gender, dob, notes, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      owner_id,
      input.name.trim(),
      input.type_id,
      input.breed_id,
      input.gender.map(|g| g.as_ref().to_owned()),
      input.dob.map(encode_date),
      input.notes,
      encode_dt(Utc::now()),
    ],
  )?;
  let id = tx.last_insert_rowid();
  let pet = require_owned(&tx, owner_id, id)?;
  tx.commit()?;
  Ok(pet)
}

pub fn list(conn: &Connection, owner_id: i64) -> Result<Vec<Pet>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PET_COLUMNS} FROM pets WHERE owner_id = ?1 ORDER BY name, id"
  ))?;
  let raws = stmt
    .query_map(params![owner_id], RawPet::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPet::into_pet).collect()
}

pub fn update(conn: &mut Connection, owner_id: i64, id: i64, update: PetUpdate) -> Result<Pet> {
  update.validate()?;
  let tx = conn.transaction()?;
  let current = require_owned(&tx, owner_id, id)?;

  let type_id = update.type_id.unwrap_or(current.type_id);
  let breed_id = match (update.type_id, update.breed_id) {
    (_, Some(b)) => Some(b),
    (Some(t), None) if t != current.type_id => None,
    _ => current.breed_id,
  };
  check_type_and_breed(&tx, type_id, breed_id)?;

  tx.execute(
    "UPDATE pets SET name = ?1, type_id = ?2, breed_id = ?3, gender = ?4, dob = ?5, notes = ?6
     WHERE id = ?7",
    params![
      update.name.as_deref().map(str::trim).unwrap_or(&current.name),
      type_id,
      breed_id,
      update.gender.or(current.gender).map(|g| g.as_ref().to_owned()),
      update.dob.or(current.dob).map(encode_date),
      update.notes.or(current.notes),
      id,
    ],
  )?;
  let pet = require_owned(&tx, owner_id, id)?;
  tx.commit()?;
  Ok(pet)
}

/// Delete a pet with its files and stats. Returns stored medical filenames.
pub fn delete(conn: &mut Connection, owner_id: i64, id: i64) -> Result<Vec<String>> {
  let tx = conn.transaction()?;
  require_owned(&tx, owner_id, id)?;
  let files = {
    let mut stmt = tx.prepare("SELECT filename FROM medical_files WHERE pet_id = ?1")?;
    stmt
      .query_map(params![id], |r| r.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?
  };
  tx.execute("DELETE FROM pets WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(files)
}

// ─── Medical files ───────────────────────────────────────────────────────────

pub fn add_medical_file(
  conn: &mut Connection,
  owner_id: i64,
  pet_id: i64,
  file: NewMedicalFile,
) -> Result<MedicalFile> {
  let tx = conn.transaction()?;
  require_owned(&tx, owner_id, pet_id)?;
  let uploaded_at = Utc::now();
  tx.execute(
    "INSERT INTO medical_files (pet_id, filename, original_name, content_type, description, uploaded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      pet_id,
      file.filename,
      file.original_name,
      file.content_type,
      file.description,
      encode_dt(uploaded_at),
    ],
  )?;
  let id = tx.last_insert_rowid();
  tx.commit()?;
  Ok(MedicalFile {
    id,
    pet_id,
    filename: file.filename,
    original_name: file.original_name,
    content_type: file.content_type,
    description: file.description,
    uploaded_at,
  })
}

pub fn list_medical_files(conn: &Connection, owner_id: i64, pet_id: i64) -> Result<Vec<MedicalFile>> {
  require_owned(conn, owner_id, pet_id)?;
  let mut stmt = conn.prepare(&format!(
    "SELECT {MEDICAL_COLUMNS} FROM medical_files WHERE pet_id = ?1 ORDER BY id DESC"
  ))?;
  let raws = stmt
    .query_map(params![pet_id], RawMedicalFile::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawMedicalFile::into_file).collect()
}

pub fn delete_medical_file(
  conn: &mut Connection,
  owner_id: i64,
  pet_id: i64,
  file_id: i64,
) -> Result<String> {
  let tx = conn.transaction()?;
  require_owned(&tx, owner_id, pet_id)?;
  let filename: Option<String> = tx
    .query_row(
      "SELECT filename FROM medical_files WHERE id = ?1 AND pet_id = ?2",
      params![file_id, pet_id],
      |r| r.get(0),
    )
    .optional()?;
  let Some(filename) = filename else {
    return Err(CoreError::not_found(format!("medical file {file_id}")).into());
  };
  tx.execute("DELETE FROM medical_files WHERE id = ?1", params![file_id])?;
  tx.commit()?;
  Ok(filename)
}

// ─── Health stats ────────────────────────────────────────────────────────────

pub fn add_stat(
  conn: &mut Connection,
  owner_id: i64,
  pet_id: i64,
  input: NewHealthStat,
) -> Result<HealthStat> {
  input.validate(Utc::now().date_naive())?;
  let tx = conn.transaction()?;
  require_owned(&tx, owner_id, pet_id)?;
  tx.execute(
    "INSERT INTO health_stats (pet_id, metric, value, recorded_on, note)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      pet_id,
      input.metric.as_ref(),
      input.value,
      encode_date(input.recorded_on),
      input.note,
    ],
  )?;
  let id = tx.last_insert_rowid();
  tx.commit()?;
  Ok(HealthStat {
    id,
    pet_id,
    metric: input.metric,
    value: input.value,
    recorded_on: input.recorded_on,
    note: input.note,
  })
}

pub fn list_stats(
  conn: &Connection,
  owner_id: i64,
  pet_id: i64,
  metric: Option<StatMetric>,
) -> Result<Vec<HealthStat>> {
  require_owned(conn, owner_id, pet_id)?;
  let mut stmt = conn.prepare(&format!(
    "SELECT {STAT_COLUMNS} FROM health_stats
     WHERE pet_id = ?1 AND (?2 IS NULL OR metric = ?2)
     ORDER BY recorded_on, id"
  ))?;
  let raws = stmt
    .query_map(
      params![pet_id, metric.map(|m| m.as_ref().to_owned())],
      RawStat::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawStat::into_stat).collect()
}

pub fn delete_stat(conn: &mut Connection, owner_id: i64, pet_id: i64, stat_id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  require_owned(&tx, owner_id, pet_id)?;
  let removed = tx.execute(
    "DELETE FROM health_stats WHERE id = ?1 AND pet_id = ?2",
    params![stat_id, pet_id],
  )?;
  if removed == 0 {
    return Err(CoreError::not_found(format!("stat {stat_id}")).into());
  }
  tx.commit()?;
  Ok(())
}
