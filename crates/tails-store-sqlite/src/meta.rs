//! Pet types and breeds.

use rusqlite::{Connection, OptionalExtension as _, params};
use tails_core::{
  Error as CoreError,
  meta::{PetBreed, PetType, clean_name},
};

use crate::Result;

pub fn list_types(conn: &Connection) -> Result<Vec<PetType>> {
  let mut stmt = conn.prepare("SELECT id, name FROM pet_types ORDER BY name")?;
  let rows = stmt
    .query_map([], |row| Ok(PetType { id: row.get(0)?, name: row.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn list_breeds(conn: &Connection, type_id: Option<i64>) -> Result<Vec<PetBreed>> {
  let mut stmt = conn.prepare(
    "SELECT id, type_id, name FROM pet_breeds
     WHERE ?1 IS NULL OR type_id = ?1
     ORDER BY name",
  )?;
  let rows = stmt
    .query_map(params![type_id], |row| {
      Ok(PetBreed { id: row.get(0)?, type_id: row.get(1)?, name: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn create_type(conn: &mut Connection, name: &str) -> Result<PetType> {
  let name = clean_name(name)?;
  let tx = conn.transaction()?;
  let exists = tx
    .query_row(
      "SELECT 1 FROM pet_types WHERE name = ?1",
      params![name],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if exists {
    return Err(CoreError::conflict(format!("type {name:?} already exists")).into());
  }
  tx.execute("INSERT INTO pet_types (name) VALUES (?1)", params![name])?;
  let id = tx.last_insert_rowid();
  tx.commit()?;
  Ok(PetType { id, name })
}

pub fn create_breed(conn: &mut Connection, type_id: i64, name: &str) -> Result<PetBreed> {
  let name = clean_name(name)?;
  let tx = conn.transaction()?;
  if !type_exists(&tx, type_id)? {
    return Err(CoreError::not_found(format!("type {type_id}")).into());
  }
  let exists = tx
    .query_row(
      "SELECT 1 FROM pet_breeds WHERE type_id = ?1 AND name = ?2",
      params![type_id, name],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if exists {
    return Err(CoreError::conflict(format!("breed {name:?} already exists")).into());
  }
  tx.execute(
    "INSERT INTO pet_breeds (type_id, name) VALUES (?1, ?2)",
    params![type_id, name],
  )?;
  let id = tx.last_insert_rowid();
  tx.commit()?;
  Ok(PetBreed { id, type_id, name })
}

pub fn delete_type(conn: &mut Connection, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  if !type_exists(&tx, id)? {
    return Err(CoreError::not_found(format!("type {id}")).into());
  }
  let in_use: i64 = tx.query_row(
    "SELECT (SELECT COUNT(*) FROM pet_breeds WHERE type_id = ?1)
          + (SELECT COUNT(*) FROM adoptables WHERE type_id = ?1)
          + (SELECT COUNT(*) FROM pets       WHERE type_id = ?1)",
    params![id],
    |r| r.get(0),
  )?;
  if in_use > 0 {
    return Err(CoreError::conflict("type is still in use").into());
  }
  tx.execute("DELETE FROM pet_types WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(())
}

pub fn delete_breed(conn: &mut Connection, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  let exists = tx
    .query_row("SELECT 1 FROM pet_breeds WHERE id = ?1", params![id], |_| Ok(()))
    .optional()?
    .is_some();
  if !exists {
    return Err(CoreError::not_found(format!("breed {id}")).into());
  }
  let in_use: i64 = tx.query_row(
    "SELECT (SELECT COUNT(*) FROM adoptables WHERE breed_id = ?1)
          + (SELECT COUNT(*) FROM pets       WHERE breed_id = ?1)",
    params![id],
    |r| r.get(0),
  )?;
  if in_use > 0 {
    return Err(CoreError::conflict("breed is still in use").into());
  }
  tx.execute("DELETE FROM pet_breeds WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(())
}

pub fn type_exists(conn: &Connection, id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM pet_types WHERE id = ?1", params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

/// Check that `breed_id` (if any) exists and belongs to `type_id`.
pub fn check_type_and_breed(
  conn: &Connection,
  type_id: i64,
  breed_id: Option<i64>,
) -> Result<()> {
  if !type_exists(conn, type_id)? {
    return Err(CoreError::validation(format!("unknown type_id {type_id}")).into());
  }
  if let Some(breed_id) = breed_id {
    let breed_type: Option<i64> = conn
      .query_row(
        "SELECT type_id FROM pet_breeds WHERE id = ?1",
        params![breed_id],
        |r| r.get(0),
      )
      .optional()?;
    match breed_type {
      None => {
        return Err(
          CoreError::validation(format!("unknown breed_id {breed_id}")).into(),
        );
      }
      Some(t) if t != type_id => {
        return Err(
          CoreError::validation("breed does not belong to the given type").into(),
        );
      }
      Some(_) => {}
    }
  }
  Ok(())
}
