//! Accounts and adopter profiles.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tails_core::{
  Error as CoreError,
  user::{Credentials, Identity, NewUser, ProfileInput, User, UserProfile},
};

use crate::{
  Result,
  encode::{PROFILE_COLUMNS, RawProfile, RawUser, USER_COLUMNS, encode_dt},
};

pub fn get(conn: &Connection, id: i64) -> Result<Option<User>> {
  let raw = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
      params![id],
      RawUser::from_row,
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

/// Like [`get`], but a missing user is an error.
pub fn require(conn: &Connection, id: i64) -> Result<User> {
  get(conn, id)?.ok_or_else(|| CoreError::not_found(format!("user {id}")).into())
}

pub fn create(conn: &mut Connection, input: NewUser) -> Result<User> {
  let tx = conn.transaction()?;

  let taken = tx
    .query_row(
      "SELECT 1 FROM users WHERE email = ?1",
      params![input.email],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if taken {
    return Err(CoreError::conflict("email is already registered").into());
  }

  let (password_hash, google_sub) = match input.identity {
    Identity::Password(hash) => (Some(hash), None),
    Identity::Google(sub) => (None, Some(sub)),
  };

  tx.execute(
    "INSERT INTO users (email, name, password_hash, google_sub, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      input.email,
      input.name,
      password_hash,
      google_sub,
      encode_dt(Utc::now())
    ],
  )?;
  let id = tx.last_insert_rowid();
  let user = require(&tx, id)?;
  tx.commit()?;
  Ok(user)
}

pub fn credentials_by_email(
  conn: &Connection,
  email: &str,
) -> Result<Option<Credentials>> {
  Ok(
    conn
      .query_row(
        "SELECT id, password_hash, is_admin FROM users WHERE email = ?1",
        params![email],
        |row| {
          Ok(Credentials {
            user_id:       row.get(0)?,
            password_hash: row.get(1)?,
            is_admin:      row.get(2)?,
          })
        },
      )
      .optional()?,
  )
}

pub fn find_or_create_google(
  conn: &mut Connection,
  google_sub: &str,
  email: &str,
  name: &str,
) -> Result<User> {
  let tx = conn.transaction()?;

  let by_sub: Option<i64> = tx
    .query_row(
      "SELECT id FROM users WHERE google_sub = ?1",
      params![google_sub],
      |r| r.get(0),
    )
    .optional()?;

  let id = if let Some(id) = by_sub {
    id
  } else {
    let by_email: Option<(i64, Option<String>)> = tx
      .query_row(
        "SELECT id, google_sub FROM users WHERE email = ?1",
        params![email],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?;

    match by_email {
      Some((_, Some(_))) => {
        return Err(
          CoreError::conflict("this email is linked to a different Google account").into(),
        );
      }
      Some((id, None)) => {
        tx.execute(
          "UPDATE users SET google_sub = ?1 WHERE id = ?2",
          params![google_sub, id],
        )?;
        tracing::info!(user_id = id, "linked Google identity to existing account");
        id
      }
      None => {
        tx.execute(
          "INSERT INTO users (email, name, google_sub, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![email, name, google_sub, encode_dt(Utc::now())],
        )?;
        tx.last_insert_rowid()
      }
    }
  };

  let user = require(&tx, id)?;
  tx.commit()?;
  Ok(user)
}

pub fn get_profile(conn: &Connection, user_id: i64) -> Result<Option<UserProfile>> {
  let raw = conn
    .query_row(
      &format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = ?1"),
      params![user_id],
      |row| RawProfile::from_row(row, 0),
    )
    .optional()?;
  raw.map(RawProfile::into_profile).transpose()
}

pub fn upsert_profile(
  conn: &mut Connection,
  user_id: i64,
  input: ProfileInput,
) -> Result<UserProfile> {
  input.validate()?;
  let tx = conn.transaction()?;
  require(&tx, user_id)?;

  tx.execute(
    "INSERT INTO user_profiles (
       user_id, occupation, housing_type, has_yard, experience,
       household_size, other_pets, about, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
     ON CONFLICT (user_id) DO UPDATE SET
       occupation     = excluded.occupation,
       housing_type   = excluded.housing_type,
       has_yard       = excluded.has_yard,
       experience     = excluded.experience,
       household_size = excluded.household_size,
       other_pets     = excluded.other_pets,
       about          = excluded.about,
       updated_at     = excluded.updated_at",
    params![
      user_id,
      input.occupation,
      input.housing_type.map(|h| h.as_ref().to_owned()),
      input.has_yard,
      input.experience.map(|e| e.as_ref().to_owned()),
      input.household_size,
      input.other_pets,
      input.about,
      encode_dt(Utc::now()),
    ],
  )?;

  let profile = get_profile(&tx, user_id)?
    .ok_or_else(|| CoreError::not_found(format!("profile for user {user_id}")))?;
  tx.commit()?;
  Ok(profile)
}
