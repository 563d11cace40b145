//! Adoption requests: applying, reviewing, and status transitions.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use tails_core::{
  Error as CoreError,
  adoption::{
    AdoptionRequest, ApplicationSummary, IncomingApplication, RequestStatus,
    clean_application_message,
  },
  listing::ListingStatus,
};

use crate::{
  Result,
  encode::{REQUEST_COLUMNS, RawProfile, RawRequest, decode_enum, encode_dt},
};

pub fn get(conn: &Connection, id: i64) -> Result<Option<AdoptionRequest>> {
  let raw = conn
    .query_row(
      &format!("SELECT {REQUEST_COLUMNS} FROM adoption_requests r WHERE r.id = ?1"),
      params![id],
      RawRequest::from_row,
    )
    .optional()?;
  raw.map(RawRequest::into_request).transpose()
}

/// The adopter and the listing's caretaker for a request, if it exists.
pub fn participants(conn: &Connection, request_id: i64) -> Result<Option<(i64, i64)>> {
  Ok(
    conn
      .query_row(
        "SELECT r.adopter_id, a.caretaker_id
         FROM adoption_requests r
         JOIN adoptables a ON a.id = r.adoptable_id
         WHERE r.id = ?1",
        params![request_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?,
  )
}

pub fn apply(
  conn: &mut Connection,
  adopter_id: i64,
  adoptable_id: i64,
  message: &str,
) -> Result<AdoptionRequest> {
  let message = clean_application_message(message)?;
  let tx = conn.transaction()?;

  let listing: Option<(i64, String)> = tx
    .query_row(
      "SELECT caretaker_id, status FROM adoptables WHERE id = ?1",
      params![adoptable_id],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;
  let Some((caretaker_id, status)) = listing else {
    return Err(CoreError::not_found(format!("adoptable {adoptable_id}")).into());
  };

  if caretaker_id == adopter_id {
    return Err(CoreError::OwnListing.into());
  }

  let already = tx
    .query_row(
      "SELECT 1 FROM adoption_requests WHERE adopter_id = ?1 AND adoptable_id = ?2",
      params![adopter_id, adoptable_id],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if already {
    return Err(CoreError::AlreadyApplied.into());
  }

  if decode_enum::<ListingStatus>(&status)? != ListingStatus::Available {
    return Err(CoreError::NotAvailable.into());
  }

  let now = Utc::now();
  tx.execute(
    "INSERT INTO adoption_requests (adopter_id, adoptable_id, message, status, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    params![
      adopter_id,
      adoptable_id,
      message,
      RequestStatus::Pending.as_ref(),
      encode_dt(now)
    ],
  )?;
  let id = tx.last_insert_rowid();
  tx.commit()?;

  tracing::info!(request_id = id, adopter_id, adoptable_id, "adoption request submitted");

  Ok(AdoptionRequest {
    id,
    adopter_id,
    adoptable_id,
    message,
    status: RequestStatus::Pending,
    created_at: now,
    updated_at: now,
  })
}

pub fn by_adopter(conn: &Connection, adopter_id: i64) -> Result<Vec<ApplicationSummary>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {REQUEST_COLUMNS}, a.name, a.status, a.caretaker_id, u.name,
       (SELECT filename FROM adoptable_images i
        WHERE i.adoptable_id = a.id ORDER BY i.position, i.id LIMIT 1)
     FROM adoption_requests r
     JOIN adoptables a ON a.id = r.adoptable_id
     JOIN users      u ON u.id = a.caretaker_id
     WHERE r.adopter_id = ?1
     ORDER BY r.id DESC"
  ))?;

  let rows = stmt
    .query_map(params![adopter_id], |row| {
      Ok((
        RawRequest::from_row(row)?,
        row.get::<_, String>(7)?,
        row.get::<_, String>(8)?,
        row.get::<_, i64>(9)?,
        row.get::<_, String>(10)?,
        row.get::<_, Option<String>>(11)?,
      ))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(raw, adoptable_name, status, caretaker_id, caretaker_name, cover)| {
      Ok(ApplicationSummary {
        request: raw.into_request()?,
        adoptable_name,
        adoptable_status: decode_enum(&status)?,
        cover_image: cover,
        caretaker_id,
        caretaker_name,
      })
    })
    .collect()
}

pub fn incoming(conn: &Connection, caretaker_id: i64) -> Result<Vec<IncomingApplication>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {REQUEST_COLUMNS}, a.name, u.name, u.email,
       p.user_id, p.occupation, p.housing_type, p.has_yard, p.experience,
       p.household_size, p.other_pets, p.about, p.updated_at
     FROM adoption_requests r
     JOIN adoptables a ON a.id = r.adoptable_id
     JOIN users      u ON u.id = r.adopter_id
     LEFT JOIN user_profiles p ON p.user_id = r.adopter_id
     WHERE a.caretaker_id = ?1
     ORDER BY r.id DESC"
  ))?;

  let rows = stmt
    .query_map(params![caretaker_id], |row| {
      let has_profile = row.get::<_, Option<i64>>(10)?.is_some();
      Ok((
        RawRequest::from_row(row)?,
        row.get::<_, String>(7)?,
        row.get::<_, String>(8)?,
        row.get::<_, String>(9)?,
        if has_profile { Some(RawProfile::from_row(row, 10)?) } else { None },
      ))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(raw, adoptable_name, applicant_name, applicant_email, profile)| {
      Ok(IncomingApplication {
        request: raw.into_request()?,
        adoptable_name,
        applicant_name,
        applicant_email,
        profile: profile.map(RawProfile::into_profile).transpose()?,
      })
    })
    .collect()
}

/// A request as seen by one of its two participants.
pub fn get_for(conn: &Connection, user_id: i64, id: i64) -> Result<AdoptionRequest> {
  let Some((adopter_id, caretaker_id)) = participants(conn, id)? else {
    return Err(CoreError::not_found(format!("adoption request {id}")).into());
  };
  if user_id != adopter_id && user_id != caretaker_id {
    return Err(CoreError::forbidden("not a participant in this request").into());
  }
  get(conn, id)?
    .ok_or_else(|| CoreError::not_found(format!("adoption request {id}")).into())
}

/// Move a request to `next`, and on approval put the listing on hold, in a
/// single transaction.
pub fn set_status(
  conn: &mut Connection,
  caretaker_id: i64,
  id: i64,
  next: RequestStatus,
) -> Result<AdoptionRequest> {
  let tx = conn.transaction()?;

  let row: Option<(String, i64, i64, String)> = tx
    .query_row(
      "SELECT r.status, r.adoptable_id, a.caretaker_id, a.status
       FROM adoption_requests r
       JOIN adoptables a ON a.id = r.adoptable_id
       WHERE r.id = ?1",
      params![id],
      |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
    )
    .optional()?;
  let Some((current, adoptable_id, owner, listing_status)) = row else {
    return Err(CoreError::forbidden("unauthorized or invalid").into());
  };
  if owner != caretaker_id {
    return Err(CoreError::forbidden("unauthorized or invalid").into());
  }

  let current: RequestStatus = decode_enum(&current)?;
  current.transition(next)?;
  // An adopted listing is closed; approving would reopen it as Hold.
  let listing_status: ListingStatus = decode_enum(&listing_status)?;
  if next == RequestStatus::Approved && listing_status == ListingStatus::Adopted {
    return Err(CoreError::NotAvailable.into());
  }

  let now = encode_dt(Utc::now());
  let changed = tx.execute(
    "UPDATE adoption_requests SET status = ?1, updated_at = ?2
     WHERE id = ?3
       AND status = ?4
       AND adoptable_id IN (SELECT id FROM adoptables WHERE caretaker_id = ?5)",
    params![next.as_ref(), now, id, current.as_ref(), caretaker_id],
  )?;
  if changed == 0 {
    return Err(CoreError::forbidden("unauthorized or invalid").into());
  }

  if next == RequestStatus::Approved {
    tx.execute(
      "UPDATE adoptables SET status = ?1, updated_at = ?2
       WHERE id = ?3 AND status = ?4",
      params![
        ListingStatus::Hold.as_ref(),
        now,
        adoptable_id,
        ListingStatus::Available.as_ref()
      ],
    )?;
  }

  let request = get(&tx, id)?
    .ok_or_else(|| CoreError::not_found(format!("adoption request {id}")))?;
  tx.commit()?;

  tracing::info!(
    request_id = id,
    adoptable_id,
    from = current.as_ref(),
    to = next.as_ref(),
    "adoption request status changed"
  );
  Ok(request)
}

pub fn withdraw(conn: &mut Connection, adopter_id: i64, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  let Some(request) = get(&tx, id)? else {
    return Err(CoreError::not_found(format!("adoption request {id}")).into());
  };
  if request.adopter_id != adopter_id {
    return Err(CoreError::forbidden("only the applicant can withdraw").into());
  }
  if request.status != RequestStatus::Pending {
    return Err(
      CoreError::validation("only pending applications can be withdrawn").into(),
    );
  }
  // Messages cascade.
  tx.execute("DELETE FROM adoption_requests WHERE id = ?1", params![id])?;
  tx.commit()?;
  Ok(())
}
