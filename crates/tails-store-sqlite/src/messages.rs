//! Per-request chat messages.

use chrono::Utc;
use rusqlite::{Connection, params};
use tails_core::{
  Error as CoreError,
  message::{Message, clean_content},
};

use crate::{
  Result,
  adoption::participants,
  encode::{MESSAGE_COLUMNS, RawMessage, encode_dt},
};

/// Confirm `user_id` is the adopter or caretaker on `request_id`.
fn check_participant(conn: &Connection, user_id: i64, request_id: i64) -> Result<()> {
  let Some((adopter_id, caretaker_id)) = participants(conn, request_id)? else {
    return Err(CoreError::not_found(format!("adoption request {request_id}")).into());
  };
  if user_id != adopter_id && user_id != caretaker_id {
    return Err(CoreError::forbidden("not a participant in this conversation").into());
  }
  Ok(())
}

pub fn send(
  conn: &mut Connection,
  sender_id: i64,
  request_id: i64,
  content: &str,
) -> Result<Message> {
  let content = clean_content(content)?;
  let tx = conn.transaction()?;
  check_participant(&tx, sender_id, request_id)?;

  let sent_at = Utc::now();
  tx.execute(
    "INSERT INTO messages (request_id, sender_id, content, sent_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![request_id, sender_id, content, encode_dt(sent_at)],
  )?;
  let id = tx.last_insert_rowid();
  tx.commit()?;

  Ok(Message { id, request_id, sender_id, content, sent_at, is_read: false })
}

/// Read a conversation and mark the other participant's messages as read.
///
/// Returned messages reflect their read state before this call.
pub fn list(conn: &mut Connection, reader_id: i64, request_id: i64) -> Result<Vec<Message>> {
  let tx = conn.transaction()?;
  check_participant(&tx, reader_id, request_id)?;

  let raws = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {MESSAGE_COLUMNS} FROM messages
       WHERE request_id = ?1
       ORDER BY id"
    ))?;
    stmt
      .query_map(params![request_id], RawMessage::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  tx.execute(
    "UPDATE messages SET is_read = 1
     WHERE request_id = ?1 AND sender_id != ?2 AND is_read = 0",
    params![request_id, reader_id],
  )?;
  tx.commit()?;

  raws.into_iter().map(RawMessage::into_message).collect()
}

pub fn unread_count(conn: &Connection, user_id: i64) -> Result<u64> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*)
     FROM messages m
     JOIN adoption_requests r ON r.id = m.request_id
     JOIN adoptables        a ON a.id = r.adoptable_id
     WHERE m.is_read = 0
       AND m.sender_id != ?1
       AND (r.adopter_id = ?1 OR a.caretaker_id = ?1)",
    params![user_id],
    |r| r.get(0),
  )?;
  Ok(count.max(0) as u64)
}
