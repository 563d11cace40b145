//! Admin dashboard aggregates and account management.

use rusqlite::{Connection, params};
use tails_core::{admin::DashboardCounts, user::User};

use crate::{
  Result,
  encode::{RawUser, USER_COLUMNS},
  users,
};

pub fn dashboard_counts(conn: &Connection) -> Result<DashboardCounts> {
  let counts = conn.query_row(
    "SELECT
       (SELECT COUNT(*) FROM users),
       (SELECT COUNT(*) FROM users WHERE is_admin = 1),
       (SELECT COUNT(*) FROM adoptables),
       (SELECT COUNT(*) FROM adoptables WHERE status = 'available'),
       (SELECT COUNT(*) FROM adoptables WHERE status = 'hold'),
       (SELECT COUNT(*) FROM adoptables WHERE status = 'adopted'),
       (SELECT COUNT(*) FROM adoption_requests),
       (SELECT COUNT(*) FROM adoption_requests WHERE status = 'pending'),
       (SELECT COUNT(*) FROM adoption_requests WHERE status = 'approved'),
       (SELECT COUNT(*) FROM pets)",
    [],
    |r| {
      Ok(DashboardCounts {
        users:             r.get(0)?,
        admins:            r.get(1)?,
        adoptables:        r.get(2)?,
        available:         r.get(3)?,
        on_hold:           r.get(4)?,
        adopted:           r.get(5)?,
        requests:          r.get(6)?,
        pending_requests:  r.get(7)?,
        approved_requests: r.get(8)?,
        pets:              r.get(9)?,
      })
    },
  )?;
  Ok(counts)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
  let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
  let raws = stmt
    .query_map([], RawUser::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawUser::into_user).collect()
}

pub fn set_admin(conn: &Connection, user_id: i64, is_admin: bool) -> Result<User> {
  conn.execute(
    "UPDATE users SET is_admin = ?1 WHERE id = ?2",
    params![is_admin, user_id],
  )?;
  let user = users::require(conn, user_id)?;
  tracing::info!(user_id, is_admin, "admin flag changed");
  Ok(user)
}
