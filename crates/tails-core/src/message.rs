//! Chat messages scoped to a single adoption request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  pub id:         i64,
  pub request_id: i64,
  pub sender_id:  i64,
  pub content:    String,
  pub sent_at:    DateTime<Utc>,
  pub is_read:    bool,
}

/// Trim message content and enforce length limits.
pub fn clean_content(raw: &str) -> Result<String> {
  let content = raw.trim();
  if content.is_empty() {
    return Err(Error::validation("message content is required"));
  }
  if content.chars().count() > MAX_MESSAGE_LEN {
    return Err(Error::validation("message is too long"));
  }
  Ok(content.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_content_is_rejected() {
    assert!(clean_content(" \n\t ").is_err());
  }

  #[test]
  fn content_is_trimmed() {
    assert_eq!(clean_content("  hi there ").unwrap(), "hi there");
  }

  #[test]
  fn limit_counts_characters() {
    let exact = "é".repeat(MAX_MESSAGE_LEN);
    assert!(clean_content(&exact).is_ok());
    assert!(clean_content(&format!("{exact}é")).is_err());
  }
}
