//! Adoption requests and the status rules caretakers apply to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{Error, Result, listing::ListingStatus, user::UserProfile};

/// Upper bound on the free-text message attached to an application.
pub const MAX_APPLICATION_MESSAGE: usize = 2000;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
  Pending,
  Interviewing,
  Approved,
  Rejected,
}

impl RequestStatus {
  /// Whether a caretaker may move a request from `self` to `next`.
  ///
  /// Pending may go anywhere but back to Pending; Interviewing may only be
  /// decided; Approved and Rejected are final.
  pub fn can_transition_to(self, next: RequestStatus) -> bool {
    !self.is_terminal() && next != RequestStatus::Pending && next != self
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, RequestStatus::Approved | RequestStatus::Rejected)
  }

  /// Check a transition, producing the error the API reports on failure.
  pub fn transition(self, next: RequestStatus) -> Result<RequestStatus> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(Error::InvalidTransition {
        from: self.as_ref().to_owned(),
        to:   next.as_ref().to_owned(),
      })
    }
  }
}

/// An application by one adopter for one listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionRequest {
  pub id:           i64,
  pub adopter_id:   i64,
  pub adoptable_id: i64,
  pub message:      String,
  pub status:       RequestStatus,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Normalise and bound an application message.
pub fn clean_application_message(raw: &str) -> Result<String> {
  let message = raw.trim();
  if message.chars().count() > MAX_APPLICATION_MESSAGE {
    return Err(Error::validation("message is too long"));
  }
  Ok(message.to_owned())
}

/// An adopter's view of one of their own applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
  #[serde(flatten)]
  pub request:          AdoptionRequest,
  pub adoptable_name:   String,
  pub adoptable_status: ListingStatus,
  pub cover_image:      Option<String>,
  pub caretaker_id:     i64,
  pub caretaker_name:   String,
}

/// A caretaker's view of an application on one of their listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingApplication {
  #[serde(flatten)]
  pub request:         AdoptionRequest,
  pub adoptable_name:  String,
  pub applicant_name:  String,
  pub applicant_email: String,
  pub profile:         Option<UserProfile>,
}

#[cfg(test)]
mod tests {
  use super::{
    MAX_APPLICATION_MESSAGE,
    RequestStatus::{self, *},
    clean_application_message,
  };

  const ALL: [RequestStatus; 4] = [Pending, Interviewing, Approved, Rejected];

  #[test]
  fn nothing_returns_to_pending() {
    for from in ALL {
      assert!(!from.can_transition_to(Pending), "{from:?} -> Pending");
    }
  }

  #[test]
  fn pending_can_be_decided_or_interviewed() {
    assert!(Pending.can_transition_to(Interviewing));
    assert!(Pending.can_transition_to(Approved));
    assert!(Pending.can_transition_to(Rejected));
    assert!(Interviewing.can_transition_to(Approved));
    assert!(Interviewing.can_transition_to(Rejected));
  }

  #[test]
  fn decisions_are_final() {
    for from in [Approved, Rejected] {
      assert!(from.is_terminal());
      for to in ALL {
        assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
      }
    }
  }

  #[test]
  fn interviewing_cannot_repeat() {
    assert!(!Interviewing.can_transition_to(Interviewing));
    assert!(!Pending.can_transition_to(Pending));
  }

  #[test]
  fn message_limit_counts_characters() {
    let accented = "é".repeat(MAX_APPLICATION_MESSAGE);
    assert_eq!(clean_application_message(&accented).unwrap(), accented);
    let over = "é".repeat(MAX_APPLICATION_MESSAGE + 1);
    assert!(clean_application_message(&over).is_err());
  }

  #[test]
  fn invalid_transition_names_both_states() {
    let err = Approved.transition(Interviewing).unwrap_err();
    assert_eq!(
      err.to_string(),
      "cannot change status from approved to interviewing"
    );
  }
}
