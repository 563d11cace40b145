use serde::{Deserialize, Serialize};

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardCounts {
  pub users:             u64,
  pub admins:            u64,
  pub adoptables:        u64,
  pub available:         u64,
  pub on_hold:           u64,
  pub adopted:           u64,
  pub requests:          u64,
  pub pending_requests:  u64,
  pub approved_requests: u64,
  pub pets:              u64,
}
