//! Enrollment entity definitions.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration state of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Waiting for a free spot or for a manager's decision.
    #[default]
    Pending,
    /// Holds a spot at the event.
    Accepted,
    /// Turned down by a manager.
    Rejected,
}

impl EnrollmentStatus {
    /// Converts the status to a string for display and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// A participant's registration for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Participant.
    pub account_id: Uuid,
    /// When the participant enrolled. Orders the waiting list.
    pub enrolled_at: DateTime<Utc>,
    /// Registration state.
    pub status: EnrollmentStatus,
    /// Whether the participant checked in at the event.
    pub attended: bool,
}

impl Enrollment {
    /// Creates a pending enrollment.
    pub fn new(event_id: Uuid, account_id: Uuid, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            account_id,
            enrolled_at,
            status: EnrollmentStatus::Pending,
            attended: false,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == EnrollmentStatus::Accepted
    }

    pub fn is_pending(&self) -> bool {
        self.status == EnrollmentStatus::Pending
    }
}

impl PartialEq for Enrollment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Enrollment {}

impl Hash for Enrollment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
