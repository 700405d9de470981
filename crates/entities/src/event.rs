//! Event entity definitions and the enrollment lifecycle.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Enrollment, EnrollmentStatus};

/// How enrollments of an event are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Enrollments are accepted in arrival order while spots remain.
    #[default]
    FirstComeFirstServed,
    /// A study manager accepts or rejects each enrollment.
    ConfirmativeAcceptance,
}

/// Violations of the event and enrollment rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The schedule is not ordered.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(&'static str),

    /// The enrollment window has passed.
    #[error("Enrollment is closed")]
    EnrollmentClosed,

    /// The account already holds an enrollment for the event.
    #[error("Already enrolled")]
    AlreadyEnrolled,

    /// The account holds no enrollment for the event.
    #[error("Not enrolled")]
    NotEnrolled,

    /// No enrollment with this id belongs to the event.
    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(Uuid),

    /// The enrollment was already checked in.
    #[error("Enrollment already attended")]
    AlreadyAttended,

    /// Every spot is taken.
    #[error("No remaining spots")]
    CapacityReached,

    /// The requested limit is lower than the number of accepted enrollments.
    #[error("Limit {requested} is below the {accepted} accepted enrollments")]
    LimitBelowAccepted { requested: u32, accepted: u32 },

    /// Manual acceptance only applies to confirmative events.
    #[error("Enrollments of a first-come-first-served event are managed automatically")]
    NotConfirmative,

    /// Only accepted enrollments can be checked in.
    #[error("Enrollment is not accepted")]
    NotAccepted,
}

/// The time window of an event.
///
/// Construction guarantees `end_enrollment_at <= start_at <= end_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSchedule {
    end_enrollment_at: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
}

impl EventSchedule {
    /// Creates a schedule, rejecting out-of-order timestamps.
    pub fn new(
        end_enrollment_at: DateTime<Utc>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Self, EventError> {
        if end_enrollment_at > start_at {
            return Err(EventError::InvalidSchedule(
                "enrollment must end before the event starts",
            ));
        }
        if start_at > end_at {
            return Err(EventError::InvalidSchedule(
                "event must start before it ends",
            ));
        }
        Ok(Self {
            end_enrollment_at,
            start_at,
            end_at,
        })
    }

    pub fn end_enrollment_at(&self) -> DateTime<Utc> {
        self.end_enrollment_at
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn end_at(&self) -> DateTime<Utc> {
        self.end_at
    }
}

/// A scheduled activity of a study.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: Uuid,
    /// Owning study.
    pub study_id: Uuid,
    /// Account that created the event.
    pub created_by: Uuid,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// Last moment at which enrollment is possible.
    pub end_enrollment_at: DateTime<Utc>,
    /// When the event starts.
    pub start_at: DateTime<Utc>,
    /// When the event ends.
    pub end_at: DateTime<Utc>,
    /// Maximum number of accepted enrollments. `None` means unlimited.
    pub limit_of_enrollments: Option<u32>,
    /// Enrollments in arrival order.
    pub enrollments: Vec<Enrollment>,
    /// Acceptance policy.
    pub event_type: EventType,
    /// Optimistic concurrency counter, bumped by the store on every update.
    pub version: u64,
}

impl Event {
    /// Creates a new event.
    pub fn new(
        study_id: Uuid,
        created_by: Uuid,
        title: impl Into<String>,
        event_type: EventType,
        schedule: EventSchedule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            study_id,
            created_by,
            title: title.into(),
            description: None,
            created_at: Utc::now(),
            end_enrollment_at: schedule.end_enrollment_at(),
            start_at: schedule.start_at(),
            end_at: schedule.end_at(),
            limit_of_enrollments: None,
            enrollments: Vec::new(),
            event_type,
            version: 0,
        }
    }

    /// Returns the current schedule.
    pub fn schedule(&self) -> EventSchedule {
        EventSchedule {
            end_enrollment_at: self.end_enrollment_at,
            start_at: self.start_at,
            end_at: self.end_at,
        }
    }

    /// Replaces the schedule.
    pub fn reschedule(&mut self, schedule: EventSchedule) {
        self.end_enrollment_at = schedule.end_enrollment_at();
        self.start_at = schedule.start_at();
        self.end_at = schedule.end_at();
    }

    /// Number of accepted enrollments.
    pub fn accepted_count(&self) -> u32 {
        self.enrollments.iter().filter(|e| e.is_accepted()).count() as u32
    }

    /// Remaining spots, or `None` when the event has no limit.
    pub fn remaining_spots(&self) -> Option<u32> {
        self.limit_of_enrollments
            .map(|limit| limit.saturating_sub(self.accepted_count()))
    }

    /// Returns true if another enrollment can be accepted.
    pub fn has_capacity(&self) -> bool {
        self.remaining_spots().is_none_or(|spots| spots > 0)
    }

    /// Returns true while new enrollments are allowed.
    pub fn is_enrollment_open(&self, now: DateTime<Utc>) -> bool {
        now <= self.end_enrollment_at
    }

    /// Returns the enrollment held by the account, if any.
    pub fn enrollment_of(&self, account_id: Uuid) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| e.account_id == account_id)
    }

    /// Returns true if the account may enroll now.
    pub fn is_enrollable_for(&self, account_id: Uuid, now: DateTime<Utc>) -> bool {
        self.is_enrollment_open(now) && self.enrollment_of(account_id).is_none()
    }

    /// Returns true if the account may withdraw its enrollment now.
    pub fn is_disenrollable_for(&self, account_id: Uuid, now: DateTime<Utc>) -> bool {
        self.is_enrollment_open(now)
            && self
                .enrollment_of(account_id)
                .is_some_and(|e| !e.attended)
    }

    /// Enrolls an account.
    ///
    /// First-come-first-served events accept the enrollment while spots
    /// remain and wait-list it otherwise. Confirmative events always start
    /// it as pending.
    pub fn enroll(&mut self, account_id: Uuid, now: DateTime<Utc>) -> Result<&Enrollment, EventError> {
        if !self.is_enrollment_open(now) {
            return Err(EventError::EnrollmentClosed);
        }
        if self.enrollment_of(account_id).is_some() {
            return Err(EventError::AlreadyEnrolled);
        }

        let mut enrollment = Enrollment::new(self.id, account_id, now);
        if self.event_type == EventType::FirstComeFirstServed && self.has_capacity() {
            enrollment.status = EnrollmentStatus::Accepted;
        }
        self.enrollments.push(enrollment);

        Ok(&self.enrollments[self.enrollments.len() - 1])
    }

    /// Withdraws an account's enrollment and returns it.
    ///
    /// On first-come-first-served events a freed spot goes to the earliest
    /// waiting enrollment.
    pub fn disenroll(&mut self, account_id: Uuid, now: DateTime<Utc>) -> Result<Enrollment, EventError> {
        if !self.is_enrollment_open(now) {
            return Err(EventError::EnrollmentClosed);
        }
        let index = self
            .enrollments
            .iter()
            .position(|e| e.account_id == account_id)
            .ok_or(EventError::NotEnrolled)?;
        if self.enrollments[index].attended {
            return Err(EventError::AlreadyAttended);
        }

        let removed = self.enrollments.remove(index);
        if removed.is_accepted() {
            self.promote_waiting();
        }
        Ok(removed)
    }

    /// Accepts a pending or rejected enrollment of a confirmative event.
    pub fn accept(&mut self, enrollment_id: Uuid) -> Result<(), EventError> {
        if self.event_type != EventType::ConfirmativeAcceptance {
            return Err(EventError::NotConfirmative);
        }
        let has_capacity = self.has_capacity();
        let enrollment = self.enrollment_mut(enrollment_id)?;
        if enrollment.attended {
            return Err(EventError::AlreadyAttended);
        }
        if enrollment.is_accepted() {
            return Ok(());
        }
        if !has_capacity {
            return Err(EventError::CapacityReached);
        }
        enrollment.status = EnrollmentStatus::Accepted;
        Ok(())
    }

    /// Rejects an enrollment of a confirmative event.
    pub fn reject(&mut self, enrollment_id: Uuid) -> Result<(), EventError> {
        if self.event_type != EventType::ConfirmativeAcceptance {
            return Err(EventError::NotConfirmative);
        }
        let enrollment = self.enrollment_mut(enrollment_id)?;
        if enrollment.attended {
            return Err(EventError::AlreadyAttended);
        }
        enrollment.status = EnrollmentStatus::Rejected;
        Ok(())
    }

    /// Marks an accepted enrollment as attended.
    pub fn check_in(&mut self, enrollment_id: Uuid) -> Result<(), EventError> {
        let enrollment = self.enrollment_mut(enrollment_id)?;
        if !enrollment.is_accepted() {
            return Err(EventError::NotAccepted);
        }
        enrollment.attended = true;
        Ok(())
    }

    /// Clears the attended mark.
    pub fn cancel_check_in(&mut self, enrollment_id: Uuid) -> Result<(), EventError> {
        let enrollment = self.enrollment_mut(enrollment_id)?;
        enrollment.attended = false;
        Ok(())
    }

    /// Changes the enrollment limit.
    ///
    /// The limit can never drop below the accepted count. Raising it on a
    /// first-come-first-served event accepts waiting enrollments.
    pub fn change_limit(&mut self, limit: Option<u32>) -> Result<(), EventError> {
        let accepted = self.accepted_count();
        if let Some(requested) = limit {
            if requested < accepted {
                return Err(EventError::LimitBelowAccepted { requested, accepted });
            }
        }
        self.limit_of_enrollments = limit;
        self.promote_waiting();
        Ok(())
    }

    fn enrollment_mut(&mut self, enrollment_id: Uuid) -> Result<&mut Enrollment, EventError> {
        self.enrollments
            .iter_mut()
            .find(|e| e.id == enrollment_id)
            .ok_or(EventError::EnrollmentNotFound(enrollment_id))
    }

    fn promote_waiting(&mut self) {
        if self.event_type != EventType::FirstComeFirstServed {
            return;
        }
        while self.has_capacity() {
            let next = self
                .enrollments
                .iter_mut()
                .filter(|e| e.is_pending())
                .min_by_key(|e| e.enrolled_at);
            match next {
                Some(enrollment) => enrollment.status = EnrollmentStatus::Accepted,
                None => break,
            }
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn schedule(now: DateTime<Utc>) -> EventSchedule {
        EventSchedule::new(
            now + Duration::days(1),
            now + Duration::days(2),
            now + Duration::days(2) + Duration::hours(2),
        )
        .unwrap()
    }

    fn event(event_type: EventType, limit: u32) -> (Event, DateTime<Utc>) {
        let now = Utc::now();
        let mut event = Event::new(Uuid::new_v4(), Uuid::new_v4(), "Meetup", event_type, schedule(now));
        event.limit_of_enrollments = Some(limit);
        (event, now)
    }

    #[test]
    fn test_schedule_ordering() {
        let now = Utc::now();
        assert!(EventSchedule::new(now, now, now).is_ok());
        assert!(matches!(
            EventSchedule::new(now + Duration::hours(1), now, now + Duration::hours(2)),
            Err(EventError::InvalidSchedule(_))
        ));
        assert!(matches!(
            EventSchedule::new(now, now + Duration::hours(2), now + Duration::hours(1)),
            Err(EventError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_fcfs_accepts_until_full_then_waitlists() {
        let (mut event, now) = event(EventType::FirstComeFirstServed, 2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        assert!(event.enroll(a, now).unwrap().is_accepted());
        assert!(event.enroll(b, now).unwrap().is_accepted());
        assert!(event.enroll(c, now).unwrap().is_pending());
        assert_eq!(event.accepted_count(), 2);
        assert_eq!(event.remaining_spots(), Some(0));
    }

    #[test]
    fn test_fcfs_disenroll_promotes_earliest_waiting() {
        let (mut event, now) = event(EventType::FirstComeFirstServed, 1);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        event.enroll(a, now).unwrap();
        event.enroll(b, now + Duration::minutes(1)).unwrap();
        event.enroll(c, now + Duration::minutes(2)).unwrap();

        let removed = event.disenroll(a, now + Duration::minutes(3)).unwrap();

        assert!(removed.is_accepted());
        assert!(event.enrollment_of(b).unwrap().is_accepted());
        assert!(event.enrollment_of(c).unwrap().is_pending());
    }

    #[test]
    fn test_enroll_rules() {
        let (mut event, now) = event(EventType::FirstComeFirstServed, 5);
        let account = Uuid::new_v4();

        event.enroll(account, now).unwrap();
        assert_eq!(
            event.enroll(account, now).unwrap_err(),
            EventError::AlreadyEnrolled
        );

        let late = event.end_enrollment_at + Duration::seconds(1);
        assert_eq!(
            event.enroll(Uuid::new_v4(), late).unwrap_err(),
            EventError::EnrollmentClosed
        );
        assert!(event.is_enrollable_for(Uuid::new_v4(), event.end_enrollment_at));
    }

    #[test]
    fn test_unlimited_event_always_has_capacity() {
        let now = Utc::now();
        let mut event = Event::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Open",
            EventType::FirstComeFirstServed,
            schedule(now),
        );

        for _ in 0..10 {
            assert!(event.enroll(Uuid::new_v4(), now).unwrap().is_accepted());
        }
        assert_eq!(event.remaining_spots(), None);
    }

    #[test]
    fn test_confirmative_accept_respects_capacity() {
        let (mut event, now) = event(EventType::ConfirmativeAcceptance, 1);
        let first = event.enroll(Uuid::new_v4(), now).unwrap().id;
        let second = event.enroll(Uuid::new_v4(), now).unwrap().id;

        assert_eq!(event.accepted_count(), 0);
        event.accept(first).unwrap();
        assert_eq!(event.accept(second).unwrap_err(), EventError::CapacityReached);

        event.reject(first).unwrap();
        event.accept(second).unwrap();
        assert_eq!(event.accepted_count(), 1);
    }

    #[test]
    fn test_accept_on_fcfs_is_refused() {
        let (mut event, now) = event(EventType::FirstComeFirstServed, 1);
        let id = event.enroll(Uuid::new_v4(), now).unwrap().id;

        assert_eq!(event.accept(id).unwrap_err(), EventError::NotConfirmative);
        assert_eq!(event.reject(id).unwrap_err(), EventError::NotConfirmative);
    }

    #[test]
    fn test_check_in() {
        let (mut event, now) = event(EventType::ConfirmativeAcceptance, 2);
        let account = Uuid::new_v4();
        let id = event.enroll(account, now).unwrap().id;

        assert_eq!(event.check_in(id).unwrap_err(), EventError::NotAccepted);
        event.accept(id).unwrap();
        event.check_in(id).unwrap();

        assert!(!event.is_disenrollable_for(account, now));
        assert_eq!(
            event.disenroll(account, now).unwrap_err(),
            EventError::AlreadyAttended
        );
        assert_eq!(event.reject(id).unwrap_err(), EventError::AlreadyAttended);

        event.cancel_check_in(id).unwrap();
        assert!(event.is_disenrollable_for(account, now));
    }

    #[test]
    fn test_change_limit() {
        let (mut event, now) = event(EventType::FirstComeFirstServed, 1);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        event.enroll(a, now).unwrap();
        event.enroll(b, now + Duration::minutes(1)).unwrap();

        assert_eq!(
            event.change_limit(Some(0)).unwrap_err(),
            EventError::LimitBelowAccepted {
                requested: 0,
                accepted: 1
            }
        );

        event.change_limit(Some(2)).unwrap();
        assert!(event.enrollment_of(b).unwrap().is_accepted());
    }

    #[test]
    fn test_unknown_enrollment() {
        let (mut event, _) = event(EventType::ConfirmativeAcceptance, 1);
        let id = Uuid::new_v4();

        assert_eq!(
            event.accept(id).unwrap_err(),
            EventError::EnrollmentNotFound(id)
        );
    }

    #[test]
    fn test_event_type_serialization() {
        let json = serde_json::to_string(&EventType::ConfirmativeAcceptance).unwrap();
        assert_eq!(json, "\"confirmative_acceptance\"");
    }
}
