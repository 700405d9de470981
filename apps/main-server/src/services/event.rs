//! Event and enrollment operations.

use chrono::{DateTime, Utc};
use entities::{Account, Event, EventSchedule, Study};
use forms::EventForm;
use study_store::StudyStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::services::MAX_UPDATE_ATTEMPTS;

/// Event operations.
///
/// Changes are applied to a freshly loaded event and committed with the
/// version it was loaded at. When another request committed first the change
/// is re-applied to the new state, so capacity checks always run against the
/// state being written.
pub struct EventService<'a, S: StudyStore> {
    store: &'a S,
}

impl<'a, S: StudyStore> EventService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Creates an event from a validated form.
    pub async fn create_event(&self, study: &Study, account: &Account, form: EventForm) -> ServerResult<Event> {
        let schedule = EventSchedule::new(
            form.end_enrollment_date_time,
            form.start_date_time,
            form.end_date_time,
        )?;

        let mut event = Event::new(study.id, account.id, form.title, form.event_type, schedule);
        event.description = form.description;
        event.limit_of_enrollments = form.limit_of_enrollments;

        let event = self.store.create_event(event).await?;

        tracing::info!(event_id = %event.id, study_id = %study.id, "Event created");

        Ok(event)
    }

    /// Gets an event of the study.
    pub async fn get_event(&self, study: &Study, event_id: Uuid) -> ServerResult<Event> {
        let event = self.load(event_id).await?;
        if event.study_id != study.id {
            return Err(ServerError::NotFound(format!("Event not found: {event_id}")));
        }
        Ok(event)
    }

    pub async fn list_events(&self, study: &Study) -> ServerResult<Vec<Event>> {
        Ok(self.store.list_events(study.id).await?)
    }

    /// Applies an edit form. The event type cannot change.
    pub async fn update_event(&self, event: &Event, form: EventForm) -> ServerResult<Event> {
        if form.event_type != event.event_type {
            return Err(ServerError::field(
                "eventType",
                "immutable.eventType",
                "the event type cannot be changed",
            ));
        }
        let schedule = EventSchedule::new(
            form.end_enrollment_date_time,
            form.start_date_time,
            form.end_date_time,
        )?;

        let event = self
            .modify(event.id, |event| {
                event.change_limit(form.limit_of_enrollments)?;
                event.title = form.title.clone();
                event.description = form.description.clone();
                event.reschedule(schedule);
                Ok(())
            })
            .await?;

        tracing::info!(event_id = %event.id, "Event updated");

        Ok(event)
    }

    pub async fn delete_event(&self, event: &Event) -> ServerResult<()> {
        self.store.delete_event(event.id).await?;
        tracing::info!(event_id = %event.id, "Event deleted");
        Ok(())
    }

    pub async fn enroll(&self, event_id: Uuid, account_id: Uuid, now: DateTime<Utc>) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| {
                event.enroll(account_id, now)?;
                Ok(())
            })
            .await?;

        tracing::info!(event_id = %event_id, account_id = %account_id, "Enrolled");

        Ok(event)
    }

    pub async fn disenroll(&self, event_id: Uuid, account_id: Uuid, now: DateTime<Utc>) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| {
                event.disenroll(account_id, now)?;
                Ok(())
            })
            .await?;

        tracing::info!(event_id = %event_id, account_id = %account_id, "Disenrolled");

        Ok(event)
    }

    pub async fn accept(&self, event_id: Uuid, enrollment_id: Uuid) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| Ok(event.accept(enrollment_id)?))
            .await?;
        tracing::info!(event_id = %event_id, enrollment_id = %enrollment_id, "Enrollment accepted");
        Ok(event)
    }

    pub async fn reject(&self, event_id: Uuid, enrollment_id: Uuid) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| Ok(event.reject(enrollment_id)?))
            .await?;
        tracing::info!(event_id = %event_id, enrollment_id = %enrollment_id, "Enrollment rejected");
        Ok(event)
    }

    pub async fn check_in(&self, event_id: Uuid, enrollment_id: Uuid) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| Ok(event.check_in(enrollment_id)?))
            .await?;
        tracing::info!(event_id = %event_id, enrollment_id = %enrollment_id, "Checked in");
        Ok(event)
    }

    pub async fn cancel_check_in(&self, event_id: Uuid, enrollment_id: Uuid) -> ServerResult<Event> {
        let event = self
            .modify(event_id, |event| Ok(event.cancel_check_in(enrollment_id)?))
            .await?;
        tracing::info!(event_id = %event_id, enrollment_id = %enrollment_id, "Check-in cancelled");
        Ok(event)
    }

    async fn load(&self, event_id: Uuid) -> ServerResult<Event> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("Event not found: {event_id}")))
    }

    /// Loads the event, applies `change` and commits it, retrying on version
    /// conflicts.
    async fn modify<F>(&self, event_id: Uuid, mut change: F) -> ServerResult<Event>
    where
        F: FnMut(&mut Event) -> ServerResult<()> + Send,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let mut event = self.load(event_id).await?;
            change(&mut event)?;

            match self.store.update_event(event).await {
                Ok(event) => return Ok(event),
                Err(e) if e.is_conflict() => {
                    tracing::warn!(event_id = %event_id, attempt, "Event changed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServerError::Conflict(format!(
            "Event {event_id} changed concurrently {MAX_UPDATE_ATTEMPTS} times"
        )))
    }
}
