//! Event manager — the status-bucketed event store.
//!
//! Live events are indexed in memory by status and mirrored to the
//! [`EventRepository`]. Every mutation holds the bucket lock across its
//! persistence write, so memory and store never disagree for longer than
//! one operation; a failed write leaves (or rolls) memory back to its
//! previous state.

use tokio::sync::Mutex;

use gather_domain::error::{GatherError, NotFoundError, ValidationError};
use gather_domain::event::{Event, EventBuilder, EventStatus};
use gather_domain::id::{ActorId, EventId};
use gather_domain::notification::Notification;

use crate::ports::{EventRepository, NotificationPublisher};

#[derive(Debug, Default)]
struct Buckets {
    upcoming: Vec<Event>,
    active: Vec<Event>,
    ended: Vec<Event>,
}

impl Buckets {
    fn bucket(&self, status: EventStatus) -> &Vec<Event> {
        match status {
            EventStatus::Upcoming => &self.upcoming,
            EventStatus::Active => &self.active,
            EventStatus::Ended => &self.ended,
        }
    }

    fn bucket_mut(&mut self, status: EventStatus) -> &mut Vec<Event> {
        match status {
            EventStatus::Upcoming => &mut self.upcoming,
            EventStatus::Active => &mut self.active,
            EventStatus::Ended => &mut self.ended,
        }
    }

    /// Bucket and index of `id`.
    fn locate(&self, id: EventId) -> Option<(EventStatus, usize)> {
        EventStatus::ALL.into_iter().find_map(|status| {
            self.bucket(status)
                .iter()
                .position(|e| e.id() == id)
                .map(|index| (status, index))
        })
    }

    fn find(&self, id: EventId) -> Option<&Event> {
        self.locate(id)
            .map(|(status, index)| &self.bucket(status)[index])
    }

    fn find_mut(&mut self, id: EventId) -> Option<&mut Event> {
        let (status, index) = self.locate(id)?;
        Some(&mut self.bucket_mut(status)[index])
    }

    fn remove(&mut self, id: EventId) -> Option<Event> {
        let (status, index) = self.locate(id)?;
        Some(self.bucket_mut(status).remove(index))
    }
}

fn not_found(id: EventId) -> GatherError {
    NotFoundError {
        entity: "Event",
        id: id.to_string(),
    }
    .into()
}

/// Application service owning the in-memory status buckets.
pub struct EventManager<R, P> {
    repo: R,
    publisher: P,
    buckets: Mutex<Buckets>,
}

impl<R, P> EventManager<R, P>
where
    R: EventRepository,
    P: NotificationPublisher,
{
    /// Create a manager with empty buckets. Call [`load`](Self::load) to
    /// hydrate them from the store.
    pub fn new(repo: R, publisher: P) -> Self {
        Self {
            repo,
            publisher,
            buckets: Mutex::new(Buckets::default()),
        }
    }

    /// Fill the upcoming and active buckets from the store.
    ///
    /// The ended bucket only ever holds events that ended while this
    /// manager was running.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository; buckets are left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<(), GatherError> {
        let mut loaded = Vec::new();
        for status in EventStatus::ALL.into_iter().filter(|s| s.is_live()) {
            let events = self.repo.find_by_status(status).await?;
            tracing::info!(%status, count = events.len(), "events loaded");
            loaded.push((status, events));
        }

        let mut buckets = self.buckets.lock().await;
        for (status, events) in loaded {
            *buckets.bucket_mut(status) = events;
        }
        Ok(())
    }

    /// Build, persist and index a new event.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::Validation`] when the builder is incomplete
    /// or sets a status other than upcoming, or a storage error from the
    /// repository.
    #[tracing::instrument(skip(self, builder))]
    pub async fn create_event(&self, builder: EventBuilder) -> Result<Event, GatherError> {
        let event = builder.build()?;
        if event.status() != EventStatus::Upcoming {
            return Err(ValidationError::NotUpcoming.into());
        }

        let mut buckets = self.buckets.lock().await;
        let event = self.repo.create(event).await?;
        buckets.upcoming.push(event.clone());
        tracing::info!(event_id = %event.id(), name = event.name(), "event registered");
        Ok(event)
    }

    /// Snapshot of one event, looked up in memory first, then in the store.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event exists nowhere, or
    /// a storage error from the repository.
    pub async fn get_event(&self, id: EventId) -> Result<Event, GatherError> {
        if let Some(event) = self.buckets.lock().await.find(id) {
            return Ok(event.clone());
        }
        self.repo.get_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Snapshots of the events in `status`; `None` means every live
    /// (upcoming and active) event.
    pub async fn get_events(&self, status: Option<EventStatus>) -> Vec<Event> {
        let buckets = self.buckets.lock().await;
        match status {
            Some(status) => buckets.bucket(status).clone(),
            None => EventStatus::ALL
                .into_iter()
                .filter(|status| status.is_live())
                .flat_map(|status| buckets.bucket(status).iter().cloned())
                .collect(),
        }
    }

    /// Move an event to `new_status`: persist, re-bucket, then notify
    /// subscribers with a [`Notification::StatusChanged`].
    ///
    /// The transition itself is not checked; moving an event to the status
    /// it already holds does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event is not indexed, or
    /// a storage error, in which case nothing changed.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(
        &self,
        id: EventId,
        new_status: EventStatus,
    ) -> Result<Event, GatherError> {
        let (event, old_status) = {
            let mut buckets = self.buckets.lock().await;
            let (old_status, index) = buckets.locate(id).ok_or_else(|| not_found(id))?;
            if old_status == new_status {
                return Ok(buckets.bucket(old_status)[index].clone());
            }

            if let Err(err) = self.repo.update_status(id, new_status).await {
                tracing::warn!(error = %err, "failed to persist status change");
                return Err(err);
            }

            let mut event = buckets.bucket_mut(old_status).remove(index);
            event.set_status(new_status);
            buckets.bucket_mut(new_status).push(event.clone());
            (event, old_status)
        };

        tracing::info!(event_id = %id, "status changed {old_status} -> {new_status}");
        let notification = Notification::StatusChanged {
            event: event.clone(),
            from: old_status,
            to: new_status,
        };
        if let Err(err) = self.publisher.publish(notification).await {
            tracing::warn!(error = %err, "failed to publish status change");
        }
        Ok(event)
    }

    /// Add `actor` to the entrants of an event.
    ///
    /// Returns `false` without writing when the actor already joined.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event is not indexed, or
    /// a storage error, in which case the entrant is removed again.
    #[tracing::instrument(skip(self))]
    pub async fn add_entrant(&self, id: EventId, actor: ActorId) -> Result<bool, GatherError> {
        let mut buckets = self.buckets.lock().await;
        let event = buckets.find_mut(id).ok_or_else(|| not_found(id))?;
        if !event.add_entrant(actor) {
            return Ok(false);
        }

        let entrants = event.entrants().to_vec();
        if let Err(err) = self.repo.update_entrants(id, entrants).await {
            tracing::warn!(error = %err, "failed to persist entrant, rolling back");
            event.remove_entrant(actor);
            return Err(err);
        }
        Ok(true)
    }

    /// Remove `actor` from the entrants of an event.
    ///
    /// Returns `false` without writing when the actor had not joined.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event is not indexed, or
    /// a storage error, in which case the entrant list is restored.
    #[tracing::instrument(skip(self))]
    pub async fn remove_entrant(&self, id: EventId, actor: ActorId) -> Result<bool, GatherError> {
        let mut buckets = self.buckets.lock().await;
        let event = buckets.find_mut(id).ok_or_else(|| not_found(id))?;
        let previous = event.entrants().to_vec();
        if !event.remove_entrant(actor) {
            return Ok(false);
        }

        let entrants = event.entrants().to_vec();
        if let Err(err) = self.repo.update_entrants(id, entrants).await {
            tracing::warn!(error = %err, "failed to persist entrant removal, rolling back");
            // Re-append the actor and everyone who joined after it.
            let tail: Vec<ActorId> = previous.into_iter().skip_while(|a| *a != actor).collect();
            for entrant in &tail {
                event.remove_entrant(*entrant);
            }
            for entrant in tail {
                event.add_entrant(entrant);
            }
            return Err(err);
        }
        Ok(true)
    }

    /// Set one event option, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the event is not indexed, or
    /// a storage error, in which case the previous value is restored.
    #[tracing::instrument(skip(self, value))]
    pub async fn set_option(
        &self,
        id: EventId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<Option<serde_json::Value>, GatherError> {
        let mut buckets = self.buckets.lock().await;
        let event = buckets.find_mut(id).ok_or_else(|| not_found(id))?;
        let previous = event.set_option(key, value);

        let options = event.options().clone();
        if let Err(err) = self.repo.update_options(id, options).await {
            tracing::warn!(error = %err, "failed to persist option, rolling back");
            match &previous {
                Some(old) => {
                    event.set_option(key, old.clone());
                }
                None => {
                    event.remove_option(key);
                }
            }
            return Err(err);
        }
        Ok(previous)
    }

    /// Delete an event from the store and from memory.
    ///
    /// # Errors
    ///
    /// Returns [`GatherError::NotFound`] when the store holds no such
    /// event, or a storage error; in both cases memory is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: EventId) -> Result<(), GatherError> {
        let mut buckets = self.buckets.lock().await;
        if !self.repo.delete(id).await? {
            return Err(not_found(id));
        }
        buckets.remove(id);
        tracing::info!(event_id = %id, "event deleted");
        Ok(())
    }
}
