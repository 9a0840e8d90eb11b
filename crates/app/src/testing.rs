//! In-memory port doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use gather_domain::automation::{
    ActionBuilder, ActionInstance, ActionKind, FieldSpec, FieldType, OptionsSchema, Slot,
};
use gather_domain::error::{GatherError, NotFoundError};
use gather_domain::event::{Event, EventOptions, EventStatus};
use gather_domain::id::{ActorId, EventId};
use gather_domain::notification::Notification;
use gather_domain::time::{Timestamp, now};

use crate::action_registry::ActionRegistry;
use crate::ports::{
    ActionContext, ActionHandler, AutomationRepository, AutomationRow, EventRepository,
    NotificationPublisher,
};

fn simulated_failure() -> GatherError {
    GatherError::Storage("simulated write failure".into())
}

fn missing_event(id: EventId) -> GatherError {
    NotFoundError {
        entity: "Event",
        id: id.to_string(),
    }
    .into()
}

pub fn event_between(name: &str, start: Timestamp, end: Option<Timestamp>) -> Event {
    let builder = Event::builder()
        .name(name)
        .owner(ActorId::new())
        .start_time(start);
    let builder = match end {
        Some(end) => builder.end_time(end),
        None => builder,
    };
    builder.build().unwrap()
}

pub fn upcoming_event(name: &str) -> Event {
    let start = now() + Duration::hours(1);
    event_between(name, start, Some(start + Duration::hours(1)))
}

#[derive(Default)]
pub struct InMemoryEventRepo {
    rows: Mutex<HashMap<EventId, Event>>,
    fail_writes: AtomicBool,
}

impl InMemoryEventRepo {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert(&self, event: Event) {
        self.rows.lock().unwrap().insert(event.id(), event);
    }

    pub fn stored(&self, id: EventId) -> Option<Event> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn write<T>(
        &self,
        id: EventId,
        apply: impl FnOnce(&mut Event) -> T,
    ) -> Result<T, GatherError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(simulated_failure());
        }
        let mut rows = self.rows.lock().unwrap();
        let event = rows.get_mut(&id).ok_or_else(|| missing_event(id))?;
        Ok(apply(event))
    }
}

impl EventRepository for InMemoryEventRepo {
    fn create(&self, event: Event) -> impl Future<Output = Result<Event, GatherError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(simulated_failure())
        } else {
            self.insert(event.clone());
            Ok(event)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GatherError>> + Send {
        let result = self.stored(id);
        async { Ok(result) }
    }

    fn find_by_status(
        &self,
        status: EventStatus,
    ) -> impl Future<Output = Result<Vec<Event>, GatherError>> + Send {
        let rows = self.rows.lock().unwrap();
        let result: Vec<Event> = rows
            .values()
            .filter(|e| e.status() == status)
            .cloned()
            .collect();
        async { Ok(result) }
    }

    fn update_status(
        &self,
        id: EventId,
        status: EventStatus,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        let result = self.write(id, |e| {
            e.set_status(status);
        });
        async { result }
    }

    fn update_entrants(
        &self,
        id: EventId,
        entrants: Vec<ActorId>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        let result = self.write(id, |e| {
            for actor in e.entrants().to_vec() {
                e.remove_entrant(actor);
            }
            for actor in entrants {
                e.add_entrant(actor);
            }
        });
        async { result }
    }

    fn update_options(
        &self,
        id: EventId,
        options: EventOptions,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        let result = self.write(id, |e| {
            let keys: Vec<String> = e.options().keys().cloned().collect();
            for key in keys {
                e.remove_option(&key);
            }
            for (key, value) in options {
                e.set_option(key, value);
            }
        });
        async { result }
    }

    fn delete(&self, id: EventId) -> impl Future<Output = Result<bool, GatherError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(simulated_failure())
        } else {
            Ok(self.rows.lock().unwrap().remove(&id).is_some())
        };
        async { result }
    }
}

#[derive(Default)]
pub struct InMemoryAutomationRepo {
    rows: Mutex<HashMap<EventId, AutomationRow>>,
    fail_writes: AtomicBool,
}

impl InMemoryAutomationRepo {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_raw(&self, event_id: EventId, slot: Slot, document: &str) {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(event_id).or_default();
        match slot {
            Slot::Start => row.start = Some(document.to_string()),
            Slot::End => row.end = Some(document.to_string()),
        }
    }

    pub fn row(&self, event_id: EventId) -> Option<AutomationRow> {
        self.rows.lock().unwrap().get(&event_id).cloned()
    }
}

impl AutomationRepository for InMemoryAutomationRepo {
    fn ensure(&self, event_id: EventId) -> impl Future<Output = Result<(), GatherError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(simulated_failure())
        } else {
            self.rows.lock().unwrap().entry(event_id).or_default();
            Ok(())
        };
        async { result }
    }

    fn get(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Option<AutomationRow>, GatherError>> + Send {
        let result = self.row(event_id);
        async { Ok(result) }
    }

    fn put(
        &self,
        event_id: EventId,
        slot: Slot,
        document: Option<String>,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        let result = if self.fail_writes.load(Ordering::SeqCst) {
            Err(simulated_failure())
        } else {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&event_id) {
                Some(row) => {
                    match slot {
                        Slot::Start => row.start = document,
                        Slot::End => row.end = document,
                    }
                    Ok(())
                }
                None => Err(NotFoundError {
                    entity: "Automation",
                    id: event_id.to_string(),
                }
                .into()),
            }
        };
        async { result }
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<Notification>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), GatherError>> + Send {
        self.published.lock().unwrap().push(notification);
        async { Ok(()) }
    }
}

/// One recorded handler call: the `message` option and when it ran.
pub type Call = (String, tokio::time::Instant);

/// Handler recording every call; fails when the `message` option is `"boom"`
/// and panics when it is `"panic"`.
#[derive(Default, Clone)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingHandler {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }
}

#[async_trait]
impl ActionHandler for RecordingHandler {
    async fn execute(&self, action: &ActionInstance, _ctx: &ActionContext) -> anyhow::Result<()> {
        let message = action.text("message").unwrap_or_default().to_string();
        self.calls
            .lock()
            .unwrap()
            .push((message.clone(), tokio::time::Instant::now()));
        match message.as_str() {
            "boom" => anyhow::bail!("handler refused `{message}`"),
            "panic" => panic!("handler crashed on `{message}`"),
            _ => {}
        }
        Ok(())
    }
}

pub fn say_schema() -> OptionsSchema {
    OptionsSchema::new([
        FieldSpec::required("message", FieldType::Text),
        FieldSpec::nullable("volume", FieldType::Float),
    ])
}

/// Registry with a single `say` kind backed by `handler`.
pub fn registry_with(handler: &RecordingHandler) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry
        .register("say", say_schema(), Arc::new(handler.clone()))
        .unwrap();
    registry
}

pub fn say(message: &str) -> ActionInstance {
    let mut builder = ActionBuilder::new(ActionKind::new("say"), say_schema());
    builder.set_field("message", message).unwrap();
    builder.build().unwrap()
}
