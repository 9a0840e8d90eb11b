//! End-to-end tests for the full gatherd stack.
//!
//! Each test wires the complete application (in-memory `SQLite`, real repos,
//! real services, notification bus, transition handler and console actions)
//! and drives it through scans at chosen instants; no timer task is spawned.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use gather_adapter_console::{Console, MessageSendAction, TitleShowAction};
use gather_adapter_storage_sqlite_sqlx::{
    Config, Database, SqliteAutomationRepository, SqliteEventRepository,
};
use gather_app::action_registry::ActionRegistry;
use gather_app::automation_executor::AutomationExecutor;
use gather_app::lifecycle_scanner::LifecycleScanner;
use gather_app::notification_bus::NotificationBus;
use gather_app::ports::{AutomationRepository, EventRepository};
use gather_app::services::automation_service::AutomationService;
use gather_app::services::event_manager::EventManager;
use gather_app::transition_handler::TransitionHandler;
use gather_domain::automation::Slot;
use gather_domain::event::{Event, EventStatus};
use gather_domain::id::ActorId;
use gather_domain::time::now;

type Manager = EventManager<SqliteEventRepository, Arc<NotificationBus>>;

struct Stack {
    db: Database,
    console: Console,
    manager: Arc<Manager>,
    automations: Arc<AutomationService<SqliteAutomationRepository>>,
    scanner: LifecycleScanner<SqliteEventRepository, Arc<NotificationBus>, Arc<NotificationBus>>,
}

async fn stack() -> Stack {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let console = Console::default();
    let mut registry = ActionRegistry::new();
    gather_adapter_console::register_all(&mut registry, &console).unwrap();
    let registry = Arc::new(registry);

    let bus = Arc::new(NotificationBus::new(64));
    let manager = Arc::new(EventManager::new(db.event_repository(), Arc::clone(&bus)));
    manager.load().await.unwrap();
    let automations = Arc::new(AutomationService::new(
        db.automation_repository(),
        Arc::clone(&registry),
    ));
    let executor = AutomationExecutor::new(Arc::clone(&automations), registry);

    let handler = Arc::new(TransitionHandler::new(Arc::clone(&manager), executor));
    handler.spawn(bus.subscribe());
    let scanner = LifecycleScanner::new(Arc::clone(&manager), Arc::clone(&bus));

    Stack {
        db,
        console,
        manager,
        automations,
        scanner,
    }
}

/// Poll `check` until it holds or two seconds have passed.
async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

async fn create_started_event(stack: &Stack) -> Event {
    let event = stack
        .manager
        .create_event(
            Event::builder()
                .name("Boat race")
                .owner(ActorId::new())
                .start_time(now() - ChronoDuration::seconds(1)),
        )
        .await
        .unwrap();
    stack
        .manager
        .add_entrant(event.id(), ActorId::new())
        .await
        .unwrap();
    event
}

async fn author_automations(stack: &Stack, event: &Event) {
    let start = stack
        .automations
        .builder(event.id(), Slot::Start)
        .await
        .unwrap();
    let mut welcome = start.action_builder(MessageSendAction::KIND).unwrap();
    welcome.set_field("message", "Welcome!").unwrap();
    let mut title = start.action_builder(TitleShowAction::KIND).unwrap();
    title.set_field("title", "Go").unwrap();
    start
        .action(welcome.build().unwrap())
        .action(title.build().unwrap())
        .delay_seconds(0)
        .build()
        .await
        .unwrap();

    let end = stack
        .automations
        .builder(event.id(), Slot::End)
        .await
        .unwrap();
    let mut thanks = end.action_builder(MessageSendAction::KIND).unwrap();
    thanks.set_field("message", "Thanks for playing").unwrap();
    end.action(thanks.build().unwrap())
        .delay_seconds(0)
        .build()
        .await
        .unwrap();
}

async fn status_of(stack: &Stack, event: &Event) -> EventStatus {
    stack.manager.get_event(event.id()).await.unwrap().status()
}

#[tokio::test(flavor = "multi_thread")]
async fn should_run_start_and_end_automations_through_full_lifecycle() {
    let stack = stack().await;
    let event = create_started_event(&stack).await;
    author_automations(&stack, &event).await;

    assert_eq!(stack.scanner.tick().await.len(), 1);
    assert!(eventually(|| async { status_of(&stack, &event).await == EventStatus::Active }).await);
    assert!(eventually(|| async { stack.console.texts().len() == 2 }).await);
    assert_eq!(stack.console.texts(), vec!["Welcome!", "Go"]);

    // No end time: the next scan ends the event.
    stack.scanner.tick().await;
    assert!(eventually(|| async { status_of(&stack, &event).await == EventStatus::Ended }).await);
    assert!(eventually(|| async { stack.console.texts().len() == 3 }).await);
    assert_eq!(stack.console.texts()[2], "Thanks for playing");

    let stored = stack
        .db
        .event_repository()
        .get_by_id(event.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status(), EventStatus::Ended);
    assert_eq!(stored.entrants().len(), 1);
    assert_eq!(
        stack.manager.get_events(Some(EventStatus::Ended)).await.len(),
        1
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn should_not_request_anything_before_start_time() {
    let stack = stack().await;
    let event = stack
        .manager
        .create_event(
            Event::builder()
                .name("Tomorrow")
                .owner(ActorId::new())
                .start_time(now() + ChronoDuration::days(1)),
        )
        .await
        .unwrap();

    assert!(stack.scanner.tick().await.is_empty());
    assert_eq!(status_of(&stack, &event).await, EventStatus::Upcoming);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_skip_corrupt_action_and_run_the_rest() {
    let stack = stack().await;
    let event = create_started_event(&stack).await;
    let repo = stack.db.automation_repository();
    repo.ensure(event.id()).await.unwrap();
    let document = serde_json::json!({
        "automationDelayTime": 0,
        "actions": [
            {"type": "message_send", "message": "first"},
            {"type": "fireworks", "colour": "red"},
            {"type": "message_send"},
            {"type": "message_send", "message": "last"}
        ]
    });
    repo.put(event.id(), Slot::Start, Some(document.to_string()))
        .await
        .unwrap();

    let loaded = stack
        .automations
        .load(event.id(), Slot::Start)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.automation.actions.len(), 2);
    assert_eq!(loaded.failed.len(), 2);

    stack.scanner.tick().await;
    assert!(eventually(|| async { stack.console.texts().len() == 2 }).await);
    assert_eq!(stack.console.texts(), vec!["first", "last"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn should_restore_live_events_after_restart() {
    let stack = stack().await;
    let upcoming = stack
        .manager
        .create_event(
            Event::builder()
                .name("Later")
                .owner(ActorId::new())
                .start_time(now() + ChronoDuration::hours(1)),
        )
        .await
        .unwrap();
    let started = create_started_event(&stack).await;
    stack.scanner.tick().await;
    assert!(eventually(|| async { status_of(&stack, &started).await == EventStatus::Active }).await);

    let restarted = EventManager::new(
        stack.db.event_repository(),
        Arc::new(NotificationBus::new(8)),
    );
    restarted.load().await.unwrap();

    let live = restarted.get_events(None).await;
    assert_eq!(live.len(), 2);
    assert_eq!(
        restarted.get_events(Some(EventStatus::Upcoming)).await[0].id(),
        upcoming.id()
    );
    assert_eq!(
        restarted.get_events(Some(EventStatus::Active)).await[0].id(),
        started.id()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn should_delete_event_with_its_automations() {
    let stack = stack().await;
    let event = create_started_event(&stack).await;
    author_automations(&stack, &event).await;

    stack.manager.delete_event(event.id()).await.unwrap();

    assert!(stack.manager.get_events(None).await.is_empty());
    assert!(
        stack
            .db
            .automation_repository()
            .get(event.id())
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        stack
            .automations
            .load(event.id(), Slot::Start)
            .await
            .unwrap()
            .is_none()
    );
}
