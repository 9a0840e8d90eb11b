//! # gatherd — gather daemon
//!
//! Composition root that wires all adapters together and runs the event
//! lifecycle.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Register the available action kinds
//! - Construct application services, injecting repositories via port traits
//! - Start the transition handler and the periodic lifecycle scanner
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use gather_adapter_console::Console;
use gather_adapter_storage_sqlite_sqlx::Config as DatabaseConfig;
use gather_app::action_registry::ActionRegistry;
use gather_app::automation_executor::AutomationExecutor;
use gather_app::lifecycle_scanner::LifecycleScanner;
use gather_app::notification_bus::NotificationBus;
use gather_app::services::automation_service::AutomationService;
use gather_app::services::event_manager::EventManager;
use gather_app::transition_handler::TransitionHandler;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .inspect_err(|err| tracing::error!(error = %err, "cannot open the event store"))?;

    // Actions
    let console = Console::default();
    let mut registry = ActionRegistry::new();
    gather_adapter_console::register_all(&mut registry, &console)?;
    let registry = Arc::new(registry);
    tracing::info!(kinds = registry.len(), "actions registered");

    // Notification bus
    let bus = Arc::new(NotificationBus::new(config.bus.capacity));

    // Services
    let manager = Arc::new(EventManager::new(db.event_repository(), Arc::clone(&bus)));
    manager
        .load()
        .await
        .inspect_err(|err| tracing::error!(error = %err, "cannot load events"))?;
    let automations = Arc::new(AutomationService::new(
        db.automation_repository(),
        Arc::clone(&registry),
    ));
    let executor = AutomationExecutor::new(automations, registry);

    // Background tasks
    let handler = Arc::new(TransitionHandler::new(Arc::clone(&manager), executor));
    let handler_task = handler.spawn(bus.subscribe());
    tracing::debug!(subscribers = bus.subscriber_count(), "transition handler listening");
    let scanner = Arc::new(LifecycleScanner::new(manager, Arc::clone(&bus)));
    let scanner_task = scanner.spawn(config.scan_interval());
    tracing::info!(
        interval_ms = config.scanner.interval_ms,
        "gatherd running, press ctrl-c to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    scanner_task.abort();
    handler_task.abort();

    Ok(())
}
