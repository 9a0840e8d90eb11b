//! # gather-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EventRepository` — rows of events keyed by id
//!   - `AutomationRepository` — per-event start/end automation documents
//!   - `NotificationPublisher` — fan-out of lifecycle notifications
//!   - `ActionHandler` — the effect behind a registered action kind
//! - Define **driving/inbound** use-cases:
//!   - `EventManager` — status-bucketed event store
//!   - `AutomationService` — resilient automation load/save and authoring
//!   - `LifecycleScanner` — periodic detection of due transitions
//!   - `AutomationExecutor` — delay-paced, best-effort action sequences
//!   - `TransitionHandler` — applies requested transitions and starts automations
//! - Provide **in-process infrastructure** (action registry, notification bus)
//!
//! ## Dependency rule
//! Depends on `gather-domain` only (plus `tokio` for channels, timers and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_registry;
pub mod automation_builder;
pub mod automation_executor;
pub mod lifecycle_scanner;
pub mod notification_bus;
pub mod ports;
pub mod services;
pub mod transition_handler;

#[cfg(test)]
pub(crate) mod testing;
