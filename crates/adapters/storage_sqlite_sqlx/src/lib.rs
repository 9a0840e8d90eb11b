//! # gather-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `gather-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `gather-app` (for port traits) and `gather-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod automation_repo;
mod error;
mod event_repo;
mod pool;

pub use automation_repo::SqliteAutomationRepository;
pub use error::StorageError;
pub use event_repo::SqliteEventRepository;
pub use pool::{Config, Database};
