//! # gather-domain
//!
//! Pure domain model for the gather event lifecycle system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (time-bounded activities moving Upcoming → Active → Ended)
//! - Define **Notifications** (transition requests and status changes)
//! - Define **Automations** (ordered action lists with an inter-step delay)
//! - Define **Option schemas** and the validating step builder for actions
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod event;
pub mod notification;
