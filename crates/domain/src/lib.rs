//! # labhub-domain
//!
//! Pure domain model for the labhub device backend.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Printers** and the print **Jobs** queued on them
//! - Define **Hubs**, the **Sensors** attached to them, and sensor **DataPoints**
//! - Define **Users**, API tokens, and the [`ability`] rules that gate access
//! - Define background **Tasks** (side effects dispatched after a write)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod ability;
pub mod alert;
pub mod data_point;
pub mod hub;
pub mod job;
pub mod printer;
pub mod sensor;
pub mod task;
pub mod user;
